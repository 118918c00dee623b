//! mlw-storage
//!
//! SQLite persistence for surveys and comments, plus the on-disk media
//! directories tied to surveys.

pub mod comments;
pub mod error;
pub mod media;
pub mod pool;
pub mod query;
pub mod surveys;
