//! mlw-core
//!
//! Pure domain types, filter specifications, and media directory conventions.
//! No database or HTTP dependency; this is the shared vocabulary of the
//! survey service.

pub mod error;
pub mod filter;
pub mod media_paths;
pub mod models;
