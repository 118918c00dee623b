//! mlw-auth
//!
//! Bearer token validation. Maps a signed JWT to the requesting identity.

pub mod error;
pub mod jwt;
