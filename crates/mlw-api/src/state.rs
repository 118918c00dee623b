use sqlx::SqlitePool;

use mlw_auth::jwt::TokenVerifier;
use mlw_storage::media::MediaRoot;

use crate::config::ServerConfig;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub media: MediaRoot,
    pub verifier: TokenVerifier,
    pub pagination: Pagination,
}

/// Page size policy for survey listings.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub default_size: u32,
    pub max_size: u32,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &ServerConfig) -> Self {
        Self {
            pool,
            media: MediaRoot::new(&config.media_root),
            verifier: TokenVerifier::hs256(
                config.jwt_secret.as_bytes(),
                config.jwt_issuer.as_deref(),
            ),
            pagination: Pagination {
                default_size: config.page_size,
                max_size: config.max_page_size,
            },
        }
    }
}
