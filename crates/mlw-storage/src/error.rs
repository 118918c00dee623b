use mlw_core::error::CoreError;
use mlw_core::models::ids::SurveyId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("survey not found: {id}")]
    SurveyNotFound { id: SurveyId },

    #[error("comment not found: {id}")]
    CommentNotFound { id: i64 },

    #[error("survey {id} does not exist")]
    DanglingSurvey { id: SurveyId },

    #[error("page {page} is out of range")]
    PageOutOfRange { page: u32 },

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] jiff::Error),

    #[error("media path error: {0}")]
    MediaPath(#[from] CoreError),

    #[error("failed to remove directory {path}: {source}")]
    Cleanup {
        path: String,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
