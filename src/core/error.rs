use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Store temporarily unavailable: {0}")]
    TransientStore(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Only transient store failures are safe to retry; every other variant
    /// reproduces the same outcome for the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientStore(_))
    }

    /// Classify a driver error coming out of a Postgres-backed store.
    pub fn from_store(context: &str, e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => {
                tracing::warn!("{}: store unavailable: {:?}", context, e);
                AppError::TransientStore(format!("{}: {}", context, e))
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                tracing::warn!("{}: unique constraint violated: {}", context, db);
                AppError::Conflict(format!("{}: {}", context, db.message()))
            }
            other => {
                tracing::error!("{}: {:?}", context, other);
                AppError::Database(other)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
