use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{missing} score(s) have not been entered yet; enter them or use the zero policy")]
    IncompleteScores { missing: usize },

    #[error("Result batch {0} is approved and can no longer change")]
    AlreadyApproved(i32),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
