//! The module contains the errors the engine can return.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("no profile for \"{0}\"")]
    ProfileNotFound(String),
    #[error("profile \"{0}\" has no branch assignment")]
    MissingBranchAssignment(String),
    #[error("record \"{0}\" not found")]
    RecordNotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotAuthenticated, Self::NotAuthenticated) => true,
            (Self::ProfileNotFound(a), Self::ProfileNotFound(b)) => a == b,
            (Self::MissingBranchAssignment(a), Self::MissingBranchAssignment(b)) => a == b,
            (Self::RecordNotFound(a), Self::RecordNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
