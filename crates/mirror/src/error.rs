use thiserror::Error;

/// Mirror client errors.
///
/// Response classes are kept apart so callers can tell a missing entry from
/// a rejected payload or a service fault.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid mirror base url: {0}")]
    InvalidBaseUrl(String),
    #[error("mirror entry not found")]
    NotFound,
    #[error("mirror rejected request: {0}")]
    Validation(String),
    #[error("mirror server error: {0}")]
    Server(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
