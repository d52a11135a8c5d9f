use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowreelError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    #[error("Profile assembly error: {0}")]
    Assembly(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
