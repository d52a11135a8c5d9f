use thiserror::Error;

pub type Result<T> = std::result::Result<T, VideoError>;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unrecognized channel URL: {0}")]
    UnrecognizedChannel(String),
}

impl From<reqwest::Error> for VideoError {
    fn from(err: reqwest::Error) -> Self {
        VideoError::Network(err.to_string())
    }
}
