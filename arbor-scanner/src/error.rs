use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client setup failed: {0}")]
    ClientError(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
