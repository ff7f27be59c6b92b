use arbor_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("The database connection was closed or terminated")]
    NotConnected,

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ScanError,
    },
}

