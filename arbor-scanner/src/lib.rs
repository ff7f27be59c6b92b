pub mod error;
pub mod extract;
pub mod fetcher;
pub mod result;

pub use error::ScanError;
pub use extract::{extract_links, extract_title, resolve};
pub use fetcher::{Fetcher, HttpFetcher};
pub use result::{FetchOutcome, FetchedPage};
