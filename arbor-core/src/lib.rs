pub mod crawl;
pub mod data;
pub mod error;
pub mod tree;

pub use crawl::{CrawlEngine, CrawlOptions, CrawlProgressCallback, CrawlSummary};
pub use data::{Database, PageNode, StoreStatus, TreeRow};
pub use error::{CrawlError, StoreError, StoreResult};
