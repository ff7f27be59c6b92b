use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content types that are treated as HTML pages.
pub const HTML_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// A response that made it back from the server, whatever its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub response_time: Duration,
}

impl FetchedPage {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            content_type: None,
            body: String::new(),
            response_time: Duration::from_secs(0),
        }
    }

    /// Only a plain `200 OK` counts; redirects are followed by the client.
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                HTML_CONTENT_TYPES.iter().any(|html| ct.contains(html))
            })
            .unwrap_or(false)
    }
}

/// Tagged result of a single fetch.
///
/// `MalformedScheme` and `ConnectionError` end only their own branch of a
/// crawl. `OtherFailure` is fatal to the whole crawl.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(FetchedPage),
    MalformedScheme(String),
    ConnectionError(String),
    OtherFailure(ScanError),
}
