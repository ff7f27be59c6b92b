use crate::error::{Result, ScanError};
use crate::result::{FetchOutcome, FetchedPage};
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Anything that can turn a URL into a [`FetchOutcome`].
pub trait Fetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> impl Future<Output = FetchOutcome> + Send;
}

impl<T: Fetcher + Sync> Fetcher for &T {
    fn fetch(&self, url: &str, timeout: Duration) -> impl Future<Output = FetchOutcome> + Send {
        (**self).fetch(url, timeout)
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Arbor/0.1 (https://github.com/trapdoorsec/arbor)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.max(2) / 2))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ScanError::ClientError(e.to_string()))?;

        Ok(Self { client })
    }

    async fn fetch_page(&self, url: &str, timeout: Duration) -> FetchOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return FetchOutcome::MalformedScheme(format!("{}: {}", url, e)),
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return FetchOutcome::MalformedScheme(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                url
            ));
        }

        debug!("Fetching {}", url);
        let start = Instant::now();
        let response = match self.client.get(parsed).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };
        let response_time = start.elapsed();

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_error(e),
        };

        let mut page = FetchedPage::new(url.to_string());
        page.status_code = status_code;
        page.content_type = content_type;
        page.body = body;
        page.response_time = response_time;

        FetchOutcome::Success(page)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> impl Future<Output = FetchOutcome> + Send {
        self.fetch_page(url, timeout)
    }
}

/// Map a transport error onto the outcome taxonomy.
///
/// Timeouts count as connection failures. Everything that is neither a
/// connection problem nor a bad request URL is fatal.
fn classify_error(error: reqwest::Error) -> FetchOutcome {
    if error.is_builder() {
        FetchOutcome::MalformedScheme(error.to_string())
    } else if error.is_connect() || error.is_timeout() || error.is_request() {
        FetchOutcome::ConnectionError(error.to_string())
    } else {
        FetchOutcome::OtherFailure(ScanError::HttpError(error))
    }
}
