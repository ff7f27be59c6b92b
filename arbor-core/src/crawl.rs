use crate::data::Database;
use crate::error::CrawlError;
use arbor_scanner::{FetchOutcome, Fetcher, extract_links, extract_title, resolve};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Link hops to follow below the root. 0 stores only the root.
    pub max_depth: u32,
    pub request_timeout: Duration,
    /// Pages fetched at once. 1 reproduces a plain depth-first walk.
    pub workers: usize,
    /// Stop the whole crawl once this much time has passed.
    pub max_duration: Option<Duration>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            workers: 1,
            max_duration: None,
        }
    }
}

/// Callback for reporting crawl progress: pages stored so far and the URL
/// that was just stored.
pub type CrawlProgressCallback = Arc<dyn Fn(usize, &str) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub stored: usize,
    pub ignored: usize,
    pub cancelled: bool,
}

#[derive(Debug)]
struct WorkItem {
    url: String,
    remaining_depth: u32,
    parent_id: Option<i64>,
}

/// Fetches pages and stores them as a parent-linked tree.
///
/// Work is kept on an explicit stack. A page's links are only pushed once the
/// page itself has been inserted, so every child is written after its parent.
pub struct CrawlEngine<'a, F> {
    store: &'a Database,
    fetcher: F,
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
}

impl<'a, F: Fetcher> CrawlEngine<'a, F> {
    pub fn new(store: &'a Database, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            options: CrawlOptions::default(),
            progress_callback: None,
        }
    }

    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.options.max_depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options.workers = workers;
        self
    }

    pub fn with_progress_callback(mut self, callback: CrawlProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl `root_url` down to the configured depth.
    ///
    /// Store errors and [`FetchOutcome::OtherFailure`] abort the crawl and
    /// leave whatever was already inserted in place.
    pub async fn crawl(&self, root_url: &str) -> Result<CrawlSummary, CrawlError> {
        self.store.ensure_open()?;

        let workers = self.options.workers.max(1);
        let deadline = self.options.max_duration.map(|d| Instant::now() + d);
        info!(
            "Starting crawl of {} (depth {}, {} workers)",
            root_url, self.options.max_depth, workers
        );

        let mut summary = CrawlSummary::default();
        let mut stack = vec![WorkItem {
            url: root_url.to_string(),
            remaining_depth: self.options.max_depth,
            parent_id: None,
        }];

        while !stack.is_empty() {
            let take = workers.min(stack.len());
            let batch: Vec<WorkItem> = stack.split_off(stack.len() - take).into_iter().rev().collect();

            let fetches = stream::iter(batch.iter().map(|item| self.fetch_one(&item.url)))
                .buffered(workers)
                .collect::<Vec<_>>();

            let outcomes = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fetches).await.ok(),
                None => Some(fetches.await),
            };
            let Some(outcomes) = outcomes else {
                warn!(
                    "Crawl of {} hit its time limit, {} pages left unvisited",
                    root_url,
                    stack.len() + batch.len()
                );
                summary.cancelled = true;
                break;
            };

            let mut expansions = Vec::with_capacity(batch.len());
            for (item, outcome) in batch.into_iter().zip(outcomes) {
                expansions.push(self.visit(item, outcome, &mut summary)?);
            }

            // The first page of the batch ends up on top, its first link first.
            for children in expansions.into_iter().rev() {
                stack.extend(children.into_iter().rev());
            }
        }

        info!(
            "Crawl of {} complete. Stored {} pages, ignored {}",
            root_url, summary.stored, summary.ignored
        );
        Ok(summary)
    }

    async fn fetch_one(&self, url: &str) -> FetchOutcome {
        let timeout = self.options.request_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch(url, timeout)).await {
            Ok(outcome) => outcome,
            Err(_) => FetchOutcome::ConnectionError(format!("no response within {:?}", timeout)),
        }
    }

    /// Classify one fetched URL, store it if it qualifies and return the work
    /// items for its links.
    fn visit(
        &self,
        item: WorkItem,
        outcome: FetchOutcome,
        summary: &mut CrawlSummary,
    ) -> Result<Vec<WorkItem>, CrawlError> {
        let page = match outcome {
            FetchOutcome::Success(page) => page,
            FetchOutcome::MalformedScheme(reason) | FetchOutcome::ConnectionError(reason) => {
                debug!("Skipping {}: {}", item.url, reason);
                summary.ignored += 1;
                return Ok(Vec::new());
            }
            FetchOutcome::OtherFailure(source) => {
                return Err(CrawlError::Fetch {
                    url: item.url,
                    source,
                });
            }
        };

        if !page.is_success() || !page.is_html() {
            debug!(
                "Skipping {}: status {} content-type {:?} in {:?}",
                item.url, page.status_code, page.content_type, page.response_time
            );
            summary.ignored += 1;
            return Ok(Vec::new());
        }

        let title = extract_title(&page.body);
        let id = self
            .store
            .insert(item.parent_id, &page.body, title.as_deref(), &item.url)?;
        summary.stored += 1;
        debug!(
            "Stored {} as node {} (parent {:?}, fetched in {:?})",
            item.url, id, item.parent_id, page.response_time
        );

        if let Some(ref callback) = self.progress_callback {
            callback(summary.stored, &item.url);
        }

        if item.remaining_depth == 0 {
            return Ok(Vec::new());
        }

        let children = extract_links(&page.body)
            .into_iter()
            .map(|link| WorkItem {
                url: resolve(&item.url, &link),
                remaining_depth: item.remaining_depth - 1,
                parent_id: Some(id),
            })
            .collect();

        Ok(children)
    }
}
