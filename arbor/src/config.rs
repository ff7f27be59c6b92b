use anyhow::{Context, Result, bail};
use arbor_core::crawl::CrawlOptions;
use clap::ArgMatches;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_DATABASE_PATH: &str = "~/.config/arbor/arbor.db";
pub const DATABASE_ENV: &str = "ARBOR_DATABASE";

/// Database location with `~` expanded.
pub fn database_path(matches: &ArgMatches) -> PathBuf {
    let raw = matches
        .get_one::<String>("database")
        .map(String::as_str)
        .unwrap_or(DEFAULT_DATABASE_PATH);
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadSettings {
    /// Kept exactly as typed; stored roots are matched on this string.
    pub url: String,
    pub depth: u32,
    pub force: bool,
    pub request_timeout: Duration,
    pub workers: usize,
    pub max_duration: Option<Duration>,
}

impl LoadSettings {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let url = args
            .get_one::<String>("URL")
            .context("A root URL is required")?
            .clone();
        validate_root_url(&url)?;

        let workers = *args.get_one::<usize>("workers").unwrap_or(&1);
        if workers == 0 {
            bail!("--workers must be at least 1");
        }

        let timeout_secs = *args.get_one::<u64>("timeout").unwrap_or(&5);
        if timeout_secs == 0 {
            bail!("--timeout must be at least 1 second");
        }

        Ok(Self {
            url,
            depth: *args.get_one::<u32>("depth").unwrap_or(&0),
            force: args.get_flag("force"),
            request_timeout: Duration::from_secs(timeout_secs),
            workers,
            max_duration: args
                .get_one::<u64>("max-duration")
                .map(|secs| Duration::from_secs(*secs)),
        })
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_depth: self.depth,
            request_timeout: self.request_timeout,
            workers: self.workers,
            max_duration: self.max_duration,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetSettings {
    pub pattern: String,
    pub rows: u32,
    pub format: OutputFormat,
}

impl GetSettings {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let pattern = args
            .get_one::<String>("URL_PATTERN")
            .context("A URL pattern is required")?
            .clone();
        let format_name = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");
        let format = OutputFormat::from_name(format_name)
            .with_context(|| format!("Unknown output format '{}'", format_name))?;

        Ok(Self {
            pattern,
            rows: *args.get_one::<u32>("rows").unwrap_or(&1),
            format,
        })
    }
}

fn validate_root_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).with_context(|| format!("'{}' is not a valid URL", url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("'{}' must be an http or https URL", url);
    }
    Ok(())
}
