use crate::config::{GetSettings, LoadSettings, OutputFormat};
use anyhow::{Context, Result};
use arbor_core::crawl::{CrawlEngine, CrawlProgressCallback, CrawlSummary};
use arbor_core::data::{Database, TreeRow};
use arbor_core::tree;
use arbor_scanner::{Fetcher, HttpFetcher};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Result of a `load` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A tree was already stored and the user chose to keep it.
    Kept { root_id: i64 },
    Crawled {
        summary: CrawlSummary,
        elapsed: Duration,
    },
}

/// Open the database at `path`, creating parent directories and the schema
/// as needed.
pub fn open_store(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let db = Database::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    db.ensure_schema()
        .context("Failed to create the page_content table")?;
    Ok(db)
}

/// Ask until the answer is `y` or `n`. End of input counts as `n`.
pub fn read_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    loop {
        writeln!(
            output,
            "Input \"Y\" to clear the stored tree and continue. Input \"N\" to exit."
        )?;
        output.flush()?;

        let mut response = String::new();
        if input.read_line(&mut response)? == 0 {
            return Ok(false);
        }
        match response.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

/// Crawl `settings.url` into `store`.
///
/// When a tree for the same root URL is already stored, `confirm` decides
/// between purging it and leaving it alone; `--force` purges without asking.
pub async fn load_tree<F, C>(
    store: &Database,
    fetcher: F,
    settings: &LoadSettings,
    confirm: C,
    progress: Option<CrawlProgressCallback>,
) -> Result<LoadOutcome>
where
    F: Fetcher,
    C: FnOnce(&str) -> bool,
{
    if let Some(root_id) = store.find_root(&settings.url)? {
        if !settings.force && !confirm(&settings.url) {
            info!("Keeping stored tree for {} (root {})", settings.url, root_id);
            return Ok(LoadOutcome::Kept { root_id });
        }
        info!("Purging stored tree for {} (root {})", settings.url, root_id);
        store.delete_root(&settings.url)?;
    }

    let mut engine = CrawlEngine::new(store, fetcher).with_options(settings.crawl_options());
    if let Some(callback) = progress {
        engine = engine.with_progress_callback(callback);
    }

    let started = Instant::now();
    let summary = engine
        .crawl(&settings.url)
        .await
        .with_context(|| format!("Crawl of {} failed", settings.url))?;

    Ok(LoadOutcome::Crawled {
        summary,
        elapsed: started.elapsed(),
    })
}

/// Render tree rows for the terminal.
pub fn format_rows(rows: &[TreeRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(tree::render(rows)
            .into_iter()
            .map(|line| line + "\n")
            .collect()),
        OutputFormat::Json => {
            let json = tree::render_json(rows).context("Failed to serialize tree rows")?;
            Ok(json + "\n")
        }
    }
}

fn new_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    Ok(spinner)
}

fn ask_to_replace(url: &str) -> bool {
    println!("{} Url {} was parsed.", "⚠".yellow().bold(), url.bright_white());
    let stdin = io::stdin();
    read_yes_no(&mut stdin.lock(), &mut io::stdout()).unwrap_or(false)
}

pub async fn handle_load(db_path: &Path, args: &ArgMatches, quiet: bool) -> Result<()> {
    let settings = LoadSettings::from_matches(args)?;
    let fetcher = HttpFetcher::with_timeout(settings.request_timeout.as_secs())
        .context("Failed to set up the HTTP client")?;
    let mut store = open_store(db_path)?;

    let spinner = if quiet { None } else { Some(new_spinner()?) };
    let progress = spinner.clone().map(|pb| -> CrawlProgressCallback {
        Arc::new(move |stored: usize, url: &str| {
            pb.set_message(format!("Crawling... {} pages stored ({})", stored, url));
        })
    });
    if let Some(ref pb) = spinner {
        pb.set_message(format!("Crawling {}", settings.url));
        pb.enable_steady_tick(Duration::from_millis(100));
    }

    let confirm = |url: &str| match spinner {
        Some(ref pb) => pb.suspend(|| ask_to_replace(url)),
        None => ask_to_replace(url),
    };

    let result = load_tree(&store, fetcher, &settings, confirm, progress).await;
    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }
    let closed = store.close();
    let outcome = result?;
    closed.context("Failed to close the database")?;

    match outcome {
        LoadOutcome::Kept { .. } => {
            println!("{} Keeping the stored tree for {}", "→".blue(), settings.url);
        }
        LoadOutcome::Crawled { summary, elapsed } => {
            if summary.cancelled {
                println!(
                    "{} Time limit reached, crawl stopped early",
                    "⚠".yellow().bold()
                );
            }
            if !quiet {
                println!("{} Crawl complete!", "✓".green().bold());
                println!(
                    "  Pages stored: {}",
                    summary.stored.to_string().cyan()
                );
                println!(
                    "  Pages skipped: {}",
                    summary.ignored.to_string().cyan()
                );
                println!("  Execution time: {:.3} seconds", elapsed.as_secs_f64());
            }
        }
    }

    Ok(())
}

pub fn handle_get(db_path: &Path, args: &ArgMatches, quiet: bool) -> Result<()> {
    let settings = GetSettings::from_matches(args)?;
    let mut store = open_store(db_path)?;

    let rows = store.reconstruct_tree(&settings.pattern, settings.rows);
    store.close().context("Failed to close the database")?;
    let rows = rows?;

    if rows.is_empty() && !quiet {
        eprintln!(
            "{} No stored tree matches {}",
            "→".blue(),
            settings.pattern.bright_white()
        );
    }

    print!("{}", format_rows(&rows, settings.format)?);
    Ok(())
}

pub fn handle_purge(db_path: &Path, args: &ArgMatches) -> Result<()> {
    let url = args
        .get_one::<String>("URL")
        .context("A root URL is required")?;
    let mut store = open_store(db_path)?;

    let deleted = store.delete_root(url);
    store.close().context("Failed to close the database")?;

    if deleted? > 0 {
        println!("{} Removed the stored tree for {}", "✓".green().bold(), url);
    } else {
        println!("{} No stored tree for {}", "→".blue(), url);
    }
    Ok(())
}
