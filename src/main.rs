//! # Listing Scraper
//!
//! Extracts article records (title, author, date, URL, description) from a
//! rendered news-listing page and writes them to a CSV file.
//!
//! ## Usage
//!
//! ```sh
//! listing_scraper -i page.html -o techcrunch_articles.csv
//! ```
//!
//! ## Architecture
//!
//! The run is a straight pipeline:
//! 1. **Acquisition**: read the rendered page source (file, stdin or HTTP)
//! 2. **Extraction**: locate article containers, read each field through its
//!    selector chain, skip malformed containers
//! 3. **Validation**: drop records missing a title or link, normalize text
//! 4. **Export**: write the CSV file
//!
//! The CSV file is written on every run. If acquisition fails the page is
//! treated as empty; if the configuration is invalid an empty file is still
//! written before the error is reported.

use clap::Parser;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod acquire;
mod cli;
mod config;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod utils;

use acquire::{FileSource, HttpSource, PageSource, RetryFetch};
use cli::Cli;
use config::{ConfigError, ScrapeConfig};
use outputs::{csv, page_source};
use scrapers::{ScrapeOutcome, scrape_document};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("listing_scraper starting up");

    let args = Cli::parse();
    debug!(?args.input, ?args.url, ?args.output, "Parsed CLI arguments");

    run(&args).await?;

    info!(
        millis = start_time.elapsed().as_millis() as u64,
        "Execution complete"
    );
    Ok(())
}

/// Scrape and export. The CSV file is written even when the scrape fails;
/// the scrape error is returned after the export.
async fn run(args: &Cli) -> Result<(), Box<dyn Error>> {
    let (outcome, failure) = match scrape(args).await {
        Ok(outcome) => (outcome, None),
        Err(e) => {
            error!(error = %e, "Scrape failed; exporting empty CSV");
            (ScrapeOutcome::default(), Some(e))
        }
    };

    if outcome.records.is_empty() {
        warn!("No articles scraped, creating empty CSV");
    }
    let summary = csv::write_records(&outcome.records, &args.output)?;

    info!(
        path = %summary.path.display(),
        rows = summary.rows,
        containers = outcome.containers,
        malformed = outcome.faults.len(),
        rejected = outcome.rejected,
        "Export complete"
    );

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Acquire the page and run extraction and validation over it.
///
/// Only configuration problems are returned as errors; acquisition failures
/// degrade to an empty document.
#[instrument(level = "info", skip_all)]
async fn scrape(args: &Cli) -> Result<ScrapeOutcome, Box<dyn Error>> {
    let plan = build_config(args)?.compile()?;
    let markup = acquire_page(args).await;

    if args.dump_page_source {
        if let Err(e) = page_source::write_page_source(&markup, &args.output).await {
            warn!(error = %e, "Failed to write page source dump");
        }
    }

    Ok(scrape_document(&markup, &plan))
}

/// Load the config file (or defaults) and apply CLI overrides.
fn build_config(args: &Cli) -> Result<ScrapeConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path)?,
        None => ScrapeConfig::default(),
    };
    if let Some(strictness) = args.strictness {
        config.strictness = strictness;
    }
    if let Some(base) = &args.base_url {
        config.base_url = Some(base.clone());
    } else if config.base_url.is_none() {
        config.base_url = args.url.clone();
    }
    Ok(config)
}

/// Obtain the page markup, or an empty document if that fails.
async fn acquire_page(args: &Cli) -> String {
    let result = match (&args.input, &args.url) {
        (Some(path), _) => FileSource::new(path.clone()).fetch_page().await,
        (None, Some(url)) => fetch_url(url, args).await,
        (None, None) => Err("no page source given".into()),
    };
    match result {
        Ok(markup) => markup,
        Err(e) => {
            error!(error = %e, "Page acquisition failed; continuing with an empty document");
            String::new()
        }
    }
}

async fn fetch_url(raw: &str, args: &Cli) -> Result<String, Box<dyn Error>> {
    let url = Url::parse(raw)?;
    let source = HttpSource::new(url, Duration::from_secs(args.timeout_secs))?;
    RetryFetch::new(source, args.max_retries, Duration::from_secs(1))
        .fetch_page()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strictness;

    #[test]
    fn test_build_config_defaults_base_url_to_fetched_page() {
        let args = Cli::parse_from(["listing_scraper", "-u", "https://techcrunch.com/"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://techcrunch.com/"));
        assert_eq!(config.strictness, Strictness::Strict);
    }

    #[test]
    fn test_build_config_cli_overrides() {
        let args = Cli::parse_from([
            "listing_scraper",
            "-i",
            "page.html",
            "--strictness",
            "permissive",
            "--base-url",
            "https://example.com/",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.strictness, Strictness::Permissive);
        assert_eq!(config.base_url.as_deref(), Some("https://example.com/"));
    }

    #[tokio::test]
    async fn test_missing_input_file_degrades_to_empty_document() {
        let args = Cli::parse_from(["listing_scraper", "-i", "/nonexistent/page.html"]);
        assert_eq!(acquire_page(&args).await, "");
        let outcome = scrape(&args).await.unwrap();
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_from_saved_page() {
        let dir = tempfile::TempDir::new().unwrap();
        let page = dir.path().join("page.html");
        std::fs::write(
            &page,
            r#"<div class="wp-block-tc23-post-picker">
                 <article><h2><a href="/a">A</a></h2></article>
                 <article><h2><a href="/b">B</a></h2></article>
               </div>"#,
        )
        .unwrap();
        let output = dir.path().join("articles.csv");
        let args = Cli::parse_from([
            "listing_scraper",
            "-i",
            page.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--base-url",
            "https://techcrunch.com/",
            "--dump-page-source",
        ]);

        let outcome = scrape(&args).await.unwrap();
        let links: Vec<&str> = outcome.records.iter().map(|r| r.link()).collect();
        assert_eq!(links, vec!["https://techcrunch.com/a", "https://techcrunch.com/b"]);

        let dumps = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("page_source_"))
            .count();
        assert_eq!(dumps, 1);
    }

    #[tokio::test]
    async fn test_invalid_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("bad.yaml");
        std::fs::write(&config, "container_selectors: [\"div[\"]\n").unwrap();
        let args = Cli::parse_from([
            "listing_scraper",
            "-i",
            "page.html",
            "-c",
            config.to_str().unwrap(),
        ]);
        assert!(scrape(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_run_with_invalid_config_still_writes_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("bad.yaml");
        std::fs::write(&config, "container_selectors: [\"div[\"]\n").unwrap();
        let output = dir.path().join("out").join("articles.csv");
        let args = Cli::parse_from([
            "listing_scraper",
            "-i",
            "page.html",
            "-c",
            config.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);

        assert!(run(&args).await.is_err());
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "Title,Author,Date,URL,Description\r\n");
    }

    #[tokio::test]
    async fn test_run_with_missing_input_succeeds_with_header_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("articles.csv");
        let args = Cli::parse_from([
            "listing_scraper",
            "-i",
            "/nonexistent/page.html",
            "-o",
            output.to_str().unwrap(),
        ]);

        run(&args).await.unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "Title,Author,Date,URL,Description\r\n");
    }
}
