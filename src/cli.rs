//! Command-line interface definitions for the listing scraper.
//!
//! Options can be given as flags; the HTTP settings also read environment
//! variables.

use crate::config::Strictness;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Command-line arguments for the listing scraper.
///
/// Exactly one page source is required: a saved page (`--input`) or a URL to
/// fetch (`--url`). Giving neither, or both, is a usage error: clap prints the
/// usage and exits with status 2 before any CSV file is written.
///
/// # Examples
///
/// ```sh
/// # Page source saved by a browser automation tool
/// listing_scraper -i page.html -o techcrunch_articles.csv
///
/// # Piped on stdin, with a custom selector config
/// render-page https://techcrunch.com/ | listing_scraper -i - -c config/techcrunch.yaml
///
/// # Static fetch, keeping records without a link
/// listing_scraper -u https://techcrunch.com/ --strictness permissive --dump-page-source
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "url"])))]
pub struct Cli {
    /// Rendered page source to read; `-` reads stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Listing page to fetch over HTTP
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// CSV file to write
    #[arg(short, long, value_name = "FILE", default_value = "techcrunch_articles.csv")]
    pub output: PathBuf,

    /// YAML scrape configuration (selectors, field chains, strictness)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Record filtering policy; overrides the config file
    #[arg(long, value_enum)]
    pub strictness: Option<Strictness>,

    /// Base URL for resolving relative article links; defaults to --url
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Also save the acquired page source next to the CSV file
    #[arg(long)]
    pub dump_page_source: bool,

    /// HTTP page-load timeout in seconds
    #[arg(long, env = "SCRAPER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// HTTP retries after the first failed attempt
    #[arg(long, env = "SCRAPER_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: usize,
}
