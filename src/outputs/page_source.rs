//! Diagnostic dump of the acquired page source.
//!
//! When a scrape comes back empty the first question is usually "what did the
//! page actually look like?". This writes the markup that was handed to the
//! extractor, NFKC-normalized but otherwise untouched, next to the CSV file.
//! Nothing else reads it.

use crate::normalize::canonicalize;
use chrono::{DateTime, Local};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// File name for a dump taken at `at`, e.g. `page_source_20240101_120000.html`.
pub fn dump_file_name(at: DateTime<Local>) -> String {
    format!("page_source_{}.html", at.format("%Y%m%d_%H%M%S"))
}

/// Write `markup` beside `csv_path`, returning the dump's path.
#[instrument(level = "info", skip_all, fields(bytes = markup.len()))]
pub async fn write_page_source(markup: &str, csv_path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let dir = match csv_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).await?;

    let path = dir.join(dump_file_name(Local::now()));
    fs::write(&path, canonicalize(markup)).await?;
    info!(path = %path.display(), "Wrote page source dump");
    Ok(path)
}
