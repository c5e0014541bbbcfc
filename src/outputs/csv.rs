//! CSV export of validated records.
//!
//! The file always starts with the fixed header row
//! `Title,Author,Date,URL,Description`, followed by one row per record in
//! input order. Fields containing a comma, a double quote or a line break are
//! wrapped in double quotes, with embedded quotes doubled. Rows end with CRLF.
//!
//! Writing an empty record slice still produces a file holding just the
//! header, so a run never leaves the destination missing.

use crate::models::{ExportRow, HEADER, ValidatedRecord};
use crate::utils::ensure_parent_dir;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

const DELIMITER: char = ',';
const QUOTE: char = '"';
const LINE_END: &str = "\r\n";

/// The destination could not be written.
#[derive(Debug, Error)]
#[error("failed to write CSV to {path}: {source}")]
pub struct ExportError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Data rows, excluding the header.
    pub rows: usize,
}

/// Quote a field if it contains the delimiter, a quote or a line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    let needs_quotes = field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r');
    if !needs_quotes {
        return Cow::Borrowed(field);
    }
    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(c);
    }
    quoted.push(QUOTE);
    Cow::Owned(quoted)
}

fn write_row<W: Write>(out: &mut W, row: ExportRow<'_>) -> io::Result<()> {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            write!(out, "{DELIMITER}")?;
        }
        out.write_all(escape_field(field).as_bytes())?;
    }
    out.write_all(LINE_END.as_bytes())
}

fn write_table(path: &Path, records: &[ValidatedRecord]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, HEADER)?;
    for record in records {
        write_row(&mut out, record.export_row())?;
    }
    out.flush()
}

/// Write `records` to `path` as CSV, replacing any existing file.
///
/// # Errors
///
/// Returns [`ExportError`] if the parent directory cannot be created or the
/// file cannot be written. No retry is attempted.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub fn write_records(records: &[ValidatedRecord], path: &Path) -> Result<ExportSummary, ExportError> {
    write_table(path, records).map_err(|source| ExportError {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote CSV export");
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: records.len(),
    })
}
