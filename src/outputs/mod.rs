//! Output files produced by a scrape run.
//!
//! # Submodules
//!
//! - [`csv`]: the tabular export of validated records (always written)
//! - [`page_source`]: optional diagnostic dump of the acquired page
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── techcrunch_articles.csv             # Title,Author,Date,URL,Description
//! └── page_source_20240101_120000.html    # only with --dump-page-source
//! ```

pub mod csv;
pub mod page_source;
