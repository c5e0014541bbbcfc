//! The listing extraction pipeline.
//!
//! A rendered listing page goes through three stages, all synchronous:
//!
//! 1. **Extraction** ([`extract`]): locate article containers and read each
//!    field through its selector chain ([`selectors`]), yielding candidates
//! 2. **Validation** ([`validate`]): drop candidates missing identity fields
//!    and normalize the text of the rest
//! 3. **Export** (handled by [`crate::outputs`])
//!
//! [`scrape_document`] runs the first two stages for one document.
//!
//! # Failure isolation
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Field not found | value is `N/A` |
//! | Malformed container | container skipped, fault recorded |
//! | No containers / empty document | empty outcome |
//! | Candidate missing title or link | rejected (strict policy) |

pub mod extract;
pub mod selectors;
pub mod validate;

use crate::config::ScrapePlan;
use extract::{ContainerFault, extract_all};
use scraper::Html;
use tracing::{info, instrument, warn};
use validate::filter_records;

use crate::models::ValidatedRecord;

/// Everything produced by one pass over a document.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// Accepted records, in document order.
    pub records: Vec<ValidatedRecord>,
    /// Containers found in the document.
    pub containers: usize,
    /// Containers skipped for structural reasons.
    pub faults: Vec<ContainerFault>,
    /// Candidates dropped by validation.
    pub rejected: usize,
}

/// Parse `markup` and run extraction and validation over it.
#[instrument(level = "info", skip_all, fields(bytes = markup.len()))]
pub fn scrape_document(markup: &str, plan: &ScrapePlan) -> ScrapeOutcome {
    let document = Html::parse_document(markup);
    let extraction = extract_all(&document, plan);
    let (records, rejected) = filter_records(&extraction.records, &plan.policy);

    if records.is_empty() {
        warn!(
            containers = extraction.containers,
            rejected, "No articles survived extraction"
        );
    } else {
        info!(
            selector = extraction.selector.as_deref().unwrap_or("none"),
            accepted = records.len(),
            rejected,
            faults = extraction.faults.len(),
            "Scraped articles"
        );
    }

    ScrapeOutcome {
        records,
        containers: extraction.containers,
        faults: extraction.faults,
        rejected,
    }
}
