//! Record extraction over every article container in a listing page.
//!
//! Containers are found with the configured selector list, narrowest first:
//! the first selector that matches anything decides the container set. Each
//! container is then read independently. A container with an unusable shape
//! is skipped and reported as a [`ContainerFault`]; the rest of the batch is
//! unaffected.

use crate::config::ScrapePlan;
use crate::models::CandidateRecord;
use crate::scrapers::selectors::{Locator, extract};
use scraper::{ElementRef, Html};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Structural problems that make a single container unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerFault {
    /// No element children at all, typically a lazy-load placeholder that
    /// was never rendered.
    #[error("container {index} is an empty shell")]
    EmptyShell { index: usize },

    /// The container wraps other containers matched by the same selector,
    /// so it is a wrapper rather than a single entry.
    #[error("container {index} wraps {nested} nested listing containers")]
    NestedListing { index: usize, nested: usize },
}

impl ContainerFault {
    pub fn index(&self) -> usize {
        match self {
            ContainerFault::EmptyShell { index } | ContainerFault::NestedListing { index, .. } => {
                *index
            }
        }
    }
}

/// Result of one extraction pass.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Candidates in document order.
    pub records: Vec<CandidateRecord>,
    /// Containers that were skipped, in document order.
    pub faults: Vec<ContainerFault>,
    /// Total containers found by the winning selector.
    pub containers: usize,
    /// The container selector that produced the container set, if any did.
    pub selector: Option<String>,
}

/// Pick the container set: the first selector with at least one match.
fn locate_containers<'a, 'p>(
    document: &'a Html,
    selectors: &'p [Locator],
) -> Option<(&'p Locator, Vec<ElementRef<'a>>)> {
    for selector in selectors {
        let found = selector.select_all(document);
        if found.is_empty() {
            debug!(selector = selector.as_str(), "Container selector matched nothing");
            continue;
        }
        return Some((selector, found));
    }
    None
}

/// Check the container shape before reading any field.
fn inspect(index: usize, container: ElementRef<'_>, selector: &Locator) -> Result<(), ContainerFault> {
    if !container.children().any(|node| node.value().is_element()) {
        return Err(ContainerFault::EmptyShell { index });
    }
    let nested = selector.count_within(container);
    if nested > 0 {
        return Err(ContainerFault::NestedListing { index, nested });
    }
    Ok(())
}

/// Read every field of one container into a candidate.
fn extract_record(
    index: usize,
    container: ElementRef<'_>,
    selector: &Locator,
    plan: &ScrapePlan,
) -> Result<CandidateRecord, ContainerFault> {
    inspect(index, container, selector)?;
    let mut record = CandidateRecord::missing();
    for chain in &plan.chains {
        record.set(chain.field(), extract(container, chain));
    }
    Ok(record)
}

/// Extract a candidate record from every container in `document`.
///
/// Never fails: an empty document or one with no containers yields an empty
/// [`Extraction`], and malformed containers are skipped individually.
#[instrument(level = "info", skip_all)]
pub fn extract_all(document: &Html, plan: &ScrapePlan) -> Extraction {
    let Some((selector, containers)) = locate_containers(document, &plan.containers) else {
        warn!(
            tried = plan.containers.len(),
            "No article containers found in document"
        );
        return Extraction::default();
    };
    info!(
        selector = selector.as_str(),
        count = containers.len(),
        "Located article containers"
    );

    let mut extraction = Extraction {
        containers: containers.len(),
        selector: Some(selector.as_str().to_string()),
        ..Extraction::default()
    };
    for (index, container) in containers.into_iter().enumerate() {
        match extract_record(index, container, selector, plan) {
            Ok(record) => {
                debug!(index, title = %record.title, "Extracted candidate");
                extraction.records.push(record);
            }
            Err(fault) => {
                warn!(index = fault.index(), error = %fault, "Skipping malformed container");
                extraction.faults.push(fault);
            }
        }
    }

    info!(
        containers = extraction.containers,
        records = extraction.records.len(),
        faults = extraction.faults.len(),
        "Extraction pass complete"
    );
    extraction
}
