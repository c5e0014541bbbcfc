//! Completeness rules for candidate records.
//!
//! Identity fields (title and link) are required under the strict policy;
//! author, date and description may stay [`SENTINEL`](crate::models::SENTINEL).
//! Accepted records have every field normalized.

use crate::config::Strictness;
use crate::models::{CandidateRecord, Field, ValidatedRecord};
use crate::normalize::normalize;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Validation settings for one run.
#[derive(Debug, Clone, Default)]
pub struct ValidationPolicy {
    pub strictness: Strictness,
    /// Relative links are resolved against this when set.
    pub base_url: Option<Url>,
}

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing title")]
    MissingTitle,
    #[error("missing link")]
    MissingLink,
}

/// Accept or reject one candidate.
pub fn validate(
    candidate: &CandidateRecord,
    policy: &ValidationPolicy,
) -> Result<ValidatedRecord, Rejection> {
    if policy.strictness == Strictness::Strict {
        if candidate.is_missing(Field::Title) {
            return Err(Rejection::MissingTitle);
        }
        if candidate.is_missing(Field::Link) {
            return Err(Rejection::MissingLink);
        }
    }

    let mut link = normalize(&candidate.link);
    if let Some(base) = &policy.base_url {
        if !candidate.is_missing(Field::Link) {
            match base.join(&link) {
                Ok(resolved) => link = resolved.to_string(),
                Err(e) => debug!(%link, error = %e, "Could not resolve link; keeping as-is"),
            }
        }
    }

    Ok(ValidatedRecord {
        title: normalize(&candidate.title),
        author: normalize(&candidate.author),
        date: normalize(&candidate.date),
        link,
        description: normalize(&candidate.description),
    })
}

/// Validate a batch, keeping accepted records in input order.
///
/// Returns the accepted records and the number rejected.
pub fn filter_records(
    candidates: &[CandidateRecord],
    policy: &ValidationPolicy,
) -> (Vec<ValidatedRecord>, usize) {
    let mut accepted = Vec::with_capacity(candidates.len());
    let mut rejected = 0;
    for (index, candidate) in candidates.iter().enumerate() {
        match validate(candidate, policy) {
            Ok(record) => accepted.push(record),
            Err(reason) => {
                rejected += 1;
                debug!(index, %reason, title = %candidate.title, "Rejected candidate");
            }
        }
    }
    (accepted, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL;

    fn candidate(title: &str, link: &str) -> CandidateRecord {
        CandidateRecord {
            title: title.to_string(),
            link: link.to_string(),
            ..CandidateRecord::missing()
        }
    }

    #[test]
    fn test_sentinel_title_rejected() {
        let mut c = candidate(SENTINEL, "/foo");
        c.author = "Someone".to_string();
        c.date = "2024-01-01".to_string();
        c.description = "Text".to_string();
        assert_eq!(
            validate(&c, &ValidationPolicy::default()),
            Err(Rejection::MissingTitle)
        );
    }

    #[test]
    fn test_sentinel_link_rejected() {
        let c = candidate("Promo card", SENTINEL);
        assert_eq!(
            validate(&c, &ValidationPolicy::default()),
            Err(Rejection::MissingLink)
        );
    }

    #[test]
    fn test_optional_fields_may_be_sentinel() {
        let record = validate(&candidate("Title", "/foo"), &ValidationPolicy::default()).unwrap();
        assert_eq!(record.title(), "Title");
        assert_eq!(record.link(), "/foo");
        assert_eq!(record.author(), SENTINEL);
        assert_eq!(record.date(), SENTINEL);
        assert_eq!(record.description(), SENTINEL);
    }

    #[test]
    fn test_accepted_fields_are_normalized() {
        let mut c = candidate("  Foo\u{2019}s \u{201C}Big\u{201D} Launch\u{2014}Today ", " /foo ");
        c.description = "Wait for it\u{2026}".to_string();
        let record = validate(&c, &ValidationPolicy::default()).unwrap();
        assert_eq!(record.title(), "Foo's \"Big\" Launch-Today");
        assert_eq!(record.link(), "/foo");
        assert_eq!(record.description(), "Wait for it...");
    }

    #[test]
    fn test_permissive_keeps_everything() {
        let policy = ValidationPolicy {
            strictness: Strictness::Permissive,
            ..ValidationPolicy::default()
        };
        let record = validate(&CandidateRecord::missing(), &policy).unwrap();
        assert_eq!(record.title(), SENTINEL);
        assert_eq!(record.link(), SENTINEL);
    }

    #[test]
    fn test_relative_link_resolved_against_base() {
        let policy = ValidationPolicy {
            base_url: Some(Url::parse("https://techcrunch.com/").unwrap()),
            ..ValidationPolicy::default()
        };
        let record = validate(&candidate("T", "/2024/01/01/foo/"), &policy).unwrap();
        assert_eq!(record.link(), "https://techcrunch.com/2024/01/01/foo/");

        let absolute = validate(&candidate("T", "https://example.com/x"), &policy).unwrap();
        assert_eq!(absolute.link(), "https://example.com/x");
    }

    #[test]
    fn test_sentinel_link_never_resolved() {
        let policy = ValidationPolicy {
            strictness: Strictness::Permissive,
            base_url: Some(Url::parse("https://techcrunch.com/").unwrap()),
        };
        let record = validate(&candidate("T", SENTINEL), &policy).unwrap();
        assert_eq!(record.link(), SENTINEL);
    }

    #[test]
    fn test_filter_records_preserves_order_and_counts() {
        let candidates = vec![
            candidate("A", "/a"),
            candidate(SENTINEL, "/b"),
            candidate("C", "/c"),
            candidate("D", SENTINEL),
        ];
        let (accepted, rejected) = filter_records(&candidates, &ValidationPolicy::default());
        let titles: Vec<&str> = accepted.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(rejected, 2);
    }
}
