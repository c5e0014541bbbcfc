//! Field selector chains.
//!
//! A [`FieldChain`] is an ordered list of strategies for reading one field
//! out of an article container. Listing cards vary between page variants
//! (bylines only on some cards, headlines at different heading levels), so
//! each field tries its strategies in order and the first non-empty value
//! wins. A missing element is an ordinary outcome: when every strategy comes
//! up empty the field resolves to [`SENTINEL`].

use crate::config::ConfigError;
use crate::models::{Field, SENTINEL};
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

/// How a located element is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractMode {
    /// Concatenated text content, trimmed.
    Text,
    /// Raw value of the named attribute.
    Attribute(String),
}

/// A path of CSS selectors; each step searches inside the first match of the
/// previous step.
#[derive(Debug, Clone)]
pub struct Locator {
    raw: String,
    steps: Vec<Selector>,
}

impl Locator {
    pub fn parse(steps: &[String]) -> Result<Self, ConfigError> {
        let raw = steps.join(" >> ");
        let steps = steps
            .iter()
            .map(|step| {
                Selector::parse(step).map_err(|e| ConfigError::InvalidSelector {
                    selector: step.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { raw, steps })
    }

    /// Human-readable form, used in logs.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// First element reached by walking every step from `scope`.
    pub fn locate<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        let mut current = scope;
        for step in &self.steps {
            current = current.select(step).next()?;
        }
        Some(current)
    }

    /// Every element matched by the last step, in document order.
    pub fn select_all<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let Some((last, leading)) = self.steps.split_last() else {
            return Vec::new();
        };
        let mut scope = document.root_element();
        for step in leading {
            match scope.select(step).next() {
                Some(next) => scope = next,
                None => return Vec::new(),
            }
        }
        scope.select(last).collect()
    }

    /// Number of descendants of `scope` matched by this locator.
    pub fn count_within(&self, scope: ElementRef<'_>) -> usize {
        match self.steps.as_slice() {
            [only] => scope.select(only).count(),
            _ => usize::from(self.locate(scope).is_some()),
        }
    }
}

/// One (locator, mode) pair of a chain.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub locator: Locator,
    pub mode: ExtractMode,
}

impl Strategy {
    /// Read a value through this strategy, `None` if the element is absent
    /// or the value is blank.
    fn read(&self, container: ElementRef<'_>) -> Option<String> {
        let element = self.locator.locate(container)?;
        let value = match &self.mode {
            ExtractMode::Text => element.text().collect::<String>().trim().to_string(),
            ExtractMode::Attribute(name) => element.value().attr(name)?.to_string(),
        };
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Ordered strategies for a single field.
#[derive(Debug, Clone)]
pub struct FieldChain {
    field: Field,
    strategies: Vec<Strategy>,
}

impl FieldChain {
    pub fn new(field: Field, strategies: Vec<Strategy>) -> Self {
        Self { field, strategies }
    }

    pub fn field(&self) -> Field {
        self.field
    }
}

/// Run `chain` against `container`, returning the first non-empty value or
/// [`SENTINEL`]. Later strategies are not attempted once one succeeds.
pub fn extract(container: ElementRef<'_>, chain: &FieldChain) -> String {
    for (position, strategy) in chain.strategies.iter().enumerate() {
        if let Some(value) = strategy.read(container) {
            trace!(field = %chain.field, position, "Field resolved");
            return value;
        }
    }
    trace!(field = %chain.field, "No strategy matched; using sentinel");
    SENTINEL.to_string()
}
