//! Scrape configuration: which containers to look for and how to read each field.
//!
//! A [`ScrapeConfig`] is plain data, loadable from YAML and defaulting to the
//! observed listing markup. It is compiled once per run into a [`ScrapePlan`]
//! holding parsed selectors, which is then passed by reference through the
//! extractor and validator.
//!
//! # YAML layout
//!
//! ```yaml
//! container_selectors:
//!   - div.wp-block-tc23-post-picker article
//!   - article
//! strictness: strict
//! base_url: https://techcrunch.com/
//! fields:
//!   title:
//!     - locator: ["h1, h2"]
//!   link:
//!     - locator: ["h1, h2", a]
//!       attribute: href
//! ```
//!
//! Fields omitted from the file keep their built-in chains.

use crate::models::Field;
use crate::scrapers::selectors::{ExtractMode, FieldChain, Locator, Strategy};
use crate::scrapers::validate::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

/// Errors raised while loading or compiling a [`ScrapeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid CSS selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no container selectors configured")]
    NoContainerSelectors,

    #[error("field {0} has no extraction strategies")]
    EmptyChain(Field),

    #[error("field {0} has a strategy with an empty locator")]
    EmptyLocator(Field),
}

/// How strictly candidate records are filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Reject records missing a title or a link.
    #[default]
    Strict,
    /// Keep every extracted record.
    Permissive,
}

/// One extraction strategy as written in the config file.
///
/// `locator` is a path of CSS selectors, each scoped to the first match of
/// the previous one. Without `attribute` the element's text is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub locator: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl StrategySpec {
    fn text(locator: &[&str]) -> Self {
        Self {
            locator: locator.iter().map(|s| s.to_string()).collect(),
            attribute: None,
        }
    }

    fn attribute(locator: &[&str], attribute: &str) -> Self {
        Self {
            locator: locator.iter().map(|s| s.to_string()).collect(),
            attribute: Some(attribute.to_string()),
        }
    }
}

/// Ordered strategy chains for each output field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSpecs {
    pub title: Vec<StrategySpec>,
    pub author: Vec<StrategySpec>,
    pub date: Vec<StrategySpec>,
    pub link: Vec<StrategySpec>,
    pub description: Vec<StrategySpec>,
}

impl FieldSpecs {
    pub fn chain(&self, field: Field) -> &[StrategySpec] {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Date => &self.date,
            Field::Link => &self.link,
            Field::Description => &self.description,
        }
    }
}

/// First heading of either level, in document order. Title and link both
/// start from it so the link always belongs to the title's heading.
const TITLE_HEADING: &str = "h1, h2";

impl Default for FieldSpecs {
    fn default() -> Self {
        Self {
            title: vec![StrategySpec::text(&[TITLE_HEADING])],
            author: vec![
                StrategySpec::text(&["a.river-byline__authors"]),
                StrategySpec::text(&[".river-byline__authors"]),
                StrategySpec::text(&[".loop-card__author"]),
            ],
            date: vec![
                StrategySpec::attribute(&["time"], "datetime"),
                StrategySpec::text(&["time"]),
            ],
            link: vec![StrategySpec::attribute(&[TITLE_HEADING, "a"], "href")],
            description: vec![StrategySpec::text(&["p"])],
        }
    }
}

/// Everything that parameterizes one scrape run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Container selectors, narrowest first. The first one that matches
    /// anything is used for the whole document.
    pub container_selectors: Vec<String>,
    pub fields: FieldSpecs,
    pub strictness: Strictness,
    /// Base against which relative links are resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            container_selectors: vec![
                "div.wp-block-tc23-post-picker article".to_string(),
                "article".to_string(),
            ],
            fields: FieldSpecs::default(),
            strictness: Strictness::Strict,
            base_url: None,
        }
    }
}

impl ScrapeConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a config file from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        info!(
            containers = config.container_selectors.len(),
            strictness = ?config.strictness,
            "Loaded scrape configuration"
        );
        Ok(config)
    }

    /// Parse every selector and URL once, producing the immutable plan for a run.
    pub fn compile(&self) -> Result<ScrapePlan, ConfigError> {
        if self.container_selectors.is_empty() {
            return Err(ConfigError::NoContainerSelectors);
        }
        let containers = self
            .container_selectors
            .iter()
            .map(|raw| Locator::parse(std::slice::from_ref(raw)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut chains = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let specs = self.fields.chain(field);
            if specs.is_empty() {
                return Err(ConfigError::EmptyChain(field));
            }
            let mut strategies = Vec::with_capacity(specs.len());
            for spec in specs {
                if spec.locator.is_empty() {
                    return Err(ConfigError::EmptyLocator(field));
                }
                let mode = match &spec.attribute {
                    Some(name) => ExtractMode::Attribute(name.clone()),
                    None => ExtractMode::Text,
                };
                strategies.push(Strategy {
                    locator: Locator::parse(&spec.locator)?,
                    mode,
                });
            }
            chains.push(FieldChain::new(field, strategies));
        }

        let base_url = match &self.base_url {
            Some(raw) => Some(Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
                url: raw.clone(),
                source,
            })?),
            None => None,
        };

        Ok(ScrapePlan {
            containers,
            chains,
            policy: ValidationPolicy {
                strictness: self.strictness,
                base_url,
            },
        })
    }
}

/// Compiled, immutable form of a [`ScrapeConfig`].
#[derive(Debug)]
pub struct ScrapePlan {
    pub containers: Vec<Locator>,
    /// One chain per field, in [`Field::ALL`] order.
    pub chains: Vec<FieldChain>,
    pub policy: ValidationPolicy,
}
