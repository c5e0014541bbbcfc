//! Data models for scraped listing entries.
//!
//! Records move through the pipeline in one direction only:
//! - [`CandidateRecord`]: raw values pulled out of one article container
//! - [`ValidatedRecord`]: a candidate that passed the completeness rules,
//!   with every field run through the text normalizer
//! - [`ExportRow`]: the fixed-order column view written to the CSV file
//!
//! Missing values are represented by [`SENTINEL`], never by an empty string.

use std::fmt;

/// Placeholder for "value not found".
pub const SENTINEL: &str = "N/A";

/// Column headers of the exported table, in output order.
pub const HEADER: [&str; 5] = ["Title", "Author", "Date", "URL", "Description"];

/// The five output fields of a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Author,
    Date,
    Link,
    Description,
}

impl Field {
    /// All fields, in extraction order.
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Author,
        Field::Date,
        Field::Link,
        Field::Description,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Date => "date",
            Field::Link => "link",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw values extracted from one article container.
///
/// Each field holds either the extracted text or [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub title: String,
    pub author: String,
    pub date: String,
    pub link: String,
    pub description: String,
}

impl CandidateRecord {
    /// A candidate where every field is missing.
    pub fn missing() -> Self {
        Self {
            title: SENTINEL.to_string(),
            author: SENTINEL.to_string(),
            date: SENTINEL.to_string(),
            link: SENTINEL.to_string(),
            description: SENTINEL.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Date => &self.date,
            Field::Link => &self.link,
            Field::Description => &self.description,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Title => self.title = value,
            Field::Author => self.author = value,
            Field::Date => self.date = value,
            Field::Link => self.link = value,
            Field::Description => self.description = value,
        }
    }

    pub fn is_missing(&self, field: Field) -> bool {
        self.get(field) == SENTINEL
    }
}

/// A candidate that passed validation, with normalized text in every field.
///
/// Only the validator constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) date: String,
    pub(crate) link: String,
    pub(crate) description: String,
}

impl ValidatedRecord {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Column view in [`HEADER`] order.
    pub fn export_row(&self) -> ExportRow<'_> {
        [
            self.title.as_str(),
            self.author.as_str(),
            self.date.as_str(),
            self.link.as_str(),
            self.description.as_str(),
        ]
    }
}

/// One table row: Title, Author, Date, URL, Description.
pub type ExportRow<'a> = [&'a str; 5];
