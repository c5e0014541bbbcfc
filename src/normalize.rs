//! Text normalization for extracted field values.
//!
//! Scraped text arrives with whatever code points the publisher used: curly
//! quotes, typographic dashes, ellipsis glyphs, non-breaking spaces and
//! compatibility forms such as ligatures. [`normalize`] folds all of these
//! into a single plain representation so the CSV output stays stable and
//! easy to consume.
//!
//! NFKC runs first and already folds the ellipsis glyph to `...` and the
//! non-breaking space to a plain space. The replacement table only holds
//! characters NFKC leaves alone: curly quotes and dashes.

use unicode_normalization::UnicodeNormalization;

/// Typographic characters and their ASCII replacements.
const REPLACEMENTS: [(char, &str); 6] = [
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2014}', "-"),
    ('\u{2013}', "-"),
];

/// Apply Unicode NFKC normalization without any other change.
///
/// Used for the page-source dump, which must stay otherwise verbatim.
pub fn canonicalize(text: &str) -> String {
    text.nfkc().collect()
}

/// Normalize a field value: NFKC, map typographic characters to ASCII, trim.
///
/// Never fails; empty input yields an empty string. The result is a fixed
/// point: `normalize(&normalize(x)) == normalize(x)`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("  Foo\u{2019}s \u{201C}Big\u{201D} Launch\u{2014}Today "), "Foo's \"Big\" Launch-Today");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfkc() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out.trim().to_string()
}
