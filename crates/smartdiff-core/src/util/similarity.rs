//! Normalized edit-distance similarity.
//!
//! Scores are `(max_len - distance) / max_len` over the normalized strings,
//! measured in chars, so every result lies in [0, 1].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// Normalization applied to both strings before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimilarityOptions {
    /// Lower-case both strings before comparing.
    pub ignore_case: bool,
    /// Collapse whitespace runs to a single space and trim.
    pub ignore_whitespace: bool,
}

impl SimilarityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }
}

/// Apply the configured normalization, borrowing when nothing changes.
pub fn normalize<'a>(s: &'a str, options: &SimilarityOptions) -> Cow<'a, str> {
    let mut out = Cow::Borrowed(s);

    if options.ignore_whitespace {
        let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed != *out {
            out = Cow::Owned(collapsed);
        }
    }

    if options.ignore_case && out.chars().any(char::is_uppercase) {
        out = Cow::Owned(out.to_lowercase());
    }

    out
}

/// Similarity between two strings in [0, 1].
pub fn similarity(a: &str, b: &str, options: &SimilarityOptions) -> f64 {
    let a = normalize(a, options);
    let b = normalize(b, options);

    if a == b {
        return 1.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

/// Levenshtein distance in chars with unit insert, delete and substitute costs.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}
