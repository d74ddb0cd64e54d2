//! Shared data model for every differ.
//!
//! Inputs are [`TextUnit`] sequences (aligner) or parsed trees (JSON/XML);
//! every differ reports through the same [`ChangeRecord`] shape so the
//! presentation layer can render them uniformly.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SmartDiffError};
use crate::util::classify::ContentType;

/// Classification of a single change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Present only in the newer document
    Added,
    /// Present only in the older document
    Removed,
    /// Present in both, with different content
    Modified,
    /// Present in both, content considered identical
    Unchanged,
    /// XML attribute added, removed or changed on an element present in both
    AttributeChanged,
}

impl ChangeType {
    /// Whether this record counts as a difference.
    pub fn is_change(self) -> bool {
        !matches!(self, ChangeType::Unchanged)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Added => write!(f, "added"),
            ChangeType::Removed => write!(f, "removed"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Unchanged => write!(f, "unchanged"),
            ChangeType::AttributeChanged => write!(f, "attribute_changed"),
        }
    }
}

/// Where a change happened: a tree path for JSON/XML, an ordinal for sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangePosition {
    Path(String),
    Index(usize),
}

impl ChangePosition {
    pub fn as_path(&self) -> Option<&str> {
        match self {
            ChangePosition::Path(p) => Some(p),
            ChangePosition::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            ChangePosition::Index(i) => Some(*i),
            ChangePosition::Path(_) => None,
        }
    }
}

impl fmt::Display for ChangePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangePosition::Path(p) => write!(f, "{}", p),
            ChangePosition::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for ChangePosition {
    fn from(path: String) -> Self {
        ChangePosition::Path(path)
    }
}

impl From<&str> for ChangePosition {
    fn from(path: &str) -> Self {
        ChangePosition::Path(path.to_string())
    }
}

impl From<usize> for ChangePosition {
    fn from(index: usize) -> Self {
        ChangePosition::Index(index)
    }
}

/// A single classified difference.
///
/// `modified` records carry both values, `added` only the new one and
/// `removed` only the old one. The constructors enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub position: ChangePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    /// Match quality in [0,1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_percentage: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    /// Set on `attribute_changed` records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UnitMetadata>,
}

impl ChangeRecord {
    fn bare(change_type: ChangeType, position: ChangePosition) -> Self {
        Self {
            change_type,
            position,
            old_value: None,
            new_value: None,
            confidence: None,
            similarity_percentage: None,
            content_type: None,
            attribute_name: None,
            metadata: None,
        }
    }

    pub fn added(position: impl Into<ChangePosition>, new_value: impl Into<Value>) -> Self {
        Self {
            new_value: Some(new_value.into()),
            ..Self::bare(ChangeType::Added, position.into())
        }
    }

    pub fn removed(position: impl Into<ChangePosition>, old_value: impl Into<Value>) -> Self {
        Self {
            old_value: Some(old_value.into()),
            ..Self::bare(ChangeType::Removed, position.into())
        }
    }

    pub fn modified(
        position: impl Into<ChangePosition>,
        old_value: impl Into<Value>,
        new_value: impl Into<Value>,
    ) -> Self {
        Self {
            old_value: Some(old_value.into()),
            new_value: Some(new_value.into()),
            ..Self::bare(ChangeType::Modified, position.into())
        }
    }

    pub fn unchanged(
        position: impl Into<ChangePosition>,
        old_value: impl Into<Value>,
        new_value: impl Into<Value>,
    ) -> Self {
        Self {
            old_value: Some(old_value.into()),
            new_value: Some(new_value.into()),
            ..Self::bare(ChangeType::Unchanged, position.into())
        }
    }

    /// A missing side is reported as an absent value rather than a sentinel string.
    pub fn attribute_changed(
        position: impl Into<ChangePosition>,
        attribute_name: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            old_value: old_value.map(Value::String),
            new_value: new_value.map(Value::String),
            attribute_name: Some(attribute_name.into()),
            ..Self::bare(ChangeType::AttributeChanged, position.into())
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_similarity_percentage(mut self, percentage: u8) -> Self {
        self.similarity_percentage = Some(percentage.min(100));
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_metadata(mut self, metadata: Option<UnitMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn old_text(&self) -> Option<&str> {
        self.old_value.as_ref().and_then(Value::as_str)
    }

    pub fn new_text(&self) -> Option<&str> {
        self.new_value.as_ref().and_then(Value::as_str)
    }
}

/// Counts by change type for sequence-shaped results.
///
/// `attribute_changed` records are counted as `modified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn record(&mut self, change_type: ChangeType) {
        self.total += 1;
        match change_type {
            ChangeType::Added => self.added += 1,
            ChangeType::Removed => self.removed += 1,
            ChangeType::Modified | ChangeType::AttributeChanged => self.modified += 1,
            ChangeType::Unchanged => self.unchanged += 1,
        }
    }

    pub fn from_changes(changes: &[ChangeRecord]) -> Self {
        let mut stats = Self::default();
        for change in changes {
            stats.record(change.change_type);
        }
        stats
    }

    pub fn changed(&self) -> usize {
        self.added + self.removed + self.modified
    }

    /// `round(100 * (total - changed) / total)`; an empty comparison is 100.
    pub fn similarity_percentage(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let unchanged = self.total.saturating_sub(self.changed());
        (100.0 * unchanged as f64 / self.total as f64).round() as u8
    }

    pub fn is_consistent(&self, record_count: usize) -> bool {
        self.added + self.removed + self.modified + self.unchanged == self.total
            && self.total == record_count
    }

    pub fn merge(&mut self, other: &DiffStats) {
        self.total += other.total;
        self.added += other.added;
        self.removed += other.removed;
        self.modified += other.modified;
        self.unchanged += other.unchanged;
    }
}

/// Uniform summary for the tree differs.
///
/// `total_units` is the larger of the two trees' unit counts; matches are
/// whatever is left after subtracting the differences, floored at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDiffSummary {
    pub changes: Vec<ChangeRecord>,
    pub differences_found: usize,
    pub matches_found: usize,
    pub total_units: usize,
    pub similarity_percentage: u8,
}

impl TreeDiffSummary {
    pub fn new(changes: Vec<ChangeRecord>, units_a: usize, units_b: usize) -> Self {
        let total_units = units_a.max(units_b);
        let differences_found = changes.len();
        let matches_found = total_units - differences_found.min(total_units);
        let similarity_percentage = if total_units == 0 {
            100
        } else {
            (100.0 * matches_found as f64 / total_units as f64).round() as u8
        };

        Self {
            changes,
            differences_found,
            matches_found,
            total_units,
            similarity_percentage,
        }
    }

    pub fn has_differences(&self) -> bool {
        self.differences_found > 0
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Layout hints attached to a unit by the document parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_position: Option<f64>,
}

impl UnitMetadata {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn with_paragraph_index(mut self, index: usize) -> Self {
        self.paragraph_index = Some(index);
        self
    }

    pub fn with_y_position(mut self, y: f64) -> Self {
        self.y_position = Some(y);
        self
    }
}

/// One comparable unit of text (a line, paragraph or extracted PDF block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UnitMetadata>,
}

impl TextUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(text: impl Into<String>, metadata: UnitMetadata) -> Self {
        Self {
            text: text.into(),
            metadata: Some(metadata),
        }
    }

    pub fn page(&self) -> Option<u32> {
        self.metadata.as_ref().and_then(|m| m.page)
    }

    /// Validate one loosely-typed unit: a bare string, or an object with a
    /// string `text` field and optional `metadata` object.
    pub fn from_value(index: usize, value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(TextUnit::new(text.clone())),
            Value::Object(map) => {
                let text = match map.get("text") {
                    Some(Value::String(text)) => text.clone(),
                    Some(other) => {
                        return Err(SmartDiffError::invalid_input(
                            index,
                            format!("field 'text' must be a string, found {}", value_kind(other)),
                        ))
                    }
                    None => {
                        return Err(SmartDiffError::invalid_input(
                            index,
                            "object is missing the 'text' field",
                        ))
                    }
                };

                let metadata = match map.get("metadata") {
                    None | Some(Value::Null) => None,
                    Some(raw) => Some(
                        serde_json::from_value::<UnitMetadata>(raw.clone())
                            .map_err(|e| SmartDiffError::invalid_input(index, e.to_string()))?,
                    ),
                };

                Ok(TextUnit { text, metadata })
            }
            other => Err(SmartDiffError::invalid_input(
                index,
                format!(
                    "expected a string or an object with a text field, found {}",
                    value_kind(other)
                ),
            )),
        }
    }

    /// Validate a whole sequence up front so malformed input fails before any scan.
    pub fn sequence_from_value(value: &Value) -> Result<Vec<Self>> {
        let items = value.as_array().ok_or_else(|| {
            SmartDiffError::invalid_input(
                0,
                format!("expected an array of text units, found {}", value_kind(value)),
            )
        })?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| TextUnit::from_value(index, item))
            .collect()
    }
}

impl From<&str> for TextUnit {
    fn from(text: &str) -> Self {
        TextUnit::new(text)
    }
}

impl From<String> for TextUnit {
    fn from(text: String) -> Self {
        TextUnit::new(text)
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Split raw text into one unit per non-blank line.
///
/// Form feeds start a new page; `paragraph_index` counts emitted units.
pub fn text_units_from_lines(text: &str) -> Vec<TextUnit> {
    let mut units = Vec::new();

    for (page, body) in split_pages(text) {
        for line in body.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let metadata = UnitMetadata::page(page).with_paragraph_index(units.len());
            units.push(TextUnit::with_metadata(trimmed, metadata));
        }
    }

    units
}

/// Split raw text into paragraphs separated by blank lines.
///
/// Lines inside a paragraph are joined with a single space.
pub fn text_units_from_paragraphs(text: &str) -> Vec<TextUnit> {
    let mut units = Vec::new();

    for (page, body) in split_pages(text) {
        let mut current: Vec<&str> = Vec::new();

        for line in body.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                flush_paragraph(&mut current, page, &mut units);
            } else {
                current.push(trimmed);
            }
        }
        flush_paragraph(&mut current, page, &mut units);
    }

    units
}

fn flush_paragraph(current: &mut Vec<&str>, page: u32, units: &mut Vec<TextUnit>) {
    if current.is_empty() {
        return;
    }
    let metadata = UnitMetadata::page(page).with_paragraph_index(units.len());
    units.push(TextUnit::with_metadata(current.join(" "), metadata));
    current.clear();
}

fn split_pages(text: &str) -> impl Iterator<Item = (u32, &str)> {
    text.split('\x0c')
        .enumerate()
        .map(|(i, body)| (i as u32 + 1, body))
}
