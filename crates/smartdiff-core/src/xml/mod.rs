//! Element tree model and positional tree diff for XML documents.

mod diff;
mod element;

pub use diff::{diff_attributes, diff_element, diff_xml};
pub use element::XmlElement;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ChangeRecord, ChangeType, TreeDiffSummary};

/// Tree summary plus element/attribute views over the same records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlDiffResult {
    #[serde(flatten)]
    pub summary: TreeDiffSummary,
}

impl XmlDiffResult {
    pub fn changes(&self) -> &[ChangeRecord] {
        &self.summary.changes
    }

    /// Added, removed and modified element records (including `.text` changes).
    pub fn element_changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.changes()
            .iter()
            .filter(|c| c.change_type != ChangeType::AttributeChanged)
    }

    pub fn attribute_changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.changes()
            .iter()
            .filter(|c| c.change_type == ChangeType::AttributeChanged)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

pub struct XmlComparer;

impl XmlComparer {
    pub fn compare(a: &XmlElement, b: &XmlElement) -> XmlDiffResult {
        let changes = diff_xml(a, b);
        XmlDiffResult {
            summary: TreeDiffSummary::new(changes, a.unit_count(), b.unit_count()),
        }
    }

    pub fn compare_text(a: &str, b: &str) -> Result<XmlDiffResult> {
        let a = XmlElement::parse(a)?;
        let b = XmlElement::parse(b)?;
        Ok(Self::compare(&a, &b))
    }
}
