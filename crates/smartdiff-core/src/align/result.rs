use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartDiffError};
use crate::types::{ChangePosition, ChangeRecord, DiffStats};

/// Output of [`SequenceAligner::align`](super::SequenceAligner::align).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentResult {
    pub changes: Vec<ChangeRecord>,
    pub stats: DiffStats,
    pub similarity_percentage: u8,
    /// Mean per-record confidence; records without one count as 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

impl AlignmentResult {
    pub fn from_changes(changes: Vec<ChangeRecord>) -> Self {
        let stats = DiffStats::from_changes(&changes);
        let confidence_score = mean_confidence(&changes);

        Self {
            similarity_percentage: stats.similarity_percentage(),
            changes,
            stats,
            confidence_score,
        }
    }

    /// Concatenate chunk results in order, renumbering record positions.
    pub fn merge<I>(results: I) -> Self
    where
        I: IntoIterator<Item = AlignmentResult>,
    {
        let changes: Vec<ChangeRecord> = results
            .into_iter()
            .flat_map(|r| r.changes)
            .enumerate()
            .map(|(ordinal, mut record)| {
                record.position = ChangePosition::Index(ordinal);
                record
            })
            .collect();

        Self::from_changes(changes)
    }

    /// Fails when counts and records disagree.
    pub fn verify(&self) -> Result<()> {
        if self.stats.is_consistent(self.changes.len()) {
            Ok(())
        } else {
            Err(SmartDiffError::ComputationFailure(format!(
                "alignment stats {:?} do not match {} records",
                self.stats,
                self.changes.len()
            )))
        }
    }

    pub fn has_differences(&self) -> bool {
        self.stats.changed() > 0
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Default for AlignmentResult {
    fn default() -> Self {
        Self::from_changes(Vec::new())
    }
}

fn mean_confidence(changes: &[ChangeRecord]) -> Option<f64> {
    if changes.is_empty() {
        return None;
    }
    let sum: f64 = changes.iter().map(|c| c.confidence.unwrap_or(1.0)).sum();
    Some(sum / changes.len() as f64)
}
