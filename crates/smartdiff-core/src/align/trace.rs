//! Step-by-step record of an alignment run, for debugging resync decisions.

use serde::{Deserialize, Serialize};

/// What the scan did at one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TraceAction {
    /// Direct comparison met the threshold
    Direct,
    /// Fuzzy match found ahead in B; `skipped` B units became `added`
    ResyncB { matched: usize, skipped: usize },
    /// Fuzzy match found ahead in A; `skipped` A units became `removed`
    ResyncA { matched: usize, skipped: usize },
    /// No acceptable match on either side; one A unit became `removed`
    OrphanRemoved,
    /// No acceptable match on either side; one B unit became `added`
    OrphanAdded,
    /// A exhausted, remaining B units became `added`
    TailAdded { count: usize },
    /// B exhausted, remaining A units became `removed`
    TailRemoved { count: usize },
}

/// One iteration of the two-pointer scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignTraceStep {
    /// Cursor into the older sequence when the step started
    pub i: usize,
    /// Cursor into the newer sequence when the step started
    pub j: usize,
    pub direct_similarity: Option<f64>,
    /// Best look-ahead candidate in B for A[i]: (index, score)
    pub best_in_b: Option<(usize, f64)>,
    /// Best look-ahead candidate in A for B[j]: (index, score)
    pub best_in_a: Option<(usize, f64)>,
    pub action: TraceAction,
}

/// Trace output for a whole alignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignTrace {
    pub steps: Vec<AlignTraceStep>,
}

impl AlignTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: AlignTraceStep) {
        self.steps.push(step);
    }

    /// Number of steps where the scan had to resynchronize the cursors.
    pub fn resync_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.action, TraceAction::ResyncA { .. } | TraceAction::ResyncB { .. }))
            .count()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
