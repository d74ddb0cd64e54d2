//! Recursive structural diff over JSON trees.

mod diff;

pub use diff::{count_units, diff_at, diff_json, values_equal};

use serde_json::Value;

use crate::error::Result;
use crate::types::TreeDiffSummary;

pub type JsonDiffResult = TreeDiffSummary;

pub struct JsonComparer;

impl JsonComparer {
    pub fn compare(a: &Value, b: &Value) -> JsonDiffResult {
        let changes = diff_json(a, b);
        TreeDiffSummary::new(changes, count_units(a), count_units(b))
    }

    /// Parse both documents, then compare.
    pub fn compare_text(a: &str, b: &str) -> Result<JsonDiffResult> {
        let a = parse_json(a)?;
        let b = parse_json(b)?;
        Ok(Self::compare(&a, &b))
    }
}

pub fn parse_json(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_counts_units_of_larger_tree() {
        let a = json!({ "name": "Widget", "price": 10 });
        let b = json!({ "name": "Widget", "price": 12, "sku": "W-1" });
        let result = JsonComparer::compare(&a, &b);

        assert_eq!(result.total_units, 3);
        assert_eq!(result.differences_found, 2);
        assert_eq!(result.matches_found, 1);
        assert_eq!(result.similarity_percentage, 33);
    }

    #[test]
    fn invalid_text_is_a_json_error() {
        let err = JsonComparer::compare_text("{", "{}").unwrap_err();
        assert!(matches!(err, crate::error::SmartDiffError::Json(_)));
    }
}
