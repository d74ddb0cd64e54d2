use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartDiffError};
use crate::util::SimilarityOptions;

/// Caller-supplied sink for diagnostic messages.
#[derive(Clone)]
pub struct LogCallback(Arc<dyn Fn(&str) + Send + Sync>);

impl LogCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub fn call(&self, message: &str) {
        (self.0)(message)
    }
}

impl fmt::Debug for LogCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogCallback(..)")
    }
}

/// What to emit when neither side has an acceptable fuzzy match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Always treat the unit from the older sequence as removed.
    #[default]
    RemoveFromA,
    /// Emit `added` for the newer unit when the older unit has the stronger
    /// look-ahead match, otherwise `removed` for the older unit.
    CompareBestSide,
}

/// Settings for [`SequenceAligner`](super::SequenceAligner).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignerSettings {
    /// Minimum score (0.0-1.0) for a direct or fuzzy match to pair two units.
    pub similarity_threshold: f64,

    /// How many units ahead the fuzzy search scans on each side.
    pub look_ahead_limit: usize,

    /// Paired units scoring strictly above this are `unchanged`, otherwise `modified`.
    pub unchanged_cutoff: f64,

    /// Lower-case both units before scoring.
    pub ignore_case: bool,

    /// Collapse whitespace runs before scoring.
    pub ignore_whitespace: bool,

    /// Add `content_bonus` to fuzzy scores when both units share a content label.
    pub use_content_types: bool,

    /// Bonus added on content-label agreement (capped at 1.0).
    pub content_bonus: f64,

    pub orphan_policy: OrphanPolicy,

    /// Copy page/paragraph metadata of the emitted unit onto each record.
    pub keep_metadata: bool,

    /// Optional callback for diagnostics at resync points.
    #[serde(skip)]
    pub log_callback: Option<LogCallback>,
}

impl Default for AlignerSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            look_ahead_limit: 10,
            unchanged_cutoff: 0.98,
            ignore_case: false,
            ignore_whitespace: true,
            use_content_types: true,
            content_bonus: 0.1,
            orphan_policy: OrphanPolicy::RemoveFromA,
            keep_metadata: true,
            log_callback: None,
        }
    }
}

impl AlignerSettings {
    /// Creates a new instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_look_ahead(mut self, limit: usize) -> Self {
        self.look_ahead_limit = limit;
        self
    }

    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    pub fn with_content_types(mut self, enable: bool) -> Self {
        self.use_content_types = enable;
        self
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    pub fn with_metadata(mut self, keep: bool) -> Self {
        self.keep_metadata = keep;
        self
    }

    pub fn with_log_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_callback = Some(LogCallback::new(callback));
        self
    }

    pub fn similarity_options(&self) -> SimilarityOptions {
        SimilarityOptions {
            ignore_case: self.ignore_case,
            ignore_whitespace: self.ignore_whitespace,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("similarityThreshold", self.similarity_threshold)?;
        check_unit_interval("unchangedCutoff", self.unchanged_cutoff)?;
        check_unit_interval("contentBonus", self.content_bonus)?;
        if self.look_ahead_limit == 0 {
            return Err(SmartDiffError::InvalidSettings(
                "lookAheadLimit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Logs a message if a callback is configured.
    pub fn log(&self, message: &str) {
        if let Some(ref callback) = self.log_callback {
            callback.call(message);
        }
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SmartDiffError::InvalidSettings(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn default_settings_have_expected_values() {
        let settings = AlignerSettings::default();

        assert_eq!(settings.similarity_threshold, 0.8);
        assert_eq!(settings.look_ahead_limit, 10);
        assert_eq!(settings.unchanged_cutoff, 0.98);
        assert!(!settings.ignore_case);
        assert!(settings.ignore_whitespace);
        assert!(settings.use_content_types);
        assert_eq!(settings.orphan_policy, OrphanPolicy::RemoveFromA);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn builder_pattern_works() {
        let settings = AlignerSettings::new()
            .with_threshold(0.6)
            .with_look_ahead(3)
            .with_ignore_case(true)
            .with_orphan_policy(OrphanPolicy::CompareBestSide);

        assert_eq!(settings.similarity_threshold, 0.6);
        assert_eq!(settings.look_ahead_limit, 3);
        assert!(settings.similarity_options().ignore_case);
        assert_eq!(settings.orphan_policy, OrphanPolicy::CompareBestSide);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(AlignerSettings::new().with_threshold(1.5).validate().is_err());
        assert!(AlignerSettings::new().with_threshold(f64::NAN).validate().is_err());
        assert!(AlignerSettings::new().with_look_ahead(0).validate().is_err());
    }

    #[test]
    fn deserializes_partial_json_over_defaults() {
        let settings: AlignerSettings =
            serde_json::from_str(r#"{"similarityThreshold":0.7,"orphanPolicy":"compare_best_side"}"#)
                .unwrap();

        assert_eq!(settings.similarity_threshold, 0.7);
        assert_eq!(settings.look_ahead_limit, 10);
        assert_eq!(settings.orphan_policy, OrphanPolicy::CompareBestSide);
        assert!(settings.log_callback.is_none());
    }

    #[test]
    fn log_callback_receives_messages() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let settings = AlignerSettings::new().with_log_callback(move |m| {
            sink.lock().unwrap().push(m.to_string());
        });

        settings.log("resync");
        settings.clone().log("again");

        assert_eq!(*messages.lock().unwrap(), vec!["resync", "again"]);
    }
}
