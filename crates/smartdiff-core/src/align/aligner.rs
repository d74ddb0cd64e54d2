//! Two-pointer sequence alignment with bounded look-ahead resync.
//!
//! A plain index-by-index comparison breaks after a single inserted or
//! deleted unit: every later unit looks modified. This scan compares the
//! units under both cursors and, on a mismatch, searches a small window
//! ahead on each side for the best fuzzy match so both cursors can jump back
//! into step. Cost is O(n * look_ahead_limit) similarity evaluations.

use serde_json::Value;

use super::result::AlignmentResult;
use super::settings::{AlignerSettings, OrphanPolicy};
use super::trace::{AlignTrace, AlignTraceStep, TraceAction};
use crate::error::Result;
use crate::types::{ChangeRecord, TextUnit, UnitMetadata};
use crate::util::{apply_content_bonus, classify, similarity, ContentType, SimilarityOptions};

pub struct SequenceAligner;

impl SequenceAligner {
    /// Align two unit sequences and classify every unit.
    pub fn align(
        seq_a: &[TextUnit],
        seq_b: &[TextUnit],
        settings: Option<&AlignerSettings>,
    ) -> Result<AlignmentResult> {
        let settings = settings.cloned().unwrap_or_default();
        settings.validate()?;

        let mut scan = Scan::new(seq_a, seq_b, &settings);
        scan.run();
        scan.finish()
    }

    /// Align two loosely-typed JSON arrays, validating every unit before the scan.
    pub fn align_values(
        seq_a: &Value,
        seq_b: &Value,
        settings: Option<&AlignerSettings>,
    ) -> Result<AlignmentResult> {
        let units_a = TextUnit::sequence_from_value(seq_a)?;
        let units_b = TextUnit::sequence_from_value(seq_b)?;
        Self::align(&units_a, &units_b, settings)
    }

    /// Align and also return a step-by-step trace of the scan.
    #[cfg(feature = "trace")]
    pub fn align_traced(
        seq_a: &[TextUnit],
        seq_b: &[TextUnit],
        settings: Option<&AlignerSettings>,
    ) -> Result<(AlignmentResult, AlignTrace)> {
        let settings = settings.cloned().unwrap_or_default();
        settings.validate()?;

        let mut scan = Scan::new(seq_a, seq_b, &settings);
        scan.trace = Some(AlignTrace::new());
        scan.run();
        let trace = scan.trace.take().unwrap_or_default();
        Ok((scan.finish()?, trace))
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    /// Raw similarity, used for unchanged/modified and confidence
    similarity: f64,
    /// Similarity plus content bonus, used to pick and accept the match
    score: f64,
}

struct Scan<'a> {
    a: &'a [TextUnit],
    b: &'a [TextUnit],
    settings: &'a AlignerSettings,
    options: SimilarityOptions,
    types_a: Vec<ContentType>,
    types_b: Vec<ContentType>,
    changes: Vec<ChangeRecord>,
    /// Collected only when requested through `align_traced`
    trace: Option<AlignTrace>,
}

impl<'a> Scan<'a> {
    fn new(a: &'a [TextUnit], b: &'a [TextUnit], settings: &'a AlignerSettings) -> Self {
        Self {
            a,
            b,
            settings,
            options: settings.similarity_options(),
            types_a: a.iter().map(|u| classify(&u.text)).collect(),
            types_b: b.iter().map(|u| classify(&u.text)).collect(),
            changes: Vec::with_capacity(a.len().max(b.len())),
            trace: None,
        }
    }

    fn run(&mut self) {
        let threshold = self.settings.similarity_threshold;
        let (n, m) = (self.a.len(), self.b.len());
        let (mut i, mut j) = (0usize, 0usize);

        loop {
            if i >= n && j >= m {
                break;
            }

            if i >= n {
                for k in j..m {
                    self.emit_added(k);
                }
                self.record_step(i, j, None, None, None, TraceAction::TailAdded { count: m - j });
                break;
            }

            if j >= m {
                for k in i..n {
                    self.emit_removed(k);
                }
                self.record_step(i, j, None, None, None, TraceAction::TailRemoved { count: n - i });
                break;
            }

            let direct = similarity(&self.a[i].text, &self.b[j].text, &self.options);
            if direct >= threshold {
                self.emit_pair(i, j, direct);
                self.record_step(i, j, Some(direct), None, None, TraceAction::Direct);
                i += 1;
                j += 1;
                continue;
            }

            let best_b = self.best_match_in_b(i, j);
            let best_a = self.best_match_in_a(i, j);
            let score_b = best_b.map_or(0.0, |c| c.score);
            let score_a = best_a.map_or(0.0, |c| c.score);

            if let Some(found) = best_b.filter(|c| c.score >= threshold && c.score >= score_a) {
                let skipped = found.index - j;
                for k in j..found.index {
                    self.emit_added(k);
                }
                self.emit_pair(i, found.index, found.similarity);
                if skipped > 0 {
                    self.settings.log(&format!(
                        "resync: {} unit(s) added before b[{}]",
                        skipped, found.index
                    ));
                }
                self.record_step(i, j, Some(direct), best_b, best_a, TraceAction::ResyncB {
                    matched: found.index,
                    skipped,
                });
                i += 1;
                j = found.index + 1;
            } else if let Some(found) = best_a.filter(|c| c.score >= threshold) {
                let skipped = found.index - i;
                for k in i..found.index {
                    self.emit_removed(k);
                }
                self.emit_pair(found.index, j, found.similarity);
                if skipped > 0 {
                    self.settings.log(&format!(
                        "resync: {} unit(s) removed before a[{}]",
                        skipped, found.index
                    ));
                }
                self.record_step(i, j, Some(direct), best_b, best_a, TraceAction::ResyncA {
                    matched: found.index,
                    skipped,
                });
                j += 1;
                i = found.index + 1;
            } else if self.settings.orphan_policy == OrphanPolicy::CompareBestSide
                && score_b > score_a
            {
                self.emit_added(j);
                self.record_step(i, j, Some(direct), best_b, best_a, TraceAction::OrphanAdded);
                j += 1;
            } else {
                self.emit_removed(i);
                self.record_step(i, j, Some(direct), best_b, best_a, TraceAction::OrphanRemoved);
                i += 1;
            }
        }
    }

    fn finish(self) -> Result<AlignmentResult> {
        let result = AlignmentResult::from_changes(self.changes);
        result.verify()?;
        Ok(result)
    }

    /// Best candidate for `a[i]` within `b[j .. j + look_ahead)`.
    fn best_match_in_b(&self, i: usize, j: usize) -> Option<Candidate> {
        let end = (j + self.settings.look_ahead_limit).min(self.b.len());
        self.best_candidate(
            &self.a[i].text,
            self.types_a[i],
            (j..end).map(|k| (k, self.b[k].text.as_str(), self.types_b[k])),
        )
    }

    /// Best candidate for `b[j]` within `a[i .. i + look_ahead)`.
    fn best_match_in_a(&self, i: usize, j: usize) -> Option<Candidate> {
        let end = (i + self.settings.look_ahead_limit).min(self.a.len());
        self.best_candidate(
            &self.b[j].text,
            self.types_b[j],
            (i..end).map(|k| (k, self.a[k].text.as_str(), self.types_a[k])),
        )
    }

    fn best_candidate<'t>(
        &self,
        target: &str,
        target_type: ContentType,
        window: impl Iterator<Item = (usize, &'t str, ContentType)>,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for (index, text, content_type) in window {
            let raw = similarity(target, text, &self.options);
            let score = if self.settings.use_content_types {
                apply_content_bonus(raw, target_type, content_type, self.settings.content_bonus)
            } else {
                raw
            };
            // Strictly greater keeps the first occurrence on ties.
            if best.map_or(true, |b| score > b.score) {
                best = Some(Candidate {
                    index,
                    similarity: raw,
                    score,
                });
            }
        }

        best
    }

    fn metadata_of(&self, unit: &TextUnit) -> Option<UnitMetadata> {
        if self.settings.keep_metadata {
            unit.metadata.clone()
        } else {
            None
        }
    }

    fn emit_added(&mut self, k: usize) {
        let unit = &self.b[k];
        let record = ChangeRecord::added(self.changes.len(), unit.text.as_str())
            .with_content_type(self.types_b[k])
            .with_metadata(self.metadata_of(unit));
        self.changes.push(record);
    }

    fn emit_removed(&mut self, k: usize) {
        let unit = &self.a[k];
        let record = ChangeRecord::removed(self.changes.len(), unit.text.as_str())
            .with_content_type(self.types_a[k])
            .with_metadata(self.metadata_of(unit));
        self.changes.push(record);
    }

    fn emit_pair(&mut self, ia: usize, jb: usize, score: f64) {
        let (old, new) = (&self.a[ia], &self.b[jb]);
        let position = self.changes.len();

        let record = if score > self.settings.unchanged_cutoff {
            ChangeRecord::unchanged(position, old.text.as_str(), new.text.as_str())
                .with_confidence(1.0)
        } else {
            ChangeRecord::modified(position, old.text.as_str(), new.text.as_str())
                .with_confidence(score)
                .with_similarity_percentage((score * 100.0).round() as u8)
        };

        let record = record
            .with_content_type(self.types_b[jb])
            .with_metadata(self.metadata_of(new));
        self.changes.push(record);
    }

    fn record_step(
        &mut self,
        i: usize,
        j: usize,
        direct: Option<f64>,
        best_b: Option<Candidate>,
        best_a: Option<Candidate>,
        action: TraceAction,
    ) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(AlignTraceStep {
                i,
                j,
                direct_similarity: direct,
                best_in_b: best_b.map(|c| (c.index, c.score)),
                best_in_a: best_a.map(|c| (c.index, c.score)),
                action,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeType;
    use pretty_assertions::assert_eq;

    fn units(texts: &[&str]) -> Vec<TextUnit> {
        texts.iter().map(|t| TextUnit::new(*t)).collect()
    }

    fn types(result: &AlignmentResult) -> Vec<ChangeType> {
        result.changes.iter().map(|c| c.change_type).collect()
    }

    #[test]
    fn identical_sequences_are_unchanged() {
        let seq = units(&["alpha", "beta", "gamma"]);
        let result = SequenceAligner::align(&seq, &seq, None).unwrap();

        assert_eq!(types(&result), vec![ChangeType::Unchanged; 3]);
        assert_eq!(result.similarity_percentage, 100);
        assert_eq!(result.confidence_score, Some(1.0));
    }

    #[test]
    fn empty_inputs() {
        let empty: Vec<TextUnit> = Vec::new();
        let result = SequenceAligner::align(&empty, &empty, None).unwrap();
        assert!(result.changes.is_empty());
        assert_eq!(result.similarity_percentage, 100);

        let result = SequenceAligner::align(&empty, &units(&["x", "y"]), None).unwrap();
        assert_eq!(types(&result), vec![ChangeType::Added, ChangeType::Added]);

        let result = SequenceAligner::align(&units(&["x"]), &empty, None).unwrap();
        assert_eq!(types(&result), vec![ChangeType::Removed]);
    }

    #[test]
    fn insertion_resyncs_without_modifications() {
        let a = units(&["a", "b", "c"]);
        let b = units(&["a", "X", "b", "c"]);
        let result = SequenceAligner::align(&a, &b, None).unwrap();

        assert_eq!(
            types(&result),
            vec![
                ChangeType::Unchanged,
                ChangeType::Added,
                ChangeType::Unchanged,
                ChangeType::Unchanged
            ]
        );
        assert_eq!(result.changes[1].new_text(), Some("X"));
    }

    #[test]
    fn deletion_resyncs_through_a_side() {
        let a = units(&["first line", "gone entirely", "second line", "third line"]);
        let b = units(&["first line", "second line", "third line"]);
        let result = SequenceAligner::align(&a, &b, None).unwrap();

        assert_eq!(
            types(&result),
            vec![
                ChangeType::Unchanged,
                ChangeType::Removed,
                ChangeType::Unchanged,
                ChangeType::Unchanged
            ]
        );
        assert_eq!(result.changes[1].old_text(), Some("gone entirely"));
    }

    #[test]
    fn small_edit_is_modified_with_confidence() {
        let a = units(&["The quick brown fox"]);
        let b = units(&["The quick brown cat"]);
        let result = SequenceAligner::align(&a, &b, None).unwrap();

        let record = &result.changes[0];
        assert_eq!(record.change_type, ChangeType::Modified);
        let expected = 16.0 / 19.0;
        assert!((record.confidence.unwrap() - expected).abs() < 1e-9);
        assert_eq!(record.similarity_percentage, Some(84));
    }

    #[test]
    fn unmatched_on_both_sides_defaults_to_removed() {
        let a = units(&["apple"]);
        let b = units(&["zebra"]);
        let result = SequenceAligner::align(&a, &b, None).unwrap();

        assert_eq!(types(&result), vec![ChangeType::Removed, ChangeType::Added]);
    }

    #[test]
    fn compare_best_side_can_emit_added_first() {
        // A[0] scores ~0.72 against B[1] but nothing against B[0], so B[0]
        // is the likelier orphan even though no match reaches the threshold.
        let a = units(&["quarterly revenue report"]);
        let b = units(&["zzz", "quarterly revenue summary"]);

        let settings = AlignerSettings::new().with_orphan_policy(OrphanPolicy::CompareBestSide);
        let result = SequenceAligner::align(&a, &b, Some(&settings)).unwrap();
        assert_eq!(
            types(&result),
            vec![ChangeType::Added, ChangeType::Removed, ChangeType::Added]
        );

        let result = SequenceAligner::align(&a, &b, None).unwrap();
        assert_eq!(
            types(&result),
            vec![ChangeType::Removed, ChangeType::Added, ChangeType::Added]
        );
    }

    #[test]
    fn metadata_follows_emitted_unit() {
        let a = vec![TextUnit::with_metadata("kept", UnitMetadata::page(1))];
        let b = vec![TextUnit::with_metadata("kept", UnitMetadata::page(2))];

        let result = SequenceAligner::align(&a, &b, None).unwrap();
        assert_eq!(result.changes[0].metadata, Some(UnitMetadata::page(2)));

        let settings = AlignerSettings::new().with_metadata(false);
        let result = SequenceAligner::align(&a, &b, Some(&settings)).unwrap();
        assert!(result.changes[0].metadata.is_none());
    }

    #[test]
    fn invalid_settings_fail_before_scan() {
        let settings = AlignerSettings::new().with_look_ahead(0);
        let seq = units(&["a"]);
        assert!(SequenceAligner::align(&seq, &seq, Some(&settings)).is_err());
    }

    #[test]
    fn align_values_rejects_malformed_units() {
        let a = serde_json::json!(["ok", { "text": 5 }]);
        let b = serde_json::json!(["ok"]);
        assert!(SequenceAligner::align_values(&a, &b, None).is_err());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn trace_records_resync_steps() {
        let a = units(&["a", "b", "c"]);
        let b = units(&["a", "X", "b", "c"]);
        let (result, trace) = SequenceAligner::align_traced(&a, &b, None).unwrap();

        assert_eq!(result.stats.added, 1);
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(trace.resync_count(), 1);
        assert_eq!(
            trace.steps[1].action,
            TraceAction::ResyncB { matched: 2, skipped: 1 }
        );
    }
}
