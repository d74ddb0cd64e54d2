use std::fmt;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag, TextDiff};

use crate::types::{ChangeType, DiffStats};
use crate::util::{normalize, SimilarityOptions};

/// Settings for [`diff_lines`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineDiffSettings {
    /// Collapse whitespace runs before matching lines.
    pub ignore_whitespace: bool,
    /// Lower-case lines before matching.
    pub ignore_case: bool,
    /// Pair adjacent removed/added runs into `modified` rows.
    pub pair_modified: bool,
}

impl LineDiffSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    pub fn with_pair_modified(mut self, pair: bool) -> Self {
        self.pair_modified = pair;
        self
    }

    fn similarity_options(&self) -> SimilarityOptions {
        SimilarityOptions {
            ignore_case: self.ignore_case,
            ignore_whitespace: self.ignore_whitespace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Added,
    Removed,
    Unchanged,
    /// Only produced with `pair_modified`
    Modified,
}

impl LineStatus {
    pub fn change_type(self) -> ChangeType {
        match self {
            LineStatus::Added => ChangeType::Added,
            LineStatus::Removed => ChangeType::Removed,
            LineStatus::Unchanged => ChangeType::Unchanged,
            LineStatus::Modified => ChangeType::Modified,
        }
    }

    fn marker(self) -> char {
        match self {
            LineStatus::Added => '+',
            LineStatus::Removed => '-',
            LineStatus::Unchanged => ' ',
            LineStatus::Modified => '~',
        }
    }
}

/// One output row of the line diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    /// 1-based position in the linearized output
    pub line_number: usize,
    pub status: LineStatus,
    /// The newer line, or the older one for `removed` rows
    pub content: String,
    /// The older line when it differs from `content`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    /// 1-based line number in the older text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line: Option<usize>,
    /// 1-based line number in the newer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line: Option<usize>,
}

impl fmt::Display for LineRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.marker(), self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDiffResult {
    pub records: Vec<LineRecord>,
    pub stats: DiffStats,
    pub similarity_percentage: u8,
}

impl LineDiffResult {
    fn from_records(records: Vec<LineRecord>) -> Self {
        let mut stats = DiffStats::default();
        for record in &records {
            stats.record(record.status.change_type());
        }

        Self {
            similarity_percentage: stats.similarity_percentage(),
            records,
            stats,
        }
    }

    /// Lines of the older text, rebuilt from every non-added row.
    pub fn old_lines(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.status != LineStatus::Added)
            .map(|r| r.old_content.as_deref().unwrap_or(&r.content))
            .collect()
    }

    /// Lines of the newer text, rebuilt from every non-removed row.
    pub fn new_lines(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.status != LineStatus::Removed)
            .map(|r| r.content.as_str())
            .collect()
    }

    pub fn has_differences(&self) -> bool {
        self.stats.changed() > 0
    }

    /// Render as `+`/`-`/`~` prefixed lines.
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Line-level diff of two texts, using Myers' LCS algorithm.
///
/// Normalization only affects which lines match; records always carry the
/// original text.
pub fn diff_lines(text_a: &str, text_b: &str, settings: Option<&LineDiffSettings>) -> LineDiffResult {
    let settings = settings.copied().unwrap_or_default();
    let options = settings.similarity_options();

    let lines_a: Vec<&str> = text_a.lines().collect();
    let lines_b: Vec<&str> = text_b.lines().collect();
    let keys_a: Vec<_> = lines_a.iter().map(|l| normalize(l, &options)).collect();
    let keys_b: Vec<_> = lines_b.iter().map(|l| normalize(l, &options)).collect();

    let refs_a: Vec<&str> = keys_a.iter().map(|k| k.as_ref()).collect();
    let refs_b: Vec<&str> = keys_b.iter().map(|k| k.as_ref()).collect();
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&refs_a, &refs_b);

    let mut out = Rows::default();
    for op in diff.ops() {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for (ia, ib) in old.zip(new) {
                    out.unchanged(ia, lines_a[ia], ib, lines_b[ib]);
                }
            }
            DiffTag::Delete => {
                for ia in old {
                    out.removed(ia, lines_a[ia]);
                }
            }
            DiffTag::Insert => {
                for ib in new {
                    out.added(ib, lines_b[ib]);
                }
            }
            DiffTag::Replace => {
                let paired = if settings.pair_modified {
                    old.len().min(new.len())
                } else {
                    0
                };
                for k in 0..paired {
                    let (ia, ib) = (old.start + k, new.start + k);
                    out.modified(ia, lines_a[ia], ib, lines_b[ib]);
                }
                for ia in old.start + paired..old.end {
                    out.removed(ia, lines_a[ia]);
                }
                for ib in new.start + paired..new.end {
                    out.added(ib, lines_b[ib]);
                }
            }
        }
    }

    LineDiffResult::from_records(out.records)
}

#[derive(Default)]
struct Rows {
    records: Vec<LineRecord>,
}

impl Rows {
    fn push(
        &mut self,
        status: LineStatus,
        content: &str,
        old_content: Option<&str>,
        old_line: Option<usize>,
        new_line: Option<usize>,
    ) {
        self.records.push(LineRecord {
            line_number: self.records.len() + 1,
            status,
            content: content.to_string(),
            old_content: old_content.map(str::to_string),
            old_line: old_line.map(|n| n + 1),
            new_line: new_line.map(|n| n + 1),
        });
    }

    fn unchanged(&mut self, ia: usize, old: &str, ib: usize, new: &str) {
        let old_content = (old != new).then_some(old);
        self.push(LineStatus::Unchanged, new, old_content, Some(ia), Some(ib));
    }

    fn modified(&mut self, ia: usize, old: &str, ib: usize, new: &str) {
        self.push(LineStatus::Modified, new, Some(old), Some(ia), Some(ib));
    }

    fn removed(&mut self, ia: usize, old: &str) {
        self.push(LineStatus::Removed, old, None, Some(ia), None);
    }

    fn added(&mut self, ib: usize, new: &str) {
        self.push(LineStatus::Added, new, None, None, Some(ib));
    }
}
