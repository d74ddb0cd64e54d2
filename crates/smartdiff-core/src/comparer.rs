//! Dispatch by document kind, and page-by-page alignment with progress.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::align::{AlignerSettings, AlignmentResult, SequenceAligner};
use crate::error::{Result, SmartDiffError};
use crate::json::{JsonComparer, JsonDiffResult};
use crate::text::{diff_lines, LineDiffResult, LineDiffSettings};
use crate::types::{text_units_from_paragraphs, TextUnit};
use crate::xml::{XmlComparer, XmlDiffResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Json,
    Xml,
    /// Line diff
    Text,
    /// Paragraph units through the sequence aligner
    Paragraphs,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Json => "json",
            DocumentKind::Xml => "xml",
            DocumentKind::Text => "text",
            DocumentKind::Paragraphs => "paragraphs",
        }
    }

    /// Detect the kind from a file name's extension.
    pub fn from_extension(file_name: impl AsRef<Path>) -> Result<Self> {
        let ext = file_name
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" | "geojson" => Ok(DocumentKind::Json),
            "xml" | "xsd" | "xsl" | "svg" | "xhtml" => Ok(DocumentKind::Xml),
            "txt" | "text" | "log" | "csv" | "tsv" | "md" => Ok(DocumentKind::Text),
            _ => Err(SmartDiffError::UnsupportedDocumentKind { kind: ext }),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = SmartDiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentKind::Json),
            "xml" => Ok(DocumentKind::Xml),
            "text" | "lines" => Ok(DocumentKind::Text),
            "paragraphs" => Ok(DocumentKind::Paragraphs),
            other => Err(SmartDiffError::UnsupportedDocumentKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Settings for every differ [`DocumentComparer::compare`] may dispatch to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonOptions {
    pub aligner: AlignerSettings,
    pub lines: LineDiffSettings,
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aligner(mut self, aligner: AlignerSettings) -> Self {
        self.aligner = aligner;
        self
    }

    pub fn with_lines(mut self, lines: LineDiffSettings) -> Self {
        self.lines = lines;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "result")]
pub enum ComparisonReport {
    Json(JsonDiffResult),
    Xml(XmlDiffResult),
    Text(LineDiffResult),
    Paragraphs(AlignmentResult),
}

impl ComparisonReport {
    pub fn kind(&self) -> DocumentKind {
        match self {
            ComparisonReport::Json(_) => DocumentKind::Json,
            ComparisonReport::Xml(_) => DocumentKind::Xml,
            ComparisonReport::Text(_) => DocumentKind::Text,
            ComparisonReport::Paragraphs(_) => DocumentKind::Paragraphs,
        }
    }

    pub fn similarity_percentage(&self) -> u8 {
        match self {
            ComparisonReport::Json(r) => r.similarity_percentage,
            ComparisonReport::Xml(r) => r.summary.similarity_percentage,
            ComparisonReport::Text(r) => r.similarity_percentage,
            ComparisonReport::Paragraphs(r) => r.similarity_percentage,
        }
    }

    /// Number of records that are not `unchanged`.
    pub fn difference_count(&self) -> usize {
        match self {
            ComparisonReport::Json(r) => r.differences_found,
            ComparisonReport::Xml(r) => r.summary.differences_found,
            ComparisonReport::Text(r) => r.stats.changed(),
            ComparisonReport::Paragraphs(r) => r.stats.changed(),
        }
    }

    pub fn has_differences(&self) -> bool {
        self.difference_count() > 0
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Reported after each page chunk of [`DocumentComparer::align_paged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonProgress {
    pub completed: usize,
    pub total: usize,
    /// `None` for units without page metadata
    pub page: Option<u32>,
}

pub struct DocumentComparer;

impl DocumentComparer {
    /// Compare two raw documents of the given kind.
    pub fn compare(
        kind: DocumentKind,
        old_text: &str,
        new_text: &str,
        options: Option<&ComparisonOptions>,
    ) -> Result<ComparisonReport> {
        let options = options.cloned().unwrap_or_default();

        let report = match kind {
            DocumentKind::Json => ComparisonReport::Json(JsonComparer::compare_text(old_text, new_text)?),
            DocumentKind::Xml => ComparisonReport::Xml(XmlComparer::compare_text(old_text, new_text)?),
            DocumentKind::Text => {
                ComparisonReport::Text(diff_lines(old_text, new_text, Some(&options.lines)))
            }
            DocumentKind::Paragraphs => {
                let units_a = text_units_from_paragraphs(old_text);
                let units_b = text_units_from_paragraphs(new_text);
                let result = Self::align_paged(&units_a, &units_b, Some(&options.aligner), |_| {})?;
                ComparisonReport::Paragraphs(result)
            }
        };

        options
            .aligner
            .log(&format!("{} comparison: {}% similar", kind, report.similarity_percentage()));
        Ok(report)
    }

    /// Align page by page and merge the results.
    ///
    /// Units are grouped by their `page` metadata. A page present on one side
    /// only becomes a block of `added` or `removed` records.
    pub fn align_paged<F>(
        seq_a: &[TextUnit],
        seq_b: &[TextUnit],
        settings: Option<&AlignerSettings>,
        mut on_progress: F,
    ) -> Result<AlignmentResult>
    where
        F: FnMut(ComparisonProgress),
    {
        let settings = settings.cloned().unwrap_or_default();
        settings.validate()?;

        let pages: BTreeSet<Option<u32>> = seq_a.iter().chain(seq_b).map(TextUnit::page).collect();
        let total = pages.len();
        let mut chunks = Vec::with_capacity(total);

        for (completed, page) in pages.into_iter().enumerate() {
            let chunk_a = units_on_page(seq_a, page);
            let chunk_b = units_on_page(seq_b, page);
            settings.log(&format!(
                "page {:?}: {} vs {} units",
                page,
                chunk_a.len(),
                chunk_b.len()
            ));

            chunks.push(SequenceAligner::align(&chunk_a, &chunk_b, Some(&settings))?);
            on_progress(ComparisonProgress {
                completed: completed + 1,
                total,
                page,
            });
        }

        let merged = AlignmentResult::merge(chunks);
        merged.verify()?;
        Ok(merged)
    }
}

fn units_on_page(units: &[TextUnit], page: Option<u32>) -> Vec<TextUnit> {
    units.iter().filter(|u| u.page() == page).cloned().collect()
}
