pub mod align;
pub mod comparer;
pub mod error;
pub mod json;
pub mod text;
pub mod types;
pub mod util;
pub mod xml;

pub use error::{Result, SmartDiffError};

pub use align::{
    AlignTrace, AlignTraceStep, AlignerSettings, AlignmentResult, LogCallback, OrphanPolicy,
    SequenceAligner, TraceAction,
};
pub use comparer::{ComparisonOptions, ComparisonProgress, ComparisonReport, DocumentComparer, DocumentKind};
pub use json::{diff_json, JsonComparer, JsonDiffResult};
pub use text::{diff_lines, LineDiffResult, LineDiffSettings, LineRecord, LineStatus};
pub use types::{
    text_units_from_lines, text_units_from_paragraphs, ChangePosition, ChangeRecord, ChangeType,
    DiffStats, TextUnit, TreeDiffSummary, UnitMetadata,
};
pub use util::{classify, similarity, ContentType, SimilarityOptions};
pub use xml::{diff_xml, XmlComparer, XmlDiffResult, XmlElement};
