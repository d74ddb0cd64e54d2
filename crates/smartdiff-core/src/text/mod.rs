//! Line-level diff for plain text.

mod line_diff;

pub use line_diff::{diff_lines, LineDiffResult, LineDiffSettings, LineRecord, LineStatus};
