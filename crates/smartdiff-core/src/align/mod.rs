//! Fuzzy alignment of two ordered sequences of text units.

mod aligner;
mod result;
mod settings;
mod trace;

pub use aligner::SequenceAligner;
pub use result::AlignmentResult;
pub use settings::{AlignerSettings, LogCallback, OrphanPolicy};
pub use trace::{AlignTrace, AlignTraceStep, TraceAction};
