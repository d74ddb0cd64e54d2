use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartDiffError {
    #[error("Invalid input at unit {index}: {message}")]
    InvalidInputShape { index: usize, message: String },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("Unsupported document kind: {kind}")]
    UnsupportedDocumentKind { kind: String },

    #[error("Comparison failed: {0}")]
    ComputationFailure(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SmartDiffError {
    pub(crate) fn invalid_input(index: usize, message: impl Into<String>) -> Self {
        SmartDiffError::InvalidInputShape {
            index,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmartDiffError>;
