use thiserror::Error;

use crate::upload::UploadError;

#[derive(Error, Debug)]
pub enum LineupError {
    #[error("Index {index} out of range for roster of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Roster has no slots")]
    EmptyRoster,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Localization error: {0}")]
    Localization(String),
}

impl LineupError {
    /// Precondition violations that indicate a caller or catalog bug rather
    /// than bad user input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            LineupError::IndexOutOfRange { .. } | LineupError::InvalidTemplate(_)
        )
    }
}

impl From<validator::ValidationErrors> for LineupError {
    fn from(err: validator::ValidationErrors) -> Self {
        LineupError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LineupError>;
