// Error types for file intake and chart selection

use thiserror::Error;

/// Client-side rejection of a file before anything is transmitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please upload an Excel (.xlsx) or CSV (.csv) file.")]
pub struct ValidationError {
    pub file_name: String,
}

/// Why a submission produced no dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("No file selected")]
    NoFileSelected,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The parser answered with an `error` field
    #[error("{0}")]
    Rejected(String),

    /// The exchange with the parser failed
    #[error("{0}")]
    Transport(String),
}

/// Unknown chart kind name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown chart type '{0}' (expected bar, line or pie)")]
pub struct ParseChartKindError(pub String);
