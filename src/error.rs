use thiserror::Error;

/// Every failure the dashboard core can report.
///
/// Variants stay distinct so the UI can tell "dataset missing column X"
/// apart from "please enter review text".
#[derive(Error, Debug)]
pub enum DashboardError {
    // Dataset
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    // Classification
    #[error("Review text is empty")]
    EmptyInput,

    #[error("Invalid candidate labels: {0}")]
    InvalidLabels(String),

    #[error("Classification backend failed: {0}")]
    ExternalCapability(String),

    // Configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl From<ureq::Error> for DashboardError {
    fn from(value: ureq::Error) -> Self {
        DashboardError::ExternalCapability(value.to_string())
    }
}
