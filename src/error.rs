//! Error types for the collaborator layer (loading scenarios, storing reports)
//!
//! The numeric engine itself never fails: malformed shapes degrade to empty
//! sequences and undefined metrics recover to zero. Only I/O and malformed
//! collaborator data surface through [`ViabilityError`].

use thiserror::Error;

/// Failures raised while fetching inputs or persisting results
#[derive(Debug, Error)]
pub enum ViabilityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ViabilityError>;
