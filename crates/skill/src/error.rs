//! Skill service error types.

use std::path::PathBuf;

/// Errors that abort a whole skill or forecast request.
///
/// Per-model problems never surface here; they are recorded as a
/// [`ModelOutcome`](crate::ModelOutcome) and the request carries on.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    /// The observation reference does not exist.
    #[error("observation reference not found: {}", path.display())]
    MissingReference {
        /// Where the reference was expected.
        path: PathBuf,
    },

    /// The observation reference exists but could not be read.
    #[error("cannot read observation reference: {reason}")]
    Reference { reason: String },

    /// The data catalog could not be listed.
    #[error("cannot list datasets: {reason}")]
    Catalog { reason: String },

    /// The caller's coordinates or month are out of range.
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// One or more configuration checks failed.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for SkillError {
    fn from(e: serde_json::Error) -> Self {
        SkillError::Serialization {
            reason: e.to_string(),
        }
    }
}
