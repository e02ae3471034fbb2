use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PropCalcError {
    fn from(e: serde_json::Error) -> Self {
        PropCalcError::SerializationError(e.to_string())
    }
}
