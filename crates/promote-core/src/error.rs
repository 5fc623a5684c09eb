use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromoteError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Reserved for a future strict mode (e.g. tier splits that do not sum
    /// to 100). Currently such inputs only produce envelope warnings.
    #[error("Arithmetic anomaly: {0}")]
    ArithmeticAnomaly(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<serde_json::Error> for PromoteError {
    fn from(e: serde_json::Error) -> Self {
        PromoteError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for PromoteError {
    fn from(e: std::io::Error) -> Self {
        PromoteError::StorageError(e.to_string())
    }
}
