use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FarmAnalyticsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid area: {0} ha (area must be greater than zero)")]
    InvalidArea(Decimal),

    #[error("Invalid percentage: {field} = {value} (must be within 0–100)")]
    InvalidPercentage { field: String, value: Decimal },

    #[error("Division undefined in {context}")]
    DivisionUndefined { context: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FarmAnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        FarmAnalyticsError::SerializationError(e.to_string())
    }
}
