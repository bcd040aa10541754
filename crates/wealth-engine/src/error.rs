//! Error Types for the Wealth Engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown asset category: {0}")]
    UnknownCategory(String),

    #[error("Invalid health weights: {0}")]
    InvalidWeights(String),

    #[error("Price source unavailable: {0}")]
    PriceSourceUnavailable(String),

    #[error("Malformed price response: {0}")]
    MalformedResponse(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("A price sync is already in progress")]
    SyncInProgress,

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Check if the failed operation may succeed on retry
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PriceSourceUnavailable(_) | Self::Network(_) | Self::Storage(_) | Self::SyncInProgress
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownCategory(category) => format!("'{category}' is not a supported asset category."),
            Self::InvalidWeights(_) => "Health weights must be non-negative numbers.".into(),
            Self::PriceSourceUnavailable(_) | Self::Network(_) => {
                "Market data is currently unavailable. Prices were simulated.".into()
            }
            Self::AssetNotFound(id) => format!("Asset '{id}' does not exist."),
            Self::InvalidAsset(msg) => format!("Invalid asset: {msg}"),
            Self::InvalidInput(msg) => format!("Invalid input: {msg}"),
            Self::NotFound(what) => format!("'{what}' does not exist."),
            Self::SyncInProgress => "A market sync is already running. Please wait.".into(),
            Self::CapacityExceeded(_) => "The server is at capacity. Please try again later.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EngineError::SyncInProgress.is_retryable());
        assert!(EngineError::PriceSourceUnavailable("timeout".into()).is_retryable());
        assert!(!EngineError::UnknownCategory("Bonds".into()).is_retryable());
    }

    #[test]
    fn test_user_message_names_category() {
        let err = EngineError::UnknownCategory("Bonds".into());
        assert!(err.user_message().contains("Bonds"));
    }
}
