//! Error Types for Completion Providers

use thiserror::Error;
use wealth_engine::EngineError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Completion timed out after {0}s")]
    Timeout(u64),

    #[error("Empty completion")]
    EmptyCompletion,
}

impl RuntimeError {
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Timeout(_))
    }
}

impl From<RuntimeError> for EngineError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::EmptyCompletion => Self::MalformedResponse(err.to_string()),
            other => Self::PriceSourceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_conversion() {
        let err: EngineError = RuntimeError::Timeout(30).into();
        assert!(matches!(err, EngineError::PriceSourceUnavailable(_)));
        assert!(err.is_retryable());

        let err: EngineError = RuntimeError::EmptyCompletion.into();
        assert!(matches!(err, EngineError::MalformedResponse(_)));
    }
}
