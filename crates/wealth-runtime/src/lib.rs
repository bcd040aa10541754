//! # wealth-runtime
//!
//! Completion providers backing the generative-AI price source.
//!
//! ## Providers
//!
//! - **Ollama** (default): local inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wealth_engine::pricing::LlmPriceSource;
//! use wealth_runtime::OllamaCompletion;
//!
//! let source = LlmPriceSource::new(OllamaCompletion::from_env());
//! let updates = reconciler.reconcile(&assets, &source).await;
//! ```

pub mod error;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use error::{Result, RuntimeError};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaCompletion, OllamaConfig};

// Re-export the engine seam for convenience
pub use wealth_engine::CompletionProvider;
