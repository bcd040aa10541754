//! Price Sources
//!
//! Abstractions and implementations for market data providers.

mod coingecko;
mod llm;
mod mock;

pub use coingecko::{CoinGeckoConfig, CoinGeckoPriceSource};
pub use llm::{CompletionProvider, LlmPriceSource, decode_quotes};
pub use mock::StaticPriceSource;

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{AssetCategory, Quote};

/// Price source trait (Strategy pattern)
///
/// Implement this for each provider: a market API, a language model, a fixed table.
/// Returned keys are the provider's own; callers resolve them with
/// [`KeyMatcher`](crate::reconcile::KeyMatcher).
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Source name, for logs and reports
    fn name(&self) -> &str;

    /// Whether quotes from this source are meaningful for a category
    fn supports(&self, category: AssetCategory) -> bool;

    /// Fetch quotes for the requested keys in one call
    async fn fetch_quotes(&self, keys: &[String]) -> Result<HashMap<String, Quote>>;

    /// Check if the source is reachable
    async fn health_check(&self) -> bool {
        true
    }
}

/// A source that never has data; every market asset falls back to drift
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflinePriceSource;

#[async_trait]
impl PriceSource for OfflinePriceSource {
    fn name(&self) -> &str {
        "offline"
    }

    fn supports(&self, _category: AssetCategory) -> bool {
        false
    }

    async fn fetch_quotes(&self, _keys: &[String]) -> Result<HashMap<String, Quote>> {
        Ok(HashMap::new())
    }
}

/// Read a decimal from a JSON number or numeric string
pub(crate) fn json_decimal(value: &serde_json::Value) -> Option<Decimal> {
    let raw = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}
