//! Generative-AI Price Source
//!
//! Asks a language model for quotes and treats the answer as untrusted input.
//! Only the outermost JSON object in the reply is considered, and each record
//! is validated on its own: an unrequested key, a missing or non-positive
//! `unitPrice`, or a non-numeric `change24h` drops that record only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use super::{PriceSource, json_decimal};
use crate::error::{EngineError, Result};
use crate::model::{AssetCategory, Quote};

/// Text completion backend (Ollama, hosted APIs, test doubles)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Complete a single prompt, returning the raw reply
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check that the backend answers
    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }
}

/// Price source that queries a completion provider
pub struct LlmPriceSource<P> {
    provider: P,
    currency: String,
    categories: Vec<AssetCategory>,
}

impl<P: CompletionProvider> LlmPriceSource<P> {
    /// Quotes in EUR for Crypto and Stocks
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            currency: "EUR".into(),
            categories: vec![AssetCategory::Crypto, AssetCategory::Stocks],
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_uppercase();
        self
    }

    pub fn with_categories(mut self, categories: impl Into<Vec<AssetCategory>>) -> Self {
        self.categories = categories.into();
        self
    }

    pub fn prompt(&self, keys: &[String]) -> String {
        format!(
            "You are a market data service. Give the latest known price in {currency} and the \
             24 hour change in percent for each of these assets: {keys}.\n\
             Reply with a single JSON object and nothing else. Use exactly the keys given, \
             each mapping to {{\"unitPrice\": number, \"change24h\": number}}.",
            currency = self.currency,
            keys = keys.join(", "),
        )
    }
}

#[async_trait]
impl<P: CompletionProvider> PriceSource for LlmPriceSource<P> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn supports(&self, category: AssetCategory) -> bool {
        self.categories.contains(&category)
    }

    async fn fetch_quotes(&self, keys: &[String]) -> Result<HashMap<String, Quote>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let reply = self.provider.complete(&self.prompt(keys)).await?;
        debug!(provider = self.provider.name(), chars = reply.len(), "Completion received");

        decode_quotes(&reply, keys)
    }

    async fn health_check(&self) -> bool {
        self.provider.health_check().await
    }
}

/// Extract and validate quotes from a model reply
pub fn decode_quotes(reply: &str, requested: &[String]) -> Result<HashMap<String, Quote>> {
    let object = outermost_object(reply)
        .ok_or_else(|| EngineError::MalformedResponse("no JSON object in reply".into()))?;

    let parsed: Value = serde_json::from_str(object)
        .map_err(|e| EngineError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let entries = parsed
        .as_object()
        .ok_or_else(|| EngineError::MalformedResponse("expected a JSON object".into()))?;

    let mut quotes = HashMap::new();
    for (key, record) in entries {
        if !requested.iter().any(|k| k == key) {
            warn!(key = %key, "Dropping unrequested key from completion");
            continue;
        }
        match decode_record(record) {
            Some(quote) => {
                quotes.insert(key.clone(), quote);
            }
            None => warn!(key = %key, record = %record, "Dropping invalid quote from completion"),
        }
    }

    Ok(quotes)
}

fn decode_record(record: &Value) -> Option<Quote> {
    let unit_price = record.get("unitPrice").and_then(json_decimal)?;
    if unit_price <= Decimal::ZERO {
        return None;
    }
    let change_24h = record.get("change24h").and_then(json_decimal)?;
    Some(Quote::new(unit_price, change_24h))
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Canned(&'static str);

    #[async_trait]
    impl CompletionProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_decode_wrapped_reply() {
        let reply = "Sure! Here you go:\n```json\n{\"bitcoin\": {\"unitPrice\": 89000, \"change24h\": \"-1.5\"}}\n```";
        let quotes = decode_quotes(reply, &keys(&["bitcoin"])).unwrap();

        assert_eq!(quotes["bitcoin"], Quote::new(dec!(89000), dec!(-1.5)));
    }

    #[test]
    fn test_decode_drops_invalid_records() {
        let reply = r#"{
            "bitcoin": {"unitPrice": -3, "change24h": 1},
            "ethereum": {"unitPrice": 3100, "change24h": "lots"},
            "solana": {"unitPrice": 180, "change24h": 2.5},
            "dogecoin": {"unitPrice": 0.3, "change24h": 1}
        }"#;
        let quotes = decode_quotes(reply, &keys(&["bitcoin", "ethereum", "solana"])).unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes["solana"].unit_price, dec!(180));
    }

    #[test]
    fn test_decode_without_object() {
        let result = decode_quotes("I cannot access live prices.", &keys(&["bitcoin"]));
        assert!(matches!(result, Err(EngineError::MalformedResponse(_))));

        let result = decode_quotes("{ not json }", &keys(&["bitcoin"]));
        assert!(matches!(result, Err(EngineError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_llm_source_round_trip() {
        let source = LlmPriceSource::new(Canned(r#"{"bitcoin": {"unitPrice": 90000, "change24h": 0.4}}"#));
        let quotes = source.fetch_quotes(&keys(&["bitcoin"])).await.unwrap();

        assert_eq!(source.name(), "canned");
        assert_eq!(quotes["bitcoin"].change_24h, dec!(0.4));
    }

    #[test]
    fn test_prompt_lists_keys() {
        let source = LlmPriceSource::new(Canned("{}")).with_currency("usd");
        let prompt = source.prompt(&keys(&["bitcoin", "apple"]));

        assert!(prompt.contains("bitcoin, apple"));
        assert!(prompt.contains("USD"));
    }

    struct Offline;

    #[async_trait]
    impl CompletionProvider for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(EngineError::PriceSourceUnavailable("daemon down".into()))
        }

        async fn health_check(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_health_check_follows_provider() {
        assert!(LlmPriceSource::new(Canned("{}")).health_check().await);
        assert!(!LlmPriceSource::new(Offline).health_check().await);
        assert!(!LlmPriceSource::new(Arc::new(Offline)).health_check().await);
    }
}
