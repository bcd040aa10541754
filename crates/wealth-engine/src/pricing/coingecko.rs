//! CoinGecko Price Source
//!
//! Spot prices from the public `/simple/price` endpoint.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{PriceSource, json_decimal};
use crate::error::{EngineError, Result};
use crate::model::{AssetCategory, Quote};
use crate::reconcile::candidate_ids;

/// CoinGecko client configuration
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    /// API base URL
    pub base_url: String,

    /// Quote currency, lower-case ISO code
    pub vs_currency: String,

    /// Optional demo API key, sent as `x-cg-demo-api-key`
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".into(),
            vs_currency: "eur".into(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl CoinGeckoConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("COINGECKO_BASE_URL").unwrap_or(defaults.base_url);
        let vs_currency = std::env::var("PRICE_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or(defaults.vs_currency);
        let api_key = std::env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty());
        let timeout_secs = std::env::var("COINGECKO_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            vs_currency,
            api_key,
            timeout_secs,
        }
    }
}

/// Market prices for crypto assets
pub struct CoinGeckoPriceSource {
    client: reqwest::Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoPriceSource {
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(CoinGeckoConfig::from_env())
    }

    pub const fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPriceSource {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn supports(&self, category: AssetCategory) -> bool {
        category == AssetCategory::Crypto
    }

    async fn fetch_quotes(&self, keys: &[String]) -> Result<HashMap<String, Quote>> {
        let ids: BTreeSet<String> = keys.iter().flat_map(|k| candidate_ids(k)).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = ids.into_iter().collect::<Vec<_>>().join(",");

        debug!(ids = %ids, "Requesting CoinGecko prices");

        let url = format!("{}/simple/price", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.get(url).query(&[
            ("ids", ids.as_str()),
            ("vs_currencies", self.config.vs_currency.as_str()),
            ("include_24hr_change", "true"),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::PriceSourceUnavailable(format!("CoinGecko returned {status}")));
        }

        let body: Value = response.json().await?;
        parse_simple_price(&body, &self.config.vs_currency)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/ping", self.config.base_url.trim_end_matches('/'));
        self.client
            .get(url)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }
}

/// Decode `{ "<id>": { "<cur>": price, "<cur>_24h_change": pct } }`
fn parse_simple_price(body: &Value, currency: &str) -> Result<HashMap<String, Quote>> {
    let entries = body
        .as_object()
        .ok_or_else(|| EngineError::MalformedResponse("expected a JSON object".into()))?;

    let change_field = format!("{currency}_24h_change");
    let mut quotes = HashMap::with_capacity(entries.len());

    for (id, record) in entries {
        let Some(unit_price) = record.get(currency).and_then(json_decimal) else {
            warn!(id = %id, "CoinGecko record without a price");
            continue;
        };
        if unit_price <= rust_decimal::Decimal::ZERO {
            warn!(id = %id, %unit_price, "CoinGecko returned a non-positive price");
            continue;
        }
        let change_24h = record
            .get(&change_field)
            .and_then(json_decimal)
            .unwrap_or_default()
            .round_dp(4);

        quotes.insert(id.clone(), Quote::new(unit_price, change_24h));
    }

    Ok(quotes)
}
