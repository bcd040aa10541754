//! Price Reconciliation
//!
//! Turns a list of assets into price updates through an ordered rule chain;
//! the first rule that applies wins:
//!
//! 1. **Fixed value**: Cash, or a name matching a manual-value pattern.
//!    The price is left alone and the daily change is zero.
//! 2. **Yield accrual**: a name matching a yield pattern accrues one day
//!    of its APY.
//! 3. **Market**: a market category, supported by the source, whose
//!    normalized name resolves to a returned quote. The quote is used verbatim.
//! 4. **Simulated drift**: a small random move scaled per category.
//!
//! At most one source call is made per pass, for the keys that can reach
//! rule 3. A failing source is logged and treated as an empty response. The
//! reconciler only computes updates; persisting them is the caller's job.

mod matcher;

pub use matcher::{KeyMatcher, candidate_ids, normalize_key};

use std::collections::HashMap;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::{Asset, AssetCategory, PriceUpdate, Quote, UpdateSource};
use crate::pricing::PriceSource;

/// Random-walk parameters for assets without market data
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriftConfig {
    /// Subtracted from the uniform draw; below 0.5 biases moves upward
    pub bias: f64,

    /// Scale for Crypto and Real Estate
    pub high_volatility: f64,

    /// Scale for Stocks and everything else
    pub low_volatility: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            bias: 0.49,
            high_volatility: 0.05,
            low_volatility: 0.01,
        }
    }
}

impl DriftConfig {
    pub const fn scale(&self, category: AssetCategory) -> f64 {
        match category {
            AssetCategory::Crypto | AssetCategory::RealEstate => self.high_volatility,
            AssetCategory::Stocks | AssetCategory::Cash | AssetCategory::Other => self.low_volatility,
        }
    }
}

/// Reconciler configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconcilerConfig {
    /// Name fragments of manually valued holdings (bank accounts, passbooks)
    pub manual_value_patterns: Vec<String>,

    /// Name fragments of holdings that accrue their APY daily
    pub yield_patterns: Vec<String>,

    /// Categories eligible for market quotes
    pub market_categories: Vec<AssetCategory>,

    pub drift: DriftConfig,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            manual_value_patterns: ["livret", "compte", "bank account", "savings account"]
                .map(String::from)
                .to_vec(),
            yield_patterns: ["bricks", "la premiere brique", "homunity"].map(String::from).to_vec(),
            market_categories: vec![AssetCategory::Crypto, AssetCategory::Stocks],
            drift: DriftConfig::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Defaults, with pattern lists overridable by comma-separated
    /// `RECONCILE_MANUAL_PATTERNS`, `RECONCILE_YIELD_PATTERNS` and
    /// `RECONCILE_MARKET_CATEGORIES`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(patterns) = env_list("RECONCILE_MANUAL_PATTERNS") {
            config.manual_value_patterns = patterns;
        }
        if let Some(patterns) = env_list("RECONCILE_YIELD_PATTERNS") {
            config.yield_patterns = patterns;
        }
        if let Some(names) = env_list("RECONCILE_MARKET_CATEGORIES") {
            config.market_categories = names
                .iter()
                .filter_map(|n| match n.parse() {
                    Ok(category) => Some(category),
                    Err(e) => {
                        warn!(error = %e, "Ignoring market category");
                        None
                    }
                })
                .collect();
        }

        config
    }

    fn is_manual_value(&self, asset: &Asset) -> bool {
        asset.category == AssetCategory::Cash || matches_any(&asset.name, &self.manual_value_patterns)
    }

    fn is_yield_bearing(&self, asset: &Asset) -> bool {
        matches_any(&asset.name, &self.yield_patterns)
    }
}

fn env_list(var: &str) -> Option<Vec<String>> {
    let raw = std::env::var(var).ok()?;
    Some(
        raw.split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn matches_any(name: &str, patterns: &[String]) -> bool {
    let name = name.to_lowercase();
    patterns.iter().any(|p| !p.is_empty() && name.contains(&p.to_lowercase()))
}

/// Computes price updates for a portfolio
#[derive(Clone, Debug, Default)]
pub struct PriceReconciler {
    config: ReconcilerConfig,
}

impl PriceReconciler {
    pub const fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile with an entropy-seeded generator
    pub async fn reconcile(&self, assets: &[Asset], source: &dyn PriceSource) -> Vec<PriceUpdate> {
        let quotes = self.fetch(assets, source).await;
        let mut rng = StdRng::from_entropy();
        self.resolve(assets, &quotes, source, &mut rng)
    }

    /// Reconcile with a caller-supplied generator
    pub async fn reconcile_with_rng<R: Rng + Send>(
        &self,
        assets: &[Asset],
        source: &dyn PriceSource,
        rng: &mut R,
    ) -> Vec<PriceUpdate> {
        let quotes = self.fetch(assets, source).await;
        self.resolve(assets, &quotes, source, rng)
    }

    /// Keys worth requesting: market-eligible assets not caught by rules 1-2
    pub fn market_keys(&self, assets: &[Asset], source: &dyn PriceSource) -> Vec<String> {
        let mut keys: Vec<String> = assets
            .iter()
            .filter(|a| self.reaches_market(a, source))
            .map(|a| normalize_key(&a.name))
            .filter(|k| !k.is_empty())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    async fn fetch(&self, assets: &[Asset], source: &dyn PriceSource) -> HashMap<String, Quote> {
        let keys = self.market_keys(assets, source);
        if keys.is_empty() {
            debug!(source = source.name(), "No market-eligible assets, skipping fetch");
            return HashMap::new();
        }

        match source.fetch_quotes(&keys).await {
            Ok(quotes) => {
                debug!(source = source.name(), requested = keys.len(), received = quotes.len(), "Quotes fetched");
                quotes
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Price source failed, falling back to simulation");
                HashMap::new()
            }
        }
    }

    /// Apply the rule chain against already-fetched quotes
    pub fn resolve<R: Rng>(
        &self,
        assets: &[Asset],
        quotes: &HashMap<String, Quote>,
        source: &dyn PriceSource,
        rng: &mut R,
    ) -> Vec<PriceUpdate> {
        let usable: HashMap<&str, Quote> = quotes
            .iter()
            .filter(|(key, quote)| {
                let ok = quote.unit_price > Decimal::ZERO;
                if !ok {
                    warn!(key = %key, "Ignoring non-positive quote");
                }
                ok
            })
            .map(|(key, quote)| (key.as_str(), *quote))
            .collect();
        let matcher = KeyMatcher::new(usable.keys().copied());

        let updates: Vec<PriceUpdate> = assets
            .iter()
            .map(|asset| self.resolve_one(asset, &matcher, &usable, source, rng))
            .collect();

        let market = updates.iter().filter(|u| u.source == UpdateSource::Market).count();
        info!(
            source = source.name(),
            assets = assets.len(),
            market,
            simulated = updates.iter().filter(|u| u.source == UpdateSource::Simulated).count(),
            "Reconciliation complete"
        );

        updates
    }

    fn resolve_one<R: Rng>(
        &self,
        asset: &Asset,
        matcher: &KeyMatcher,
        quotes: &HashMap<&str, Quote>,
        source: &dyn PriceSource,
        rng: &mut R,
    ) -> PriceUpdate {
        let price = asset.effective_unit_price();

        if self.config.is_manual_value(asset) {
            debug!(asset = %asset.name, "Fixed value");
            return update(asset, price, Decimal::ZERO, UpdateSource::Fixed);
        }

        if self.config.is_yield_bearing(asset) {
            let apy = asset.yield_apy.unwrap_or_default();
            let new_price = price * (Decimal::ONE + apy / dec!(100) / dec!(365));
            let change = new_price
                .checked_div(price)
                .map_or(Decimal::ZERO, |ratio| (ratio - Decimal::ONE) * dec!(100));
            debug!(asset = %asset.name, %apy, "Yield accrual");
            return update(asset, new_price, change, UpdateSource::YieldAccrual);
        }

        if self.reaches_market(asset, source) {
            let key = normalize_key(&asset.name);
            if let Some(quote) = matcher.find(&key).and_then(|k| quotes.get(k)) {
                debug!(asset = %asset.name, price = %quote.unit_price, "Market quote");
                return update(asset, quote.unit_price, quote.change_24h, UpdateSource::Market);
            }
        }

        let drift = &self.config.drift;
        let delta = (rng.gen_range(0.0..1.0) - drift.bias) * drift.scale(asset.category);
        let delta = Decimal::from_f64(delta).unwrap_or_default().round_dp(10);
        debug!(asset = %asset.name, %delta, "Simulated drift");

        update(asset, price * (Decimal::ONE + delta), delta * dec!(100), UpdateSource::Simulated)
    }

    fn reaches_market(&self, asset: &Asset, source: &dyn PriceSource) -> bool {
        !self.config.is_manual_value(asset)
            && !self.config.is_yield_bearing(asset)
            && self.config.market_categories.contains(&asset.category)
            && source.supports(asset.category)
    }
}

fn update(asset: &Asset, unit_price: Decimal, change_24h: Decimal, source: UpdateSource) -> PriceUpdate {
    PriceUpdate {
        id: asset.id.clone(),
        unit_price,
        change_24h,
        source,
    }
}
