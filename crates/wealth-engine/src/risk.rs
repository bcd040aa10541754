//! Category Risk Table
//!
//! Baseline 0-100 risk metrics per asset category, used as scoring inputs.
//!
//! ```text
//! ┌──────────────┬────────────┬───────────┬────────────┐
//! │ Category     │ Volatility │ Liquidity │ Resilience │
//! ├──────────────┼────────────┼───────────┼────────────┤
//! │ Stocks       │     60     │    90     │     70     │
//! │ Crypto       │     10     │    80     │     30     │
//! │ Real Estate  │     90     │    20     │     85     │
//! │ Cash         │     98     │   100     │     95     │
//! │ Other        │     50     │    50     │     50     │
//! └──────────────┴────────────┴───────────┴────────────┘
//! ```
//!
//! Polarity: every metric reads "higher is healthier". The `volatility`
//! column is therefore a *stability* score despite its name (Cash 98,
//! Crypto 10). Scoring and display both consume it with that polarity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::AssetCategory;

/// Baseline metrics for one category, each 0-100
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Stability score: high means *low* price volatility
    pub volatility: u8,
    pub liquidity: u8,
    pub resilience: u8,
}

impl RiskMetrics {
    pub const fn new(volatility: u8, liquidity: u8, resilience: u8) -> Self {
        Self {
            volatility,
            liquidity,
            resilience,
        }
    }

    /// Mid-range metrics used by the compatibility fallback
    pub const MID_RANGE: Self = Self::new(50, 50, 50);
}

/// Lookup from category to baseline metrics
#[derive(Clone, Debug)]
pub struct CategoryRiskTable {
    metrics: HashMap<AssetCategory, RiskMetrics>,
    fallback: Option<RiskMetrics>,
}

impl Default for CategoryRiskTable {
    fn default() -> Self {
        Self::baseline()
    }
}

impl CategoryRiskTable {
    /// The standard table covering every category, strict lookups
    pub fn baseline() -> Self {
        let metrics = AssetCategory::ALL
            .into_iter()
            .map(|category| (category, baseline_metrics(category)))
            .collect();
        Self {
            metrics,
            fallback: None,
        }
    }

    /// A table with no entries, for building custom tables
    pub fn empty() -> Self {
        Self {
            metrics: HashMap::new(),
            fallback: None,
        }
    }

    /// Override (or add) the metrics of one category
    pub fn with_metrics(mut self, category: AssetCategory, metrics: RiskMetrics) -> Self {
        self.metrics.insert(category, metrics);
        self
    }

    /// Remove a category so that lookups for it fail
    pub fn without(mut self, category: AssetCategory) -> Self {
        self.metrics.remove(&category);
        self
    }

    /// Compatibility mode: missing categories resolve to `fallback`
    /// instead of failing with `UnknownCategory`.
    pub fn with_fallback(mut self, fallback: RiskMetrics) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn lookup(&self, category: AssetCategory) -> Result<RiskMetrics> {
        self.metrics
            .get(&category)
            .copied()
            .or(self.fallback)
            .ok_or_else(|| EngineError::UnknownCategory(category.to_string()))
    }

    /// Lookup by raw category label, as stored by external collaborators
    pub fn lookup_label(&self, label: &str) -> Result<RiskMetrics> {
        match label.parse::<AssetCategory>() {
            Ok(category) => self.lookup(category),
            Err(err) => self.fallback.ok_or(err),
        }
    }
}

const fn baseline_metrics(category: AssetCategory) -> RiskMetrics {
    match category {
        AssetCategory::Stocks => RiskMetrics::new(60, 90, 70),
        AssetCategory::Crypto => RiskMetrics::new(10, 80, 30),
        AssetCategory::RealEstate => RiskMetrics::new(90, 20, 85),
        AssetCategory::Cash => RiskMetrics::new(98, 100, 95),
        AssetCategory::Other => RiskMetrics::MID_RANGE,
    }
}
