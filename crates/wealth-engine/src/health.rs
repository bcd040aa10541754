//! Health Scorer
//!
//! Weighted synthesis of a category's baseline metrics into a 0-100 score.
//!
//! ```text
//! score = round((V·wV + L·wL + R·wR) / (wV + wL + wR))
//! ```
//!
//! Weights are normalized at scoring time, so `(1, 1, 2)` and `(0.25, 0.25, 0.5)`
//! produce the same score. All-zero weights fall back to an unweighted average.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Asset, AssetCategory, HealthWeights};
use crate::risk::{CategoryRiskTable, RiskMetrics};

/// Score and breakdown for one asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScoreResult {
    pub id: String,

    /// Weighted score, 0-100
    pub score: u8,

    pub reasoning: String,

    /// Unweighted baseline metrics of the asset's category
    pub metrics: RiskMetrics,
}

/// Scores assets against a risk table
#[derive(Clone, Debug, Default)]
pub struct HealthScorer {
    table: CategoryRiskTable,
}

impl HealthScorer {
    pub const fn new(table: CategoryRiskTable) -> Self {
        Self { table }
    }

    pub const fn table(&self) -> &CategoryRiskTable {
        &self.table
    }

    /// Score a single asset
    pub fn score(&self, asset: &Asset, weights: &HealthWeights) -> Result<HealthScoreResult> {
        weights.validate()?;
        let metrics = self.table.lookup(asset.category)?;

        Ok(HealthScoreResult {
            id: asset.id.clone(),
            score: weighted_score(metrics, weights),
            reasoning: reasoning_for(asset.category),
            metrics,
        })
    }

    /// Score every asset, one result per input in the same order.
    ///
    /// A failing asset does not affect the others; the caller decides
    /// whether to skip or report it.
    pub fn score_all(&self, assets: &[Asset], weights: &HealthWeights) -> Vec<Result<HealthScoreResult>> {
        assets.iter().map(|asset| self.score(asset, weights)).collect()
    }
}

/// Normalized weighted average of the three metrics, rounded half-up and clamped
pub fn weighted_score(metrics: RiskMetrics, weights: &HealthWeights) -> u8 {
    let weights = if weights.total() == Decimal::ZERO {
        HealthWeights::equal()
    } else {
        *weights
    };

    let weighted = Decimal::from(metrics.volatility) * weights.volatility
        + Decimal::from(metrics.liquidity) * weights.liquidity
        + Decimal::from(metrics.resilience) * weights.resilience;

    let score = (weighted / weights.total())
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, dec!(100));

    score.to_u8().unwrap_or(0)
}

fn reasoning_for(category: AssetCategory) -> String {
    format!("Based on the historical volatility, liquidity and resilience profile of the {category} category.")
}
