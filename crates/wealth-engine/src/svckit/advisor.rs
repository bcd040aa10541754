//! Advisor
//!
//! Batch health review of a portfolio: one score per asset plus the
//! portfolio-level insight list.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::health::{HealthScoreResult, HealthScorer};
use crate::insights::insights;
use crate::model::{Asset, HealthWeights};

/// An asset left out of the review, with the reason
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub id: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorReport {
    /// Scores keyed by asset id
    pub scores: HashMap<String, HealthScoreResult>,
    pub skipped: Vec<SkippedAsset>,
    pub insights: Vec<String>,
}

impl AdvisorReport {
    /// Value-weighted mean score, if anything was scored
    pub fn average_score(&self, assets: &[Asset]) -> Option<u8> {
        let (weighted, total) = assets
            .iter()
            .filter_map(|a| self.scores.get(&a.id).map(|s| (a.value, s.score)))
            .fold((Decimal::ZERO, Decimal::ZERO), |(w, t), (value, score)| {
                (w + value * Decimal::from(score), t + value)
            });

        weighted.checked_div(total).and_then(|avg| avg.round().to_u8())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Advisor {
    scorer: HealthScorer,
}

impl Advisor {
    pub const fn new(scorer: HealthScorer) -> Self {
        Self { scorer }
    }

    /// Score every asset and derive insights.
    ///
    /// Invalid weights fail the whole review; an asset the scorer rejects
    /// is only skipped.
    pub fn review(&self, assets: &[Asset], weights: &HealthWeights) -> Result<AdvisorReport> {
        weights.validate()?;

        let mut report = AdvisorReport {
            insights: insights(assets),
            ..Default::default()
        };

        for (asset, result) in assets.iter().zip(self.scorer.score_all(assets, weights)) {
            match result {
                Ok(score) => {
                    report.scores.insert(asset.id.clone(), score);
                }
                Err(e) => {
                    warn!(asset = %asset.id, error = %e, "Skipping asset in health review");
                    report.skipped.push(SkippedAsset {
                        id: asset.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(scored = report.scores.len(), skipped = report.skipped.len(), "Health review complete");
        Ok(report)
    }
}
