//! Insight Rules
//!
//! Fixed-threshold advisory lines about portfolio composition.
//! Lines are emitted in rule order, not sorted by priority.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{Asset, AssetCategory};
use crate::portfolio::category_share;

/// Crypto share above which exposure should be reduced (percent)
pub const CRYPTO_CEILING: Decimal = dec!(20);

/// Cash share below which the safety buffer is considered low (percent)
pub const CASH_FLOOR: Decimal = dec!(5);

/// Position count below which the portfolio is under-diversified
pub const MIN_POSITIONS: usize = 5;

/// One advisory finding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Insight {
    EmptyPortfolio,
    CryptoOverweight(Decimal),
    CryptoControlled(Decimal),
    LowSafetyBuffer(Decimal),
    LowDiversification(usize),
    GoodGranularity(usize),
}

impl Insight {
    pub const fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::CryptoOverweight(_) | Self::LowSafetyBuffer(_) | Self::LowDiversification(_)
        )
    }
}

/// Share rounded half-up to one decimal for display
fn one_decimal(share: Decimal) -> Decimal {
    share.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EmptyPortfolio => write!(f, "Add assets to receive a strategic analysis."),
            Self::CryptoOverweight(share) => write!(
                f,
                "⚠️ Reduce crypto exposure ({:.1}%): this is high. Consider securing profits into more stable assets.",
                one_decimal(share)
            ),
            Self::CryptoControlled(share) => write!(
                f,
                "✅ Your crypto exposure ({:.1}%) is well controlled for a balanced profile.",
                one_decimal(share)
            ),
            Self::LowSafetyBuffer(share) => write!(
                f,
                "💡 Low safety buffer ({:.1}% in cash). Aim for 3 to 6 months of expenses in cash.",
                one_decimal(share)
            ),
            Self::LowDiversification(count) => write!(
                f,
                "🔍 Low diversification ({count} positions). More holdings reduce your specific risk."
            ),
            Self::GoodGranularity(count) => write!(
                f,
                "🌟 Good granularity: your {count} positions give a solid diversification base."
            ),
        }
    }
}

/// Evaluate every rule against the asset list
pub fn evaluate(assets: &[Asset]) -> Vec<Insight> {
    if assets.is_empty() {
        return vec![Insight::EmptyPortfolio];
    }

    let crypto = category_share(assets, AssetCategory::Crypto);
    let cash = category_share(assets, AssetCategory::Cash);

    let mut found = Vec::new();

    if crypto > CRYPTO_CEILING {
        found.push(Insight::CryptoOverweight(crypto));
    } else if crypto > Decimal::ZERO {
        found.push(Insight::CryptoControlled(crypto));
    }

    if cash < CASH_FLOOR {
        found.push(Insight::LowSafetyBuffer(cash));
    }

    if assets.len() < MIN_POSITIONS {
        found.push(Insight::LowDiversification(assets.len()));
    } else {
        found.push(Insight::GoodGranularity(assets.len()));
    }

    found
}

/// Advisory lines, one per triggered rule
pub fn insights(assets: &[Asset]) -> Vec<String> {
    evaluate(assets).iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn asset(category: AssetCategory, value: Decimal) -> Asset {
        Asset {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Holding".into(),
            category,
            quantity: dec!(1),
            unit_price: Some(value),
            value,
            change_24h: Decimal::ZERO,
            yield_apy: None,
            fee_percentage: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn test_empty_portfolio_short_circuits() {
        let lines = insights(&[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], Insight::EmptyPortfolio.to_string());
    }

    #[test]
    fn test_crypto_overweight() {
        let assets = vec![asset(AssetCategory::Crypto, dec!(300)), asset(AssetCategory::Cash, dec!(700))];
        let lines = insights(&assets);

        assert!(lines.iter().any(|l| l.to_lowercase().contains("reduce crypto exposure (30.0%)")));
        assert!(!lines.iter().any(|l| l.contains("well controlled")));
        // 70% cash: no buffer warning; 2 positions: low diversification
        assert!(!lines.iter().any(|l| l.contains("safety buffer")));
        assert!(lines.last().unwrap().contains("Low diversification (2 positions)"));
    }

    #[test]
    fn test_crypto_controlled_and_low_cash() {
        let assets = vec![
            asset(AssetCategory::Crypto, dec!(100)),
            asset(AssetCategory::Stocks, dec!(880)),
            asset(AssetCategory::Cash, dec!(20)),
        ];
        let found = evaluate(&assets);

        assert_eq!(found[0], Insight::CryptoControlled(dec!(10)));
        assert_eq!(found[1], Insight::LowSafetyBuffer(dec!(2)));
        assert_eq!(found[2], Insight::LowDiversification(3));
        assert!(found[0].to_string().contains("(10.0%)"));
    }

    #[test]
    fn test_no_crypto_line_without_crypto() {
        let assets: Vec<Asset> = (0..5).map(|_| asset(AssetCategory::Cash, dec!(10))).collect();
        let found = evaluate(&assets);

        assert_eq!(found, vec![Insight::GoodGranularity(5)]);
    }

    #[test]
    fn test_warning_classification() {
        assert!(Insight::CryptoOverweight(dec!(30)).is_warning());
        assert!(!Insight::GoodGranularity(6).is_warning());
    }

    #[test]
    fn test_shares_round_half_up_to_one_decimal() {
        let two_thirds = insights(&[asset(AssetCategory::Crypto, dec!(200)), asset(AssetCategory::Cash, dec!(100))]);
        assert!(two_thirds[0].contains("(66.7%)"), "{}", two_thirds[0]);

        let lines = insights(&[
            asset(AssetCategory::Crypto, dec!(0.96)),
            asset(AssetCategory::Cash, dec!(4.96)),
            asset(AssetCategory::Stocks, dec!(94.08)),
        ]);
        assert!(lines[0].contains("(1.0%)"), "{}", lines[0]);
        assert!(lines[1].contains("Low safety buffer (5.0% in cash)"), "{}", lines[1]);
    }
}
