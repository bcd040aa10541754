//! Strategic Profile
//!
//! Five radar axes (0-100) summarizing portfolio composition.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{Asset, AssetCategory};
use crate::portfolio::category_share;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicProfile {
    pub diversification: Decimal,
    pub performance: Decimal,
    pub resilience: Decimal,
    pub liquidity: Decimal,
    pub stability: Decimal,
}

impl StrategicProfile {
    pub fn from_assets(assets: &[Asset]) -> Self {
        let categories: HashSet<AssetCategory> = assets.iter().map(|a| a.category).collect();
        let category_count = Decimal::from(categories.len());
        let all_categories = Decimal::from(AssetCategory::ALL.len());

        let diversification = (category_count / all_categories * dec!(100)).min(dec!(100));
        let performance = (category_share(assets, AssetCategory::Crypto)
            + category_share(assets, AssetCategory::Stocks))
        .min(dec!(100));
        let resilience = ((category_share(assets, AssetCategory::Cash)
            + category_share(assets, AssetCategory::RealEstate))
            * dec!(2))
        .min(dec!(100));
        let liquidity = if categories.contains(&AssetCategory::Cash) { dec!(80) } else { dec!(20) };

        Self {
            diversification: or_default(diversification, dec!(20)),
            performance: or_default(performance, dec!(50)),
            resilience: or_default(resilience, dec!(30)),
            liquidity,
            stability: dec!(100) - performance / dec!(2),
        }
    }

    /// Axes as labelled pairs, in radar order
    pub fn axes(&self) -> [(&'static str, Decimal); 5] {
        [
            ("diversification", self.diversification),
            ("performance", self.performance),
            ("resilience", self.resilience),
            ("liquidity", self.liquidity),
            ("stability", self.stability),
        ]
    }
}

// Zero axes read as "no signal" and display a neutral placeholder.
fn or_default(value: Decimal, default: Decimal) -> Decimal {
    if value.is_zero() { default } else { value }
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
    fn test_empty_portfolio_uses_placeholders() {
        let profile = StrategicProfile::from_assets(&[]);
        assert_eq!(profile.diversification, dec!(20));
        assert_eq!(profile.performance, dec!(50));
        assert_eq!(profile.resilience, dec!(30));
        assert_eq!(profile.liquidity, dec!(20));
        assert_eq!(profile.stability, dec!(100));
    }

    #[test]
    fn test_balanced_portfolio() {
        let assets = vec![
            asset(AssetCategory::Stocks, dec!(400)),
            asset(AssetCategory::Crypto, dec!(100)),
            asset(AssetCategory::Cash, dec!(200)),
            asset(AssetCategory::RealEstate, dec!(300)),
        ];
        let profile = StrategicProfile::from_assets(&assets);

        assert_eq!(profile.diversification, dec!(80));
        assert_eq!(profile.performance, dec!(50));
        assert_eq!(profile.resilience, dec!(100));
        assert_eq!(profile.liquidity, dec!(80));
        assert_eq!(profile.stability, dec!(75));
        assert_eq!(profile.axes()[3], ("liquidity", dec!(80)));
    }
}
