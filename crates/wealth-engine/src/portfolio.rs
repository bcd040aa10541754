//! Portfolio Aggregator
//!
//! Net worth, 24h change and composition over an in-memory asset list.

use std::collections::BTreeSet;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{Asset, AssetCategory};

/// Portfolio-level statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_net_worth: Decimal,

    /// Absolute change implied by each asset's 24h percentage move
    #[serde(rename = "totalChange24h")]
    pub total_change_24h: Decimal,

    /// Change relative to yesterday's implied net worth
    pub total_change_percentage: Decimal,
}

/// Aggregate net worth and 24h change.
///
/// The percentage uses yesterday's implied net worth
/// (`net_worth - change`) as its base, not today's net worth:
/// a 1000 portfolio up 100 reports 11.11%, not 10%.
pub fn aggregate(assets: &[Asset]) -> PortfolioStats {
    let total_net_worth: Decimal = assets.iter().map(|a| a.value).sum();
    let total_change_24h: Decimal = assets.iter().map(|a| a.value * a.change_24h / dec!(100)).sum();

    let total_change_percentage = if total_net_worth > Decimal::ZERO {
        total_change_24h
            .checked_div(total_net_worth - total_change_24h)
            .map_or(Decimal::ZERO, |ratio| ratio * dec!(100))
    } else {
        Decimal::ZERO
    };

    PortfolioStats {
        total_net_worth,
        total_change_24h,
        total_change_percentage,
    }
}

/// Value held in one category
pub fn category_value(assets: &[Asset], category: AssetCategory) -> Decimal {
    assets.iter().filter(|a| a.category == category).map(|a| a.value).sum()
}

/// Share of total value held in one category, in percent (0 for an empty portfolio)
pub fn category_share(assets: &[Asset], category: AssetCategory) -> Decimal {
    let total: Decimal = assets.iter().map(|a| a.value).sum();
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    category_value(assets, category) / total * dec!(100)
}

/// Value per category, in category order, omitting empty categories
pub fn category_exposure(assets: &[Asset]) -> Vec<(AssetCategory, Decimal)> {
    AssetCategory::ALL
        .into_iter()
        .filter(|category| assets.iter().any(|a| a.category == *category))
        .map(|category| (category, category_value(assets, category)))
        .collect()
}

/// 24h performance per category, in percent rounded to two decimals.
///
/// Uses the same yesterday-based percentage as [`aggregate`], so a category
/// whose implied previous value is zero reports 0. Empty categories are omitted.
pub fn category_performance(assets: &[Asset]) -> Vec<(AssetCategory, Decimal)> {
    AssetCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<Asset> = assets.iter().filter(|a| a.category == category).cloned().collect();
            (!members.is_empty()).then(|| {
                let performance = aggregate(&members)
                    .total_change_percentage
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                (category, performance)
            })
        })
        .collect()
}

/// Progress toward a net-worth goal, in percent, capped at 100
pub fn goal_progress(net_worth: Decimal, goal: Decimal) -> Decimal {
    if goal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (net_worth / goal * dec!(100)).clamp(Decimal::ZERO, dec!(100))
}

/// Distinct tags across all assets, sorted
pub fn available_tags(assets: &[Asset]) -> Vec<String> {
    assets
        .iter()
        .flat_map(|a| a.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Assets grouped by category, optionally restricted to one tag.
///
/// Groups follow category order; empty groups are omitted and assets keep
/// their input order inside a group.
pub fn group_by_category<'a>(assets: &'a [Asset], tag: Option<&str>) -> Vec<(AssetCategory, Vec<&'a Asset>)> {
    AssetCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let items: Vec<&Asset> = assets
                .iter()
                .filter(|a| a.category == category)
                .filter(|a| tag.is_none_or(|t| a.has_tag(t)))
                .collect();
            (!items.is_empty()).then_some((category, items))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn asset(category: AssetCategory, value: Decimal, change: Decimal) -> Asset {
        Asset {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Holding".into(),
            category,
            quantity: dec!(1),
            unit_price: Some(value),
            value,
            change_24h: change,
            yield_apy: None,
            fee_percentage: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn test_empty_portfolio() {
        let stats = aggregate(&[]);
        assert_eq!(stats, PortfolioStats::default());
        assert_eq!(stats.total_net_worth, Decimal::ZERO);
        assert_eq!(stats.total_change_24h, Decimal::ZERO);
        assert_eq!(stats.total_change_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_percentage_uses_implied_previous_worth() {
        let stats = aggregate(&[asset(AssetCategory::Stocks, dec!(1000), dec!(10))]);
        assert_eq!(stats.total_net_worth, dec!(1000));
        assert_eq!(stats.total_change_24h, dec!(100));
        assert_eq!(stats.total_change_percentage.round_dp(2), dec!(11.11));
    }

    #[test]
    fn test_mixed_moves() {
        let stats = aggregate(&[
            asset(AssetCategory::Stocks, dec!(45000), dec!(1.2)),
            asset(AssetCategory::Crypto, dec!(28500), dec!(-2.4)),
            asset(AssetCategory::Cash, dec!(15000), Decimal::ZERO),
        ]);
        // 540 - 684 = -144
        assert_eq!(stats.total_net_worth, dec!(88500));
        assert_eq!(stats.total_change_24h, dec!(-144));
        assert!(stats.total_change_percentage < Decimal::ZERO);
    }

    #[test]
    fn test_zero_denominator_does_not_panic() {
        // A 100% move makes yesterday's implied worth zero.
        let stats = aggregate(&[asset(AssetCategory::Crypto, dec!(500), dec!(100))]);
        assert_eq!(stats.total_change_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_category_share_and_exposure() {
        let assets = vec![
            asset(AssetCategory::Crypto, dec!(300), Decimal::ZERO),
            asset(AssetCategory::Cash, dec!(700), Decimal::ZERO),
        ];
        assert_eq!(category_share(&assets, AssetCategory::Crypto), dec!(30));
        assert_eq!(category_share(&[], AssetCategory::Crypto), Decimal::ZERO);
        assert_eq!(
            category_exposure(&assets),
            vec![(AssetCategory::Crypto, dec!(300)), (AssetCategory::Cash, dec!(700))]
        );
    }

    #[test]
    fn test_goal_progress_capped() {
        assert_eq!(goal_progress(dec!(250000), dec!(1000000)), dec!(25));
        assert_eq!(goal_progress(dec!(2000000), dec!(1000000)), dec!(100));
        assert_eq!(goal_progress(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_tags_and_grouping() {
        let mut etf = asset(AssetCategory::Stocks, dec!(10), Decimal::ZERO);
        etf.tags = vec!["Long Term".into(), "ETF".into()];
        let mut btc = asset(AssetCategory::Crypto, dec!(10), Decimal::ZERO);
        btc.tags = vec!["HODL".into(), "Long Term".into()];
        let cash = asset(AssetCategory::Cash, dec!(10), Decimal::ZERO);
        let assets = vec![cash, btc, etf];

        assert_eq!(available_tags(&assets), vec!["ETF", "HODL", "Long Term"]);

        let all = group_by_category(&assets, None);
        let order: Vec<_> = all.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![AssetCategory::Stocks, AssetCategory::Crypto, AssetCategory::Cash]);

        let long_term = group_by_category(&assets, Some("Long Term"));
        assert_eq!(long_term.len(), 2);
        assert!(long_term.iter().all(|(c, _)| *c != AssetCategory::Cash));
    }

    #[test]
    fn test_category_performance() {
        let assets = vec![
            asset(AssetCategory::Stocks, dec!(1000), dec!(10)),
            asset(AssetCategory::Stocks, dec!(500), Decimal::ZERO),
            asset(AssetCategory::Crypto, dec!(500), dec!(100)),
            asset(AssetCategory::Cash, dec!(700), Decimal::ZERO),
        ];
        // Stocks: 100 / (1500 - 100) = 7.142857..%; Crypto has a zero base
        assert_eq!(
            category_performance(&assets),
            vec![
                (AssetCategory::Stocks, dec!(7.14)),
                (AssetCategory::Crypto, Decimal::ZERO),
                (AssetCategory::Cash, Decimal::ZERO),
            ]
        );
        assert!(category_performance(&[]).is_empty());
    }
}
