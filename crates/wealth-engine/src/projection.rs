//! Projections
//!
//! Long-horizon wealth simulation and fee-drag comparison.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::Asset;

/// Annual market return assumed by the fee-drag comparison
pub const ASSUMED_RETURN: Decimal = dec!(0.07);

/// Capital simulated when no fee-bearing asset is held
pub const FALLBACK_CAPITAL: Decimal = dec!(10000);

/// Annual fee (percent) simulated when no fee-bearing asset is held
pub const FALLBACK_FEE: Decimal = dec!(0.2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub wealth: Decimal,
}

/// Project wealth year by year with monthly contributions and monthly compounding.
///
/// Each year emits the current (rounded) wealth, then applies twelve months of
/// `w = (w + savings) * (1 + apy / 100 / 12)`.
///
/// Fails with [`EngineError::InvalidInput`] when the simulated wealth leaves
/// the representable `Decimal` range.
pub fn project_wealth(
    start: Decimal,
    monthly_savings: Decimal,
    target_apy: Decimal,
    years: u32,
) -> Result<Vec<ProjectionPoint>> {
    let growth = Decimal::ONE + target_apy / dec!(100) / dec!(12);
    let mut wealth = start;
    let mut points = Vec::with_capacity(years as usize + 1);

    for year in 0..=years {
        points.push(ProjectionPoint {
            year,
            wealth: round_whole(wealth),
        });
        if year == years {
            break;
        }
        for _ in 0..12 {
            wealth = wealth
                .checked_add(monthly_savings)
                .and_then(|w| w.checked_mul(growth))
                .ok_or_else(|| out_of_range(year))?;
        }
    }

    Ok(points)
}

fn out_of_range(year: u32) -> EngineError {
    EngineError::InvalidInput(format!("projection exceeds the supported range after year {year}"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDragPoint {
    pub year: u32,
    pub without_fees: Decimal,
    pub with_fees: Decimal,
    pub loss: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDrag {
    /// Starting capital (value of fee-bearing assets)
    pub capital: Decimal,

    /// Value-weighted annual fee, in percent
    pub average_fee: Decimal,

    pub points: Vec<FeeDragPoint>,

    /// Loss attributable to fees at the horizon
    pub total_loss: Decimal,
}

/// Compare compounding with and without the portfolio's annual fees
pub fn fee_drag(assets: &[Asset], years: u32) -> Result<FeeDrag> {
    let bearing: Vec<(Decimal, Decimal)> = assets
        .iter()
        .filter_map(|a| a.fee_percentage.filter(|fee| *fee > Decimal::ZERO).map(|fee| (a.value, fee)))
        .collect();
    let bearing_value: Decimal = bearing.iter().map(|(value, _)| *value).sum();

    let average_fee = if bearing.is_empty() || bearing_value <= Decimal::ZERO {
        FALLBACK_FEE
    } else {
        bearing.iter().map(|(value, fee)| *fee * (*value / bearing_value)).sum()
    };
    let capital = if bearing_value > Decimal::ZERO { bearing_value } else { FALLBACK_CAPITAL };

    let fee_rate = average_fee / dec!(100);
    let mut without = capital;
    let mut with = capital;
    let mut points = Vec::with_capacity(years as usize + 1);

    for year in 0..=years {
        let without_fees = round_whole(without);
        let with_fees = round_whole(with);
        points.push(FeeDragPoint {
            year,
            without_fees,
            with_fees,
            loss: round_whole(without - with),
        });
        if year == years {
            break;
        }
        without = without
            .checked_mul(Decimal::ONE + ASSUMED_RETURN)
            .ok_or_else(|| out_of_range(year))?;
        with = with
            .checked_mul(Decimal::ONE + ASSUMED_RETURN - fee_rate)
            .ok_or_else(|| out_of_range(year))?;
    }

    let total_loss = points
        .last()
        .map_or(Decimal::ZERO, |last| last.without_fees - last.with_fees);

    Ok(FeeDrag {
        capital,
        average_fee,
        points,
        total_loss,
    })
}

fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetCategory;
    use chrono::Utc;

    fn etf(value: Decimal, fee: Option<Decimal>) -> Asset {
        Asset {
            id: uuid::Uuid::new_v4().to_string(),
            name: "World ETF".into(),
            category: AssetCategory::Stocks,
            quantity: dec!(1),
            unit_price: Some(value),
            value,
            change_24h: Decimal::ZERO,
            yield_apy: None,
            fee_percentage: fee,
            tags: Vec::new(),
            created_at: Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn test_savings_without_return() {
        let points = project_wealth(Decimal::ZERO, dec!(100), Decimal::ZERO, 2).unwrap();
        let wealth: Vec<_> = points.iter().map(|p| p.wealth).collect();
        assert_eq!(wealth, vec![dec!(0), dec!(1200), dec!(2400)]);
    }

    #[test]
    fn test_monthly_compounding() {
        // 1000 * 1.01^12 = 1126.825...
        let points = project_wealth(dec!(1000), Decimal::ZERO, dec!(12), 1).unwrap();
        assert_eq!(points[1].wealth, dec!(1127));
    }

    #[test]
    fn test_fee_drag_weighted_average() {
        let assets = vec![etf(dec!(7500), Some(dec!(0.2))), etf(dec!(2500), Some(dec!(1.0))), etf(dec!(5000), None)];
        let drag = fee_drag(&assets, 1).unwrap();

        assert_eq!(drag.capital, dec!(10000));
        assert_eq!(drag.average_fee, dec!(0.4));
        assert_eq!(drag.points[1].without_fees, dec!(10700));
        assert_eq!(drag.points[1].with_fees, dec!(10660));
        assert_eq!(drag.total_loss, dec!(40));
    }

    #[test]
    fn test_fee_drag_fallbacks() {
        let drag = fee_drag(&[], 30).unwrap();
        assert_eq!(drag.capital, FALLBACK_CAPITAL);
        assert_eq!(drag.average_fee, FALLBACK_FEE);
        assert_eq!(drag.points.len(), 31);
        assert!(drag.total_loss > Decimal::ZERO);
    }

    #[test]
    fn test_runaway_projection_is_an_error() {
        let result = project_wealth(dec!(1000000), dec!(500), dec!(100000), 30);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_huge_capital_fee_drag_is_an_error() {
        let assets = vec![etf(Decimal::MAX / dec!(2), Some(dec!(0.1)))];
        assert!(matches!(fee_drag(&assets, 100), Err(EngineError::InvalidInput(_))));
    }
}
