//! Domain Models
//!
//! Core data types for tracked holdings and their valuation.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Unit price assumed for legacy rows that carry neither a price nor a quantity
pub const LEGACY_UNIT_PRICE: Decimal = dec!(100);

/// Closed set of asset categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    Stocks,
    Crypto,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Cash,
    Other,
}

impl AssetCategory {
    /// All categories, in display order
    pub const ALL: [Self; 5] = [Self::Stocks, Self::Crypto, Self::RealEstate, Self::Cash, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stocks => "Stocks",
            Self::Crypto => "Crypto",
            Self::RealEstate => "Real Estate",
            Self::Cash => "Cash",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "stocks" | "stock" => Ok(Self::Stocks),
            "crypto" => Ok(Self::Crypto),
            "realestate" => Ok(Self::RealEstate),
            "cash" => Ok(Self::Cash),
            "other" => Ok(Self::Other),
            _ => Err(EngineError::UnknownCategory(s.to_string())),
        }
    }
}

/// A tracked holding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Store-assigned identifier
    pub id: String,

    /// Display name, also the lookup key for market prices
    pub name: String,

    pub category: AssetCategory,

    /// Units held
    pub quantity: Decimal,

    /// Price per unit in the base currency (absent on legacy rows)
    #[serde(default)]
    pub unit_price: Option<Decimal>,

    /// Cached `quantity * unit_price`
    pub value: Decimal,

    /// Last 24h price move, in percent
    #[serde(default, rename = "change24h")]
    pub change_24h: Decimal,

    /// Declared annual yield, in percent
    #[serde(default, rename = "yieldAPY")]
    pub yield_apy: Option<Decimal>,

    /// Annual fee, in percent
    #[serde(default)]
    pub fee_percentage: Option<Decimal>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub user_id: Option<String>,
}

impl Asset {
    /// Price used for valuation and drift.
    ///
    /// Falls back to `value / quantity`, then to [`LEGACY_UNIT_PRICE`].
    pub fn effective_unit_price(&self) -> Decimal {
        if let Some(price) = self.unit_price {
            return price;
        }
        if self.quantity > Decimal::ZERO {
            return self.value / self.quantity;
        }
        LEGACY_UNIT_PRICE
    }

    /// Apply a reconciled price, re-establishing `value == quantity * unit_price`
    pub fn apply_price(&mut self, update: &PriceUpdate) {
        self.unit_price = Some(update.unit_price);
        self.change_24h = update.change_24h;
        self.value = self.quantity * update.unit_price;
    }

    /// Apply a partial update field by field. No invariant is enforced here.
    pub fn apply_patch(&mut self, patch: AssetPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = Some(unit_price);
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(change) = patch.change_24h {
            self.change_24h = change;
        }
        if let Some(apy) = patch.yield_apy {
            self.yield_apy = Some(apy);
        }
        if let Some(fee) = patch.fee_percentage {
            self.fee_percentage = Some(fee);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// User input for a new holding (an asset without an id)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub name: String,
    pub category: AssetCategory,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default, rename = "yieldAPY")]
    pub yield_apy: Option<Decimal>,
    #[serde(default)]
    pub fee_percentage: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewAsset {
    pub fn new(
        name: impl Into<String>,
        category: AssetCategory,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            quantity,
            unit_price,
            yield_apy: None,
            fee_percentage: None,
            tags: Vec::new(),
        }
    }

    pub fn with_yield(mut self, apy: Decimal) -> Self {
        self.yield_apy = Some(apy);
        self
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee_percentage = Some(fee);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Reject input that cannot produce a valid holding
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidAsset("name is required".into()));
        }
        if self.quantity < Decimal::ZERO {
            return Err(EngineError::InvalidAsset("quantity must not be negative".into()));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(EngineError::InvalidAsset("unit price must not be negative".into()));
        }
        Ok(())
    }

    /// Value implied by the form fields
    pub fn value(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Materialize with a store-assigned id
    pub fn into_asset(self, id: impl Into<String>, user_id: Option<String>) -> Asset {
        let value = self.value();
        Asset {
            id: id.into(),
            name: self.name.trim().to_string(),
            category: self.category,
            quantity: self.quantity,
            unit_price: Some(self.unit_price),
            value,
            change_24h: Decimal::ZERO,
            yield_apy: self.yield_apy,
            fee_percentage: self.fee_percentage,
            tags: self.tags,
            created_at: Utc::now(),
            user_id,
        }
    }
}

/// Split a comma-separated tag field, dropping blanks
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Partial update of a stored asset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<AssetCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "change24h")]
    pub change_24h: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "yieldAPY")]
    pub yield_apy: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl AssetPatch {
    /// Full replace of the user-editable fields, with `value` recomputed
    pub fn edit(draft: &NewAsset) -> Self {
        Self {
            name: Some(draft.name.trim().to_string()),
            category: Some(draft.category),
            quantity: Some(draft.quantity),
            unit_price: Some(draft.unit_price),
            value: Some(draft.value()),
            change_24h: None,
            yield_apy: Some(draft.yield_apy.unwrap_or(Decimal::ZERO)),
            fee_percentage: Some(draft.fee_percentage.unwrap_or(Decimal::ZERO)),
            tags: Some(draft.tags.clone()),
        }
    }

    /// Price-only update for a reconciled asset, with `value` recomputed
    pub fn price(quantity: Decimal, update: &PriceUpdate) -> Self {
        Self {
            unit_price: Some(update.unit_price),
            value: Some(quantity * update.unit_price),
            change_24h: Some(update.change_24h),
            ..Default::default()
        }
    }
}

/// User-tunable weights for the health score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthWeights {
    pub volatility: Decimal,
    pub liquidity: Decimal,
    pub resilience: Decimal,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            volatility: dec!(0.33),
            liquidity: dec!(0.33),
            resilience: dec!(0.34),
        }
    }
}

impl HealthWeights {
    pub fn new(volatility: Decimal, liquidity: Decimal, resilience: Decimal) -> Result<Self> {
        let weights = Self {
            volatility,
            liquidity,
            resilience,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Equal weighting
    pub const fn equal() -> Self {
        Self {
            volatility: Decimal::ONE,
            liquidity: Decimal::ONE,
            resilience: Decimal::ONE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("volatility", self.volatility),
            ("liquidity", self.liquidity),
            ("resilience", self.resilience),
        ] {
            if w < Decimal::ZERO {
                return Err(EngineError::InvalidWeights(format!("{name} is negative ({w})")));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.volatility + self.liquidity + self.resilience
    }

    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            volatility: self.volatility * factor,
            liquidity: self.liquidity * factor,
            resilience: self.resilience * factor,
        }
    }
}

/// Which reconciliation rule produced an update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    Fixed,
    YieldAccrual,
    Market,
    Simulated,
}

/// Reconciled price for one asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub id: String,
    pub unit_price: Decimal,
    #[serde(rename = "change24h")]
    pub change_24h: Decimal,
    pub source: UpdateSource,
}

/// One record from a price source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub unit_price: Decimal,
    #[serde(rename = "change24h")]
    pub change_24h: Decimal,
}

impl Quote {
    pub const fn new(unit_price: Decimal, change_24h: Decimal) -> Self {
        Self {
            unit_price,
            change_24h,
        }
    }
}
