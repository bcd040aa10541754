//! Static Price Source
//!
//! Fixed quote table for demos and testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PriceSource;
use crate::error::{EngineError, Result};
use crate::model::{AssetCategory, Quote};

/// Price source backed by an in-memory table
#[derive(Debug)]
pub struct StaticPriceSource {
    quotes: HashMap<String, Quote>,
    categories: Vec<AssetCategory>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl Default for StaticPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticPriceSource {
    /// Empty table serving Crypto and Stocks
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            categories: vec![AssetCategory::Crypto, AssetCategory::Stocks],
            unavailable: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Reference EUR quotes for common coins, keyed by market id
    pub fn demo() -> Self {
        // (id, price, 24h change)
        let table = [
            ("bitcoin", dec!(89500), dec!(2.5)),
            ("ethereum", dec!(3170), dec!(1.8)),
            ("solana", dec!(179), dec!(4.2)),
            ("cardano", dec!(0.87), dec!(-1.2)),
            ("polkadot", dec!(6.60), dec!(0.8)),
            ("chainlink", dec!(22.50), dec!(3.1)),
            ("avalanche-2", dec!(38.60), dec!(5.5)),
            ("cosmos", dec!(9.00), dec!(1.2)),
            ("ripple", dec!(2.16), dec!(0.9)),
            ("dogecoin", dec!(0.35), dec!(12.0)),
            ("litecoin", dec!(96.50), dec!(1.5)),
        ];
        table
            .into_iter()
            .fold(Self::new(), |source, (id, price, change)| source.with_quote(id, price, change))
    }

    pub fn with_quote(mut self, key: impl Into<String>, unit_price: Decimal, change_24h: Decimal) -> Self {
        self.quotes.insert(key.into(), Quote::new(unit_price, change_24h));
        self
    }

    pub fn with_categories(mut self, categories: impl Into<Vec<AssetCategory>>) -> Self {
        self.categories = categories.into();
        self
    }

    /// Fail every fetch with `PriceSourceUnavailable`
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    fn supports(&self, category: AssetCategory) -> bool {
        self.categories.contains(&category)
    }

    async fn fetch_quotes(&self, _keys: &[String]) -> Result<HashMap<String, Quote>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable {
            return Err(EngineError::PriceSourceUnavailable("static source disabled".into()));
        }

        // Whole table; the caller resolves names against it.
        Ok(self.quotes.clone())
    }

    async fn health_check(&self) -> bool {
        !self.unavailable
    }
}
