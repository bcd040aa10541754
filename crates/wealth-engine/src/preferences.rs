//! User Preferences

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::HealthWeights;

/// Per-user settings. Engine functions take the pieces they need as parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub health_weights: HealthWeights,
    pub currency: String,
    pub display_name: String,

    /// Net worth regarded as financial independence
    pub freedom_goal: Decimal,

    pub dark_mode: bool,

    /// Mask amounts in the UI
    pub private_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            health_weights: HealthWeights::default(),
            currency: "EUR".into(),
            display_name: "Investor".into(),
            freedom_goal: dec!(1000000),
            dark_mode: true,
            private_mode: false,
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Result<()> {
        self.health_weights.validate()?;
        if self.currency.trim().len() != 3 {
            return Err(EngineError::InvalidInput(format!("'{}' is not an ISO currency code", self.currency)));
        }
        if self.freedom_goal < Decimal::ZERO {
            return Err(EngineError::InvalidInput("freedom goal cannot be negative".into()));
        }
        Ok(())
    }
}
