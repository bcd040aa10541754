//! # wealth-engine
//!
//! Portfolio health scoring and valuation for a personal wealth tracker.
//!
//! ## Pipeline
//!
//! ```text
//! AssetStore ──list──▶ aggregate ──▶ PortfolioStats
//!      │                  │
//!      │                  ├──▶ HealthScorer (CategoryRiskTable × HealthWeights)
//!      │                  └──▶ insights
//!      │
//!      └──▶ PriceReconciler ◀── PriceSource (CoinGecko │ LLM │ static)
//!                 │
//!                 ▼
//!           PriceUpdate[] ──▶ SyncService ──▶ AssetStore.update
//! ```
//!
//! ## Health score
//!
//! Every category has baseline metrics on a 0-100 scale where higher is
//! healthier (see [`risk`]). A score is their weighted average under the
//! user's [`HealthWeights`]; the volatility column is a stability rating.

pub mod cashflow;
pub mod error;
pub mod health;
pub mod insights;
pub mod model;
pub mod portfolio;
pub mod preferences;
pub mod pricing;
pub mod profile;
pub mod projection;
pub mod reconcile;
pub mod risk;
pub mod store;
pub mod svckit;

pub use error::{EngineError, Result};
pub use health::{HealthScoreResult, HealthScorer};
pub use insights::{Insight, insights};
pub use model::{Asset, AssetCategory, AssetPatch, HealthWeights, NewAsset, PriceUpdate, Quote, UpdateSource};
pub use portfolio::{PortfolioStats, aggregate};
pub use preferences::Preferences;
pub use pricing::{CompletionProvider, PriceSource};
pub use reconcile::{PriceReconciler, ReconcilerConfig};
pub use risk::{CategoryRiskTable, RiskMetrics};
pub use svckit::{Advisor, AdvisorReport, SyncReport, SyncService};
