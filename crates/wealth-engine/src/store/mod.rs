//! Persistence Seams
//!
//! Async storage traits; the engine itself never touches storage.

mod memory;

pub use memory::{MemoryAssetStore, MemoryLedger, MemoryPreferencesStore};

use async_trait::async_trait;

use crate::cashflow::{Budget, NewBudget, NewTransaction, Transaction};
use crate::error::Result;
use crate::model::{Asset, AssetPatch, HealthWeights, NewAsset};
use crate::preferences::Preferences;

/// Asset persistence for one user
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// All assets, newest first
    async fn list(&self) -> Result<Vec<Asset>>;

    async fn get(&self, id: &str) -> Result<Asset>;

    /// Persist a new asset and return it with its id
    async fn insert(&self, draft: NewAsset) -> Result<Asset>;

    /// Apply a partial update and return the stored asset
    async fn update(&self, id: &str, patch: AssetPatch) -> Result<Asset>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Per-user preferences
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Stored preferences, or defaults when none exist
    async fn get(&self, user: &str) -> Result<Preferences>;

    async fn set(&self, user: &str, preferences: Preferences) -> Result<Preferences>;

    async fn set_weights(&self, user: &str, weights: HealthWeights) -> Result<Preferences> {
        weights.validate()?;
        let mut preferences = self.get(user).await?;
        preferences.health_weights = weights;
        self.set(user, preferences).await
    }
}

/// Transactions and budgets for one user
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All transactions, most recent date first
    async fn transactions(&self) -> Result<Vec<Transaction>>;

    async fn add_transaction(&self, draft: NewTransaction) -> Result<Transaction>;

    async fn delete_transaction(&self, id: &str) -> Result<()>;

    async fn budgets(&self) -> Result<Vec<Budget>>;

    async fn add_budget(&self, draft: NewBudget) -> Result<Budget>;

    async fn delete_budget(&self, id: &str) -> Result<()>;
}
