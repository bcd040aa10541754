//! In-memory stores (for development and tests)

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AssetStore, LedgerStore, PreferencesStore};
use crate::cashflow::{Budget, NewBudget, NewTransaction, Transaction, apply_spending};
use crate::error::{EngineError, Result};
use crate::model::{Asset, AssetPatch, NewAsset};
use crate::preferences::Preferences;

/// Asset store backed by a map
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    user_id: Option<String>,
    assets: RwLock<HashMap<String, Asset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose assets are stamped with `user_id`
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            assets: RwLock::default(),
        }
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn list(&self) -> Result<Vec<Asset>> {
        let assets = self.assets.read().await;
        let mut list: Vec<Asset> = assets.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn get(&self, id: &str) -> Result<Asset> {
        let assets = self.assets.read().await;
        assets
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::AssetNotFound(id.to_string()))
    }

    async fn insert(&self, draft: NewAsset) -> Result<Asset> {
        draft.validate()?;
        let asset = draft.into_asset(Uuid::new_v4().to_string(), self.user_id.clone());

        let mut assets = self.assets.write().await;
        assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    async fn update(&self, id: &str, patch: AssetPatch) -> Result<Asset> {
        let mut assets = self.assets.write().await;
        let asset = assets
            .get_mut(id)
            .ok_or_else(|| EngineError::AssetNotFound(id.to_string()))?;
        asset.apply_patch(patch);
        Ok(asset.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut assets = self.assets.write().await;
        assets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::AssetNotFound(id.to_string()))
    }
}

/// Preferences keyed by user id
#[derive(Debug, Default)]
pub struct MemoryPreferencesStore {
    preferences: RwLock<HashMap<String, Preferences>>,
}

impl MemoryPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn get(&self, user: &str) -> Result<Preferences> {
        let preferences = self.preferences.read().await;
        Ok(preferences.get(user).cloned().unwrap_or_default())
    }

    async fn set(&self, user: &str, preferences: Preferences) -> Result<Preferences> {
        preferences.validate()?;
        let mut stored = self.preferences.write().await;
        stored.insert(user.to_string(), preferences.clone());
        Ok(preferences)
    }
}

/// Transactions and budgets held in memory
#[derive(Debug, Default)]
pub struct MemoryLedger {
    transactions: RwLock<Vec<Transaction>>,
    budgets: RwLock<Vec<Budget>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut list = self.transactions.read().await.clone();
        list.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(list)
    }

    async fn add_transaction(&self, draft: NewTransaction) -> Result<Transaction> {
        draft.validate()?;
        let transaction = draft.into_transaction(Uuid::new_v4().to_string());
        self.transactions.write().await.push(transaction.clone());
        Ok(transaction)
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        let before = transactions.len();
        transactions.retain(|t| t.id != id);
        if transactions.len() == before {
            return Err(EngineError::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    async fn budgets(&self) -> Result<Vec<Budget>> {
        let mut budgets = self.budgets.read().await.clone();
        let transactions = self.transactions.read().await;
        apply_spending(&mut budgets, &transactions);
        Ok(budgets)
    }

    async fn add_budget(&self, draft: NewBudget) -> Result<Budget> {
        draft.validate()?;
        let budget = draft.into_budget(Uuid::new_v4().to_string());
        self.budgets.write().await.push(budget.clone());
        Ok(budget)
    }

    async fn delete_budget(&self, id: &str) -> Result<()> {
        let mut budgets = self.budgets.write().await;
        let before = budgets.len();
        budgets.retain(|b| b.id != id);
        if budgets.len() == before {
            return Err(EngineError::NotFound(format!("budget {id}")));
        }
        Ok(())
    }
}
