//! Application State

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use wealth_engine::store::{AssetStore, LedgerStore, MemoryAssetStore, MemoryLedger, PreferencesStore};
use wealth_engine::{
    Advisor, AssetCategory, EngineError, NewAsset, PriceReconciler, PriceSource, Result, SyncService,
};

/// Workspaces held when no limit is configured
pub const DEFAULT_MAX_WORKSPACES: usize = 10_000;

/// Per-user stores and sync guard
pub struct Workspace {
    pub assets: Arc<dyn AssetStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub sync: SyncService,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Market data backend (CoinGecko, Ollama, offline)
    pub source: Arc<dyn PriceSource>,

    pub reconciler: PriceReconciler,

    pub advisor: Arc<Advisor>,

    /// Preferences for every user
    pub preferences: Arc<dyn PreferencesStore>,

    /// Workspaces by user id, created on first use and kept for the
    /// lifetime of the process
    pub workspaces: Arc<RwLock<HashMap<String, Arc<Workspace>>>>,

    /// Most workspaces held at once; further users are refused
    pub max_workspaces: usize,

    /// Seed new workspaces with the demo portfolio
    pub seed_demo_assets: bool,
}

impl AppState {
    pub fn new(
        source: Arc<dyn PriceSource>,
        reconciler: PriceReconciler,
        preferences: Arc<dyn PreferencesStore>,
        seed_demo_assets: bool,
    ) -> Self {
        Self {
            source,
            reconciler,
            advisor: Arc::new(Advisor::default()),
            preferences,
            workspaces: Arc::default(),
            max_workspaces: DEFAULT_MAX_WORKSPACES,
            seed_demo_assets,
        }
    }

    pub fn with_max_workspaces(mut self, max_workspaces: usize) -> Self {
        self.max_workspaces = max_workspaces;
        self
    }

    /// Workspace for `user`, created (and optionally seeded) on first access.
    ///
    /// Workspaces are never evicted. Once `max_workspaces` exist, unknown
    /// users get [`EngineError::CapacityExceeded`].
    pub async fn workspace(&self, user: &str) -> Result<Arc<Workspace>> {
        if let Some(existing) = self.workspaces.read().await.get(user) {
            return Ok(existing.clone());
        }

        let mut workspaces = self.workspaces.write().await;
        if let Some(existing) = workspaces.get(user) {
            return Ok(existing.clone());
        }
        if workspaces.len() >= self.max_workspaces {
            tracing::warn!("Workspace limit ({}) reached, refusing user '{}'", self.max_workspaces, user);
            return Err(EngineError::CapacityExceeded(format!(
                "workspace limit of {} reached",
                self.max_workspaces
            )));
        }

        let assets: Arc<dyn AssetStore> = Arc::new(MemoryAssetStore::for_user(user));
        if self.seed_demo_assets {
            for draft in demo_assets() {
                if let Err(e) = assets.insert(draft).await {
                    tracing::warn!("Failed to seed demo asset: {}", e);
                }
            }
        }

        let workspace = Arc::new(Workspace {
            sync: SyncService::new(assets.clone(), self.source.clone(), self.reconciler.clone()),
            assets,
            ledger: Arc::new(MemoryLedger::new()),
        });
        workspaces.insert(user.to_string(), workspace.clone());

        tracing::info!("Created workspace for user '{}'", user);
        Ok(workspace)
    }
}

/// Starter portfolio shown to new users in demo mode
pub fn demo_assets() -> Vec<NewAsset> {
    vec![
        NewAsset::new("S&P 500 ETF (VOO)", AssetCategory::Stocks, dec!(100), dec!(450))
            .with_fee(dec!(0.03))
            .with_tags(["Long Term", "ETF"]),
        NewAsset::new("Bitcoin (BTC)", AssetCategory::Crypto, dec!(0.5), dec!(57000)).with_tags(["Volatile", "HODL"]),
        NewAsset::new("Ethereum (ETH)", AssetCategory::Crypto, dec!(4), dec!(3100)).with_tags(["Web3"]),
        NewAsset::new("Immobilier Paris", AssetCategory::RealEstate, dec!(1), dec!(450000))
            .with_tags(["Physique", "Locatif"]),
        NewAsset::new("Livret A", AssetCategory::Cash, dec!(15000), dec!(1))
            .with_yield(dec!(3))
            .with_tags(["Sécurité", "Liquide"]),
        NewAsset::new("Apple Inc. (AAPL)", AssetCategory::Stocks, dec!(50), dec!(170)).with_tags(["Tech", "Dividende"]),
    ]
}
