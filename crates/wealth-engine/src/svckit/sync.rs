//! Sync Service
//!
//! Runs one reconciliation pass and persists the results.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{EngineError, Result};
use crate::model::{AssetPatch, UpdateSource};
use crate::portfolio::{PortfolioStats, aggregate};
use crate::pricing::PriceSource;
use crate::reconcile::PriceReconciler;
use crate::store::AssetStore;

/// Outcome of a sync pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Assets written successfully
    pub updated: usize,

    /// Assets whose write failed
    pub failed: usize,

    /// Written updates per producing rule
    pub by_source: HashMap<UpdateSource, usize>,

    /// Statistics over the re-listed assets
    pub stats: PortfolioStats,
}

/// Reconciles and persists prices for one asset store
pub struct SyncService {
    store: Arc<dyn AssetStore>,
    source: Arc<dyn PriceSource>,
    reconciler: PriceReconciler,
    running: AtomicBool,
}

// Clears the in-flight flag on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncService {
    pub fn new(store: Arc<dyn AssetStore>, source: Arc<dyn PriceSource>, reconciler: PriceReconciler) -> Self {
        Self {
            store,
            source,
            reconciler,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Run one pass. Overlapping calls fail with `SyncInProgress`.
    pub async fn sync(&self) -> Result<SyncReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::SyncInProgress);
        }
        let _guard = RunningGuard(&self.running);

        let assets = self.store.list().await?;
        if assets.is_empty() {
            return Ok(SyncReport::default());
        }

        let updates = self.reconciler.reconcile(&assets, self.source.as_ref()).await;
        let quantities: HashMap<&str, _> = assets.iter().map(|a| (a.id.as_str(), a.quantity)).collect();

        let mut report = SyncReport::default();
        for update in &updates {
            let Some(quantity) = quantities.get(update.id.as_str()) else {
                continue;
            };

            match self.store.update(&update.id, AssetPatch::price(*quantity, update)).await {
                Ok(_) => {
                    report.updated += 1;
                    *report.by_source.entry(update.source).or_default() += 1;
                }
                Err(e) => {
                    error!(asset = %update.id, error = %e, "Failed to persist price update");
                    report.failed += 1;
                }
            }
        }

        report.stats = aggregate(&self.store.list().await?);

        info!(
            source = self.source.name(),
            updated = report.updated,
            failed = report.failed,
            net_worth = %report.stats.total_net_worth,
            "Market sync complete"
        );

        Ok(report)
    }
}
