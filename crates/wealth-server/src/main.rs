//! wealth-engine HTTP Server
//!
//! Axum-based server exposing portfolio tracking, health scoring,
//! market sync and cash-flow endpoints.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wealth_engine::pricing::{CoinGeckoPriceSource, LlmPriceSource, OfflinePriceSource};
use wealth_engine::store::MemoryPreferencesStore;
use wealth_engine::{PriceReconciler, PriceSource};
use wealth_runtime::OllamaCompletion;

use crate::config::{PriceSourceKind, ServerConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();

    // Initialize market data source
    let source = build_price_source(config.price_source)?;
    if source.health_check().await {
        tracing::info!("✓ Price source '{}' reachable", source.name());
    } else {
        tracing::warn!("⚠ Price source '{}' not reachable - prices will be simulated", source.name());
    }

    let state = AppState::new(
        source,
        PriceReconciler::new(config.reconciler.clone()),
        Arc::new(MemoryPreferencesStore::new()),
        config.seed_demo_assets,
    )
    .with_max_workspaces(config.max_workspaces);
    if config.seed_demo_assets {
        tracing::info!("Demo portfolio enabled for new users");
    }

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 wealth-server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("  GET  /api/assets         - List assets (?tag=)");
    tracing::info!("  POST /api/sync           - Sync market prices");
    tracing::info!("  GET  /api/stats          - Net worth & exposure");
    tracing::info!("  GET  /api/advisor        - Health scores & insights");
    tracing::info!("  GET  /api/projections    - Wealth & fee projections");
    tracing::info!("  GET  /api/cashflow       - Income vs expenses");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_price_source(kind: PriceSourceKind) -> anyhow::Result<Arc<dyn PriceSource>> {
    let source: Arc<dyn PriceSource> = match kind {
        PriceSourceKind::CoinGecko => Arc::new(CoinGeckoPriceSource::from_env()?),
        PriceSourceKind::Ollama => Arc::new(LlmPriceSource::new(OllamaCompletion::from_env())),
        PriceSourceKind::Offline => Arc::new(OfflinePriceSource),
    };
    Ok(source)
}
