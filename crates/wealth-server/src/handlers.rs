//! HTTP Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use wealth_engine::cashflow::{Budget, CashFlowSummary, NewBudget, NewTransaction, Transaction, summarize};
use wealth_engine::portfolio::{
    available_tags, category_exposure, category_performance, category_share, goal_progress, group_by_category,
};
use wealth_engine::profile::StrategicProfile;
use wealth_engine::projection::{FeeDrag, ProjectionPoint, fee_drag, project_wealth};
use wealth_engine::{
    AdvisorReport, Asset, AssetCategory, AssetPatch, EngineError, HealthWeights, NewAsset, PortfolioStats, Preferences,
    SyncReport, aggregate,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub price_source: String,
    pub price_source_healthy: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryExposure {
    pub category: AssetCategory,
    pub value: Decimal,
    pub share: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub category: AssetCategory,
    /// 24h change in percent, two decimals
    pub change_percentage: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: PortfolioStats,
    pub exposure: Vec<CategoryExposure>,
    pub performance: Vec<CategoryPerformance>,
    pub freedom_goal: Decimal,
    pub goal_progress: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorResponse {
    #[serde(flatten)]
    pub report: AdvisorReport,
    pub average_score: Option<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroup {
    pub category: AssetCategory,
    pub total: Decimal,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub wealth: Vec<ProjectionPoint>,
    pub fee_drag: FeeDrag,
}

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionQuery {
    pub monthly_savings: Option<Decimal>,
    pub target_apy: Option<Decimal>,
    pub years: Option<u32>,
}

// ============================================================================
// Extractors & Errors
// ============================================================================

/// Caller identity from the `x-user-id` header, `"default"` when absent
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("default");
        Ok(Self(user.to_string()))
    }
}

/// Map an engine error to a status code and JSON body
pub fn api_error(err: &EngineError) -> ApiError {
    let (status, code) = match err {
        EngineError::AssetNotFound(_) => (StatusCode::NOT_FOUND, "ASSET_NOT_FOUND"),
        EngineError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        EngineError::InvalidAsset(_) | EngineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        EngineError::InvalidWeights(_) => (StatusCode::BAD_REQUEST, "INVALID_WEIGHTS"),
        EngineError::UnknownCategory(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_CATEGORY"),
        EngineError::SyncInProgress => (StatusCode::CONFLICT, "SYNC_IN_PROGRESS"),
        EngineError::CapacityExceeded(_) => (StatusCode::SERVICE_UNAVAILABLE, "CAPACITY_EXCEEDED"),
        EngineError::PriceSourceUnavailable(_) | EngineError::Network(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "PRICE_SOURCE_UNAVAILABLE")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: code.into(),
        }),
    )
}

fn engine(err: EngineError) -> ApiError {
    api_error(&err)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        price_source: state.source.name().to_string(),
        price_source_healthy: state.source.health_check().await,
    })
}

/// List assets, newest first, optionally filtered by tag
pub async fn list_assets(
    State(state): State<AppState>,
    UserId(user): UserId,
    Query(query): Query<TagQuery>,
) -> ApiResult<Vec<Asset>> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let mut assets = workspace.assets.list().await.map_err(engine)?;
    if let Some(tag) = query.tag.as_deref() {
        assets.retain(|a| a.has_tag(tag));
    }
    Ok(Json(assets))
}

pub async fn create_asset(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(draft): Json<NewAsset>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let asset = workspace.assets.insert(draft).await.map_err(engine)?;

    tracing::info!("Asset '{}' added for '{}'", asset.name, user);
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Replace the editable fields of an asset
pub async fn update_asset(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
    Json(draft): Json<NewAsset>,
) -> ApiResult<Asset> {
    draft.validate().map_err(engine)?;
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let asset = workspace
        .assets
        .update(&id, AssetPatch::edit(&draft))
        .await
        .map_err(engine)?;
    Ok(Json(asset))
}

pub async fn delete_asset(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    workspace.assets.delete(&id).await.map_err(engine)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assets grouped by category, optionally filtered by tag
pub async fn asset_groups(
    State(state): State<AppState>,
    UserId(user): UserId,
    Query(query): Query<TagQuery>,
) -> ApiResult<Vec<AssetGroup>> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let assets = workspace.assets.list().await.map_err(engine)?;

    let groups = group_by_category(&assets, query.tag.as_deref())
        .into_iter()
        .map(|(category, members)| AssetGroup {
            category,
            total: members.iter().map(|a| a.value).sum(),
            assets: members.into_iter().cloned().collect(),
        })
        .collect();
    Ok(Json(groups))
}

pub async fn list_tags(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<Vec<String>> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let assets = workspace.assets.list().await.map_err(engine)?;
    Ok(Json(available_tags(&assets)))
}

/// Run a market sync for the caller's portfolio
pub async fn sync_prices(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<SyncReport> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let report = workspace.sync.sync().await.map_err(engine)?;
    Ok(Json(report))
}

pub async fn portfolio_stats(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<StatsResponse> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let assets = workspace.assets.list().await.map_err(engine)?;
    let preferences = state.preferences.get(&user).await.map_err(engine)?;

    let stats = aggregate(&assets);
    let exposure = category_exposure(&assets)
        .into_iter()
        .map(|(category, value)| CategoryExposure {
            category,
            value,
            share: category_share(&assets, category),
        })
        .collect();
    let performance = category_performance(&assets)
        .into_iter()
        .map(|(category, change_percentage)| CategoryPerformance {
            category,
            change_percentage,
        })
        .collect();

    Ok(Json(StatsResponse {
        goal_progress: goal_progress(stats.total_net_worth, preferences.freedom_goal),
        freedom_goal: preferences.freedom_goal,
        stats,
        exposure,
        performance,
    }))
}

/// Health scores and insights under the caller's weights
pub async fn advisor_review(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<AdvisorResponse> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let assets = workspace.assets.list().await.map_err(engine)?;
    let preferences = state.preferences.get(&user).await.map_err(engine)?;

    let report = state
        .advisor
        .review(&assets, &preferences.health_weights)
        .map_err(engine)?;

    Ok(Json(AdvisorResponse {
        average_score: report.average_score(&assets),
        report,
    }))
}

pub async fn strategic_profile(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<StrategicProfile> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let assets = workspace.assets.list().await.map_err(engine)?;
    Ok(Json(StrategicProfile::from_assets(&assets)))
}

const MAX_PROJECTION_YEARS: u32 = 100;
const MIN_TARGET_APY: Decimal = dec!(-100);
const MAX_TARGET_APY: Decimal = dec!(100);
const MAX_MONTHLY_SAVINGS: Decimal = dec!(1000000000);

/// Wealth projection from current net worth, plus the fee-drag comparison
pub async fn projections(
    State(state): State<AppState>,
    UserId(user): UserId,
    Query(query): Query<ProjectionQuery>,
) -> ApiResult<ProjectionResponse> {
    let years = query.years.unwrap_or(30);
    let monthly_savings = query.monthly_savings.unwrap_or(dec!(500));
    let target_apy = query.target_apy.unwrap_or(dec!(7));
    if years > MAX_PROJECTION_YEARS {
        return Err(engine(EngineError::InvalidInput("years must be at most 100".into())));
    }
    if !(MIN_TARGET_APY..=MAX_TARGET_APY).contains(&target_apy) {
        return Err(engine(EngineError::InvalidInput("targetApy must be between -100 and 100".into())));
    }
    if !(Decimal::ZERO..=MAX_MONTHLY_SAVINGS).contains(&monthly_savings) {
        return Err(engine(EngineError::InvalidInput(
            "monthlySavings must be between 0 and 1000000000".into(),
        )));
    }

    let workspace = state.workspace(&user).await.map_err(engine)?;
    let assets = workspace.assets.list().await.map_err(engine)?;
    let net_worth = aggregate(&assets).total_net_worth;

    Ok(Json(ProjectionResponse {
        wealth: project_wealth(net_worth, monthly_savings, target_apy, years).map_err(engine)?,
        fee_drag: fee_drag(&assets, years).map_err(engine)?,
    }))
}

pub async fn get_preferences(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<Preferences> {
    let preferences = state.preferences.get(&user).await.map_err(engine)?;
    Ok(Json(preferences))
}

pub async fn put_preferences(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(preferences): Json<Preferences>,
) -> ApiResult<Preferences> {
    let saved = state.preferences.set(&user, preferences).await.map_err(engine)?;
    Ok(Json(saved))
}

pub async fn put_weights(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(weights): Json<HealthWeights>,
) -> ApiResult<Preferences> {
    let saved = state.preferences.set_weights(&user, weights).await.map_err(engine)?;
    Ok(Json(saved))
}

pub async fn list_transactions(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<Vec<Transaction>> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let transactions = workspace.ledger.transactions().await.map_err(engine)?;
    Ok(Json(transactions))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(draft): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let transaction = workspace.ledger.add_transaction(draft).await.map_err(engine)?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    workspace.ledger.delete_transaction(&id).await.map_err(engine)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cash_flow(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<CashFlowSummary> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let transactions = workspace.ledger.transactions().await.map_err(engine)?;
    Ok(Json(summarize(&transactions)))
}

pub async fn list_budgets(State(state): State<AppState>, UserId(user): UserId) -> ApiResult<Vec<Budget>> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let budgets = workspace.ledger.budgets().await.map_err(engine)?;
    Ok(Json(budgets))
}

pub async fn create_budget(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(draft): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    let budget = workspace.ledger.add_budget(draft).await.map_err(engine)?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace(&user).await.map_err(engine)?;
    workspace.ledger.delete_budget(&id).await.map_err(engine)?;
    Ok(StatusCode::NO_CONTENT)
}
