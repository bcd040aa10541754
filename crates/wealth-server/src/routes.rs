//! Router

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    advisor_review, asset_groups, cash_flow, create_asset, create_budget, create_transaction, delete_asset,
    delete_budget, delete_transaction, get_preferences, health_check, list_assets, list_budgets, list_tags,
    list_transactions, portfolio_stats, projections, put_preferences, put_weights, strategic_profile, sync_prices,
    update_asset,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Portfolio
        .route("/api/assets", get(list_assets).post(create_asset))
        .route("/api/assets/groups", get(asset_groups))
        .route("/api/assets/{id}", put(update_asset).delete(delete_asset))
        .route("/api/tags", get(list_tags))
        .route("/api/sync", post(sync_prices))
        .route("/api/stats", get(portfolio_stats))

        // Analysis
        .route("/api/advisor", get(advisor_review))
        .route("/api/profile", get(strategic_profile))
        .route("/api/projections", get(projections))

        // Preferences
        .route("/api/preferences", get(get_preferences).put(put_preferences))
        .route("/api/preferences/weights", put(put_weights))

        // Cash flow
        .route("/api/transactions", get(list_transactions).post(create_transaction))
        .route("/api/transactions/{id}", delete(delete_transaction))
        .route("/api/budgets", get(list_budgets).post(create_budget))
        .route("/api/budgets/{id}", delete(delete_budget))
        .route("/api/cashflow", get(cash_flow))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wealth_engine::PriceReconciler;
    use wealth_engine::pricing::StaticPriceSource;
    use wealth_engine::store::MemoryPreferencesStore;

    use super::*;

    fn app(seed: bool) -> Router {
        let source = StaticPriceSource::new().with_quote("bitcoin", dec!(60000), dec!(1));
        let state = AppState::new(
            Arc::new(source),
            PriceReconciler::default(),
            Arc::new(MemoryPreferencesStore::new()),
            seed,
        );
        router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "tester");
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(false), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["priceSource"], "static");
    }

    #[tokio::test]
    async fn test_asset_crud() {
        let app = app(false);

        let (status, created) = send(
            &app,
            "POST",
            "/api/assets",
            Some(json!({"name": "Bitcoin", "category": "Crypto", "quantity": 2, "unitPrice": 50000})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, list) = send(&app, "GET", "/api/assets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/assets/{id}"),
            Some(json!({"name": "Bitcoin", "category": "Crypto", "quantity": 3, "unitPrice": 50000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["value"], "150000");

        let (status, _) = send(&app, "DELETE", &format!("/api/assets/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "DELETE", &format!("/api/assets/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ASSET_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_asset_is_rejected() {
        let (status, body) = send(
            &app(false),
            "POST",
            "/api/assets",
            Some(json!({"name": " ", "category": "Stocks", "quantity": 1, "unitPrice": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_sync_and_stats() {
        let app = app(false);
        send(
            &app,
            "POST",
            "/api/assets",
            Some(json!({"name": "Bitcoin", "category": "Crypto", "quantity": 1, "unitPrice": 50000})),
        )
        .await;

        let (status, report) = send(&app, "POST", "/api/sync", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["updated"], 1);

        let (_, stats) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(stats["totalNetWorth"], "60000");
        assert_eq!(stats["freedomGoal"], "1000000");
        // 50000 -> 60000 with a 1% quoted move
        assert_eq!(stats["performance"][0]["category"], "Crypto");
        assert_eq!(stats["performance"][0]["changePercentage"], "1.01");
    }

    #[tokio::test]
    async fn test_advisor_uses_stored_weights() {
        let app = app(true);

        let (status, _) = send(
            &app,
            "PUT",
            "/api/preferences/weights",
            Some(json!({"volatility": 0, "liquidity": 1, "resilience": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, review) = send(&app, "GET", "/api/advisor", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(review["scores"].as_object().unwrap().len(), 6);
        assert!(!review["insights"].as_array().unwrap().is_empty());

        let (status, body) = send(
            &app,
            "PUT",
            "/api/preferences/weights",
            Some(json!({"volatility": -1, "liquidity": 1, "resilience": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_WEIGHTS");
    }

    #[tokio::test]
    async fn test_projections_defaults() {
        let (status, body) = send(&app(false), "GET", "/api/projections?monthlySavings=100&targetApy=0&years=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wealth"][2]["wealth"], "2400");
        assert_eq!(body["feeDrag"]["points"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_projection_inputs_are_bounded() {
        let app = app(false);
        for uri in [
            "/api/projections?targetApy=100000",
            "/api/projections?monthlySavings=-1",
            "/api/projections?years=101",
        ] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "INVALID_INPUT");
        }

        // In range but beyond what a Decimal can hold
        let (status, _) = send(&app, "GET", "/api/projections?targetApy=100&years=100", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cash_flow_and_budgets() {
        let app = app(false);
        send(
            &app,
            "POST",
            "/api/transactions",
            Some(json!({"label": "Salary", "amount": 3000, "type": "Income"})),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/transactions",
            Some(json!({"label": "Groceries", "amount": 200, "type": "Expense", "category": "Food"})),
        )
        .await;
        let (status, _) = send(&app, "POST", "/api/budgets", Some(json!({"category": "Food", "limit": 400}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, summary) = send(&app, "GET", "/api/cashflow", None).await;
        assert_eq!(summary["net"], "2800");

        let (_, budgets) = send(&app, "GET", "/api/budgets", None).await;
        assert_eq!(budgets[0]["spent"], "200");
    }

    #[tokio::test]
    async fn test_workspaces_per_user() {
        let app = app(true);
        let (_, mine) = send(&app, "GET", "/api/assets", None).await;
        assert_eq!(mine.as_array().unwrap().len(), 6);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/assets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        send(&app, "DELETE", &format!("/api/assets/{}", mine[0]["id"].as_str().unwrap()), None).await;
        let (_, tags) = send(&app, "GET", "/api/tags", None).await;
        assert!(!tags.as_array().unwrap().is_empty());
        let (_, mine) = send(&app, "GET", "/api/assets", None).await;
        assert_eq!(mine.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_workspace_limit() {
        let state = AppState::new(
            Arc::new(StaticPriceSource::new()),
            PriceReconciler::default(),
            Arc::new(MemoryPreferencesStore::new()),
            false,
        )
        .with_max_workspaces(1);
        let app = router(state);

        let (status, _) = send(&app, "GET", "/api/assets", None).await;
        assert_eq!(status, StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/assets")
                    .header("x-user-id", "someone-else")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        // Existing users keep access
        let (status, _) = send(&app, "GET", "/api/assets", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
