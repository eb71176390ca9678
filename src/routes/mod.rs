use anyhow::Context;
use axum::{
    body::Body,
    extract::{Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AuthManager, TokenState};
use crate::config::Config;
use crate::error::ApiError;

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed path of the upstream slot-search operation.
const FIND_SLOT_PATH: &str = "/scheduler/api/v1.0/appointments/find-slot";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthManager>,
    pub http: Client,
}

/// Health check routes (no authentication required)
pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Relay API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/token", get(token_handler))
        .route("/api/find-slot", get(find_slot_handler))
        .with_state(state)
}

/// GET / - Simple status check
///
/// Returns basic status and version information.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "cs-relay",
        "version": VERSION
    }))
}

/// GET /health - Health check
///
/// Returns liveness and the current server time (for load balancers).
async fn health_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "time": Utc::now().to_rfc3339()
    }))
}

/// GET /api/token - Diagnostic token fetch
///
/// Returns the current access token and its expiry, refreshing it through
/// the same cache the relay uses.
async fn token_handler(State(state): State<AppState>) -> Result<Json<TokenState>, ApiError> {
    let token = state.auth.token_state().await?;
    Ok(Json(token))
}

/// Required query parameters for the slot search
#[derive(Debug, Deserialize)]
pub struct FindSlotParams {
    #[serde(rename = "fromDate")]
    pub from_date: Option<String>,
    #[serde(rename = "locationId")]
    pub location_id: Option<String>,
    #[serde(rename = "providerId")]
    pub provider_id: Option<String>,
    #[serde(rename = "productionTypeId")]
    pub production_type_id: Option<String>,
}

impl FindSlotParams {
    /// Collect the parameters in upstream order, rejecting any that is
    /// missing or empty before upstream traffic is generated.
    fn into_query(self) -> Result<Vec<(&'static str, String)>, ApiError> {
        let fields = [
            ("fromDate", self.from_date),
            ("locationId", self.location_id),
            ("providerId", self.provider_id),
            ("productionTypeId", self.production_type_id),
        ];

        let mut query = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            match value {
                Some(value) if !value.is_empty() => query.push((name, value)),
                _ => {
                    return Err(ApiError::BadRequest(format!(
                        "missing required query parameter: {name}"
                    )))
                }
            }
        }
        Ok(query)
    }
}

/// GET /api/find-slot - Relay a slot search to the scheduling API
///
/// Validates the query parameters, attaches a bearer token from the cache,
/// issues a single upstream GET and relays the upstream status, content type
/// and body back unchanged.
async fn find_slot_handler(
    State(state): State<AppState>,
    Query(params): Query<FindSlotParams>,
) -> Result<Response, ApiError> {
    let query = params.into_query()?;

    let token = state.auth.get_access_token().await?;

    let url = format!(
        "{}{}",
        state.config.base_url.trim_end_matches('/'),
        FIND_SLOT_PATH
    );

    tracing::debug!(url = %url, "relaying find-slot request");

    let upstream = state
        .http
        .get(&url)
        .query(&query)
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", "application/json")
        .send()
        .await
        .context("failed to reach the scheduling API")?;

    let status = upstream.status().as_u16();
    let content_type = upstream
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let body = upstream
        .bytes()
        .await
        .context("failed to read the scheduling API response")?;

    tracing::info!(status, bytes = body.len(), "relayed find-slot response");

    let response = Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .context("failed to build relay response")?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn params(
        from_date: Option<&str>,
        location_id: Option<&str>,
        provider_id: Option<&str>,
        production_type_id: Option<&str>,
    ) -> FindSlotParams {
        FindSlotParams {
            from_date: from_date.map(String::from),
            location_id: location_id.map(String::from),
            provider_id: provider_id.map(String::from),
            production_type_id: production_type_id.map(String::from),
        }
    }

    #[test]
    fn test_into_query_preserves_parameter_order() {
        let query = params(Some("2026-08-07"), Some("12"), Some("7"), Some("3"))
            .into_query()
            .unwrap();
        assert_eq!(
            query,
            vec![
                ("fromDate", "2026-08-07".to_string()),
                ("locationId", "12".to_string()),
                ("providerId", "7".to_string()),
                ("productionTypeId", "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_into_query_rejects_missing_parameter() {
        let err = params(Some("2026-08-07"), Some("12"), None, Some("3"))
            .into_query()
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("providerId")));
    }

    #[test]
    fn test_into_query_rejects_empty_parameter() {
        let err = params(Some(""), Some("12"), Some("7"), Some("3"))
            .into_query()
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("fromDate")));
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = health_routes();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["service"], "cs-relay");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = health_routes();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], true);
        // RFC 3339 timestamp
        let time = body["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
    }
}
