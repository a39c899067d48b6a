//! HTTP request handlers.

use super::AppState;

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

/// GET /api/status - grouped link health, cached for the configured window.
pub async fn handle_link_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.link_status().await {
        Ok(grouped) => Json(grouped).into_response(),
        Err(e) => {
            tracing::error!("Link status unavailable: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PingRequest {
    pub ips: Vec<String>,
}

/// POST /api/ping - probe the requested addresses immediately.
///
/// A body that is not `{"ips": [string, ...]}`, or one with an empty list,
/// is rejected with a structured 400 payload.
pub async fn handle_on_demand_ping(
    State(state): State<AppState>,
    payload: Result<Json<PingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) if !req.ips.is_empty() => req,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid IP list" })),
            )
                .into_response();
        }
    };

    let results = state.service.on_demand_ping(&req.ips).await;
    Json(results).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{StatusCache, SystemClock};
    use crate::inventory::{InventoryError, InventorySource, Link};
    use crate::probe::{BulkProber, PingReply, Pinger, ProbeError};
    use crate::service::StatusService;

    use async_trait::async_trait;
    use axum::body::{self, Body};
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt; // for `oneshot`

    struct NoInventory;

    #[async_trait]
    impl InventorySource for NoInventory {
        async fn fetch(&self) -> Result<Vec<Link>, InventoryError> {
            Err(InventoryError::MissingSheetId)
        }
    }

    struct AlwaysUp;

    #[async_trait]
    impl Pinger for AlwaysUp {
        async fn ping(&self, _address: &str, _timeout: Duration) -> Result<PingReply, ProbeError> {
            Ok(PingReply { rtt_ms: Some(1.0) })
        }
    }

    fn app() -> Router {
        let prober = BulkProber::new(Arc::new(AlwaysUp), 50, Duration::from_secs(1));
        let cache = StatusCache::new(Duration::from_secs(60), Arc::new(SystemClock));
        let state = AppState {
            service: Arc::new(StatusService::new(Arc::new(NoInventory), prober, cache)),
        };

        Router::new()
            .route("/api/status", get(handle_link_status))
            .route("/api/ping", post(handle_on_demand_ping))
            .with_state(state)
    }

    fn ping_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ping")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_ip_list_is_rejected() {
        let response = app()
            .oneshot(ping_request(r#"{"ips": []}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Invalid IP list" }));
    }

    #[tokio::test]
    async fn test_non_list_payload_gets_structured_error() {
        let response = app()
            .oneshot(ping_request(r#"{"ips": "10.0.0.1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Invalid IP list" }));
    }

    #[tokio::test]
    async fn test_ping_answers_every_requested_address() {
        let response = app()
            .oneshot(ping_request(r#"{"ips": ["10.0.0.1", "10.0.0.2"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let results = body_json(response).await;
        assert_eq!(results["10.0.0.1"]["alive"], true);
        assert_eq!(results["10.0.0.2"]["alive"], true);
    }

    #[tokio::test]
    async fn test_status_failure_with_empty_cache_is_internal_error() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Internal Server Error" })
        );
    }
}
