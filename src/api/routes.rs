use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::AppState;
use crate::auth::admin_router;
use crate::content::content_router;
use crate::middleware::request_logging;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let health = Router::new()
        .route("/api/health", get(health_check))
        .with_state(state.clone());

    Router::new()
        .merge(health)
        .merge(admin_router(state.clone()))
        .merge(content_router(state))
        .fallback(route_not_found)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the portfolio frontend. Permissive when no origin is configured.
pub fn cors_layer(frontend_url: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = frontend_url else {
        return Ok(CorsLayer::permissive());
    };

    let origin = HeaderValue::from_str(origin.trim_end_matches('/'))
        .with_context(|| format!("Invalid FRONTEND_URL: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        environment: state.environment,
    })
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{json_body, memory_state, send, TEST_TOKEN};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(memory_state());

        let res = send(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "development");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(memory_state());

        let res = send(&app, Method::GET, "/api/nope", None, None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(res).await["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_admin_and_content_routes_are_mounted() {
        let app = create_router(memory_state());

        let res = send(&app, Method::GET, "/api/projects", None, None).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = send(&app, Method::GET, "/api/admin/health", Some(TEST_TOKEN), None).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_restricted_to_frontend() {
        let app = create_router(memory_state())
            .layer(cors_layer(Some("https://folio.example.com/")).unwrap());

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .header(header::ORIGIN, "https://folio.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://folio.example.com"
        );
    }

    #[test]
    fn test_cors_rejects_invalid_origin() {
        assert!(cors_layer(Some("bad\norigin")).is_err());
        assert!(cors_layer(None).is_ok());
    }
}
