//! Admin API Endpoints
//! Login, password rotation and credential status for the operator

use crate::api::{ApiError, ApiJson, AppState, FieldError};
use crate::auth::{
    credential::CredentialService,
    middleware::admin_token_middleware,
    models::{AdminHealthResponse, AuthResponse, ChangePasswordRequest, LoginRequest},
};
use crate::config::MIN_PASSWORD_LEN;
use crate::middleware::limit_attempts;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

/// Routes under `/api/admin`.
///
/// Password-checking routes share one per-IP attempt budget; everything
/// except login also requires the admin bearer token.
pub fn admin_router(state: AppState) -> Router {
    let gate = middleware::from_fn_with_state(state.gate.clone(), admin_token_middleware);
    let limiter = middleware::from_fn_with_state(state.attempt_limiter.clone(), limit_attempts);

    let login_routes = Router::new().route("/api/admin/login", post(login));

    let gated_password_routes = Router::new()
        .route("/api/admin/change-password", post(change_password))
        .route("/api/admin/verify-password", post(verify_password))
        .route_layer(gate.clone());

    let password_routes = login_routes
        .merge(gated_password_routes)
        .route_layer(limiter);

    let status_routes = Router::new()
        .route("/api/admin/info", get(admin_info))
        .route("/api/admin/health", get(admin_health))
        .route_layer(gate);

    password_routes.merge(status_routes).with_state(state)
}

/// Run credential work on the blocking pool; bcrypt is deliberately slow.
async fn with_credentials<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CredentialService) -> T + Send + 'static,
    T: Send + 'static,
{
    let service = state.credentials.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Credential task failed: {e}")))
}

fn validate_change_request(payload: &ChangePasswordRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if payload.current_password.is_empty() {
        errors.push(FieldError::new(
            "currentPassword",
            "Current password is required",
        ));
    }
    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "newPassword",
            "New password must be at least 6 characters long",
        ));
    }
    errors
}

/// Login endpoint - POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.password.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "password",
            "Password is required",
        )]));
    }

    let password = payload.password;
    let valid = with_credentials(&state, move |c| c.authenticate(&password)).await??;

    if !valid {
        warn!("❌ Failed admin login attempt");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    info!("✅ Admin login successful");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
    }))
}

/// Password change endpoint - POST /api/admin/change-password
pub async fn change_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let errors = validate_change_request(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let ChangePasswordRequest {
        current_password,
        new_password,
    } = payload;

    let outcome = with_credentials(&state, move |c| {
        c.change_password(&current_password, &new_password)
    })
    .await??;

    info!(at = %Utc::now().to_rfc3339(), "✅ Admin password change completed");
    Ok(Json(AuthResponse {
        success: true,
        message: outcome.message().to_string(),
    }))
}

/// Current-password pre-check - POST /api/admin/verify-password
pub async fn verify_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let password = payload.password;
    let valid =
        with_credentials(&state, move |c| c.validate_current_password(&password)).await??;

    Ok(Json(json!({ "valid": valid })))
}

/// Admin info - GET /api/admin/info
pub async fn admin_info(State(state): State<AppState>) -> Result<Response, ApiError> {
    let credential = with_credentials(&state, |c| c.admin_info()).await??;

    credential
        .map(|c| Json(c).into_response())
        .ok_or_else(|| ApiError::NotFound("Admin user not found".to_string()))
}

/// Admin credential health - GET /api/admin/health
pub async fn admin_health(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = with_credentials(&state, |c| c.admin_count()).await?;

    let response = match count {
        Ok(admin_users_count) => Json(AdminHealthResponse {
            status: "healthy",
            admin_users_count,
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            error!("Admin health check failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "error": "Database connection failed",
                })),
            )
                .into_response()
        }
    };

    Ok(response)
}
