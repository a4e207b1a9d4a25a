//! Authentication Middleware
//! Guards administrative routes with the bearer token gate

use crate::auth::token_gate::{BearerTokenGate, GateError};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Rejects requests without the configured admin bearer token.
pub async fn admin_token_middleware(
    State(gate): State<Arc<BearerTokenGate>>,
    req: Request,
    next: Next,
) -> Result<Response, GateError> {
    // Non-ASCII header values count as absent.
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Err(e) = gate.check(auth_header) {
        warn!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = %e,
            "Admin request rejected"
        );
        return Err(e);
    }

    Ok(next.run(req).await)
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = match self {
            GateError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GateError::Forbidden => StatusCode::FORBIDDEN,
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
