use axum::extract::FromRequest;

use super::ApiError;

/// JSON body extractor whose rejections answer with the `{message}` error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
