use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use furrow_core::AdminCapability;
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

/// Check the admin bearer key and hand the resulting capability to the
/// handler as a request extension.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingAdminKey)?;

    let capability = AdminCapability::verify(presented, &state.admin_key).ok_or_else(|| {
        warn!(path = %req.uri().path(), "admin key rejected");
        ApiError::BadAdminKey
    })?;

    req.extensions_mut().insert(capability);
    Ok(next.run(req).await)
}
