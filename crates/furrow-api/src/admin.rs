use axum::{Extension, Json, extract::State};

use furrow_core::AdminCapability;
use furrow_types::api::{AccountsResponse, StatusResponse, ToggleActiveRequest};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::{AppState, run_blocking};

pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<AccountsResponse>, ApiError> {
    let accounts = state.accounts.clone();
    let accounts = run_blocking(move || accounts.list_accounts()).await?;

    Ok(Json(AccountsResponse { accounts }))
}

pub async fn toggle_active(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    ApiJson(req): ApiJson<ToggleActiveRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let accounts = state.accounts.clone();
    run_blocking(move || accounts.toggle_active(&admin, &req.account_id, req.active)).await?;

    Ok(Json(StatusResponse {
        message: "Status updated".into(),
    }))
}
