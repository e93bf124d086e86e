use axum::{Json, extract::State};

use furrow_types::api::{CreatedResponse, LoginRequest, LoginResponse, RegisterRequest};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::{AppState, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let accounts = state.accounts.clone();
    let id = run_blocking(move || {
        accounts.register(&req.name, &req.email, &req.password, &req.role)
    })
    .await?;

    Ok(Json(CreatedResponse {
        message: "Registered successfully".into(),
        id,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let accounts = state.accounts.clone();
    let account = run_blocking(move || accounts.login(&req.email, &req.password)).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        account,
    }))
}
