use axum::{Json, extract::State};
use tracing::warn;

use furrow_types::api::{HealthResponse, StatusResponse};

use crate::{AppState, run_blocking};

pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Farmer-Supplier Communication API".into(),
    })
}

/// Always 200; store problems are reported in the body.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = state.db.clone();
    let (database, tables) = match run_blocking(move || db.table_names()).await {
        Ok(tables) => ("connected".to_string(), tables),
        Err(e) => {
            warn!("health check failed: {:?}", e);
            ("error".to_string(), Vec::new())
        }
    };

    Json(HealthResponse {
        backend: "running".into(),
        database,
        tables,
    })
}
