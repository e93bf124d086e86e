use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use furrow_core::ServiceError;
use furrow_db::DbError;
use furrow_types::api::ErrorResponse;
use tracing::error;

/// Everything a handler can fail with, mapped onto a status code and a
/// `{"detail": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// The request body or query string could not be extracted.
    Rejected { status: StatusCode, detail: String },
    MissingAdminKey,
    BadAdminKey,
    Internal,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Service(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::Service(err) => {
                let status = match err {
                    ServiceError::Validation(_)
                    | ServiceError::Conflict(_)
                    | ServiceError::InvalidId(_) => StatusCode::BAD_REQUEST,
                    ServiceError::Auth => StatusCode::UNAUTHORIZED,
                    ServiceError::Forbidden => StatusCode::FORBIDDEN,
                    ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                    ServiceError::Store(e) => {
                        error!("store failure: {}", e);
                        return internal();
                    }
                };
                (status, err.to_string())
            }
            ApiError::Rejected { status, detail } => (*status, detail.clone()),
            ApiError::MissingAdminKey => (StatusCode::UNAUTHORIZED, "Admin key required".into()),
            ApiError::BadAdminKey => (StatusCode::FORBIDDEN, "Admin access denied".into()),
            ApiError::Internal => internal(),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
