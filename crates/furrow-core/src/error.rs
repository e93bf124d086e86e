use furrow_db::DbError;
use thiserror::Error;

/// Every way an account or messaging operation can fail. Callers match on
/// the variant; the message is what gets shown to the client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input (unknown role, bad email, empty content, ...).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password. Deliberately carries no detail.
    #[error("Invalid credentials")]
    Auth,

    #[error("Account is deactivated")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("store failure")]
    Store(#[source] DbError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => ServiceError::Conflict("Email already registered".into()),
            DbError::InvalidId(_) => ServiceError::InvalidId("Invalid id".into()),
            DbError::MissingReference => ServiceError::NotFound("User not found".into()),
            other => ServiceError::Store(other),
        }
    }
}
