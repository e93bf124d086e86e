use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// The unique email index rejected an insert.
    #[error("email already registered: {0}")]
    Conflict(String),

    #[error("malformed identifier '{0}'")]
    InvalidId(String),

    /// A message referenced an account id that is not in the store.
    #[error("referenced account does not exist")]
    MissingReference,

    #[error("corrupt {table} row '{id}': {reason}")]
    Corrupt {
        table: &'static str,
        id: String,
        reason: String,
    },

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub(crate) fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
