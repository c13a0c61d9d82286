//! Typed errors for configuration loading and database access.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("section '{section}' not found in config file {path}")]
    SectionNotFound { section: String, path: String },
    #[error("section '{section}' is missing required key '{key}'")]
    MissingKey { section: String, key: &'static str },
    #[error("unknown database type '{0}'")]
    UnknownDatabaseType(String),
    #[error("invalid boolean for '{key}': '{value}'")]
    InvalidBool { key: String, value: String },
    #[error("config load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Engine construction failed (bad URL, unsupported scheme, driver unavailable).
    #[error("database engine initialization failed: {0}")]
    Initialization(#[source] sqlx::Error),
    /// Liveness check failed.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    /// Argument of the wrong kind: unknown table, unknown column, mistyped value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Argument of the right kind but an unusable value, such as an empty update set.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Unique, foreign key, not-null or check constraint violated at flush or commit.
    #[error("integrity violation: {0}")]
    Integrity(#[source] sqlx::Error),
    #[error("session scope is not reentrant")]
    NestedSession,
    #[error("row decode: {0}")]
    Decode(String),
    #[error("database: {0}")]
    Db(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, DbError::Integrity(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if is_constraint_violation(&err) {
            DbError::Integrity(err)
        } else {
            DbError::Db(err)
        }
    }
}

fn is_constraint_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
        ),
        _ => false,
    }
}
