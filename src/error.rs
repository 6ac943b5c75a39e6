use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

/// Errors surfaced by the gateway.
///
/// Translation and execution variants carry the original SQL template so a
/// failure can be traced back to the call site that produced the statement.
#[derive(Debug, Error)]
pub enum SqlGatewayError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool::managed::PoolError<tokio_postgres::Error>),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool::managed::PoolError<rusqlite::Error>),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("Translation error in `{sql}`: {detail}")]
    TranslationError { sql: String, detail: String },

    #[error("Execution error in `{sql}`: {detail}")]
    ExecutionError { sql: String, detail: String },

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlGatewayError {
    /// Attach the original template to a translation failure.
    pub(crate) fn translation(sql: impl Into<String>, detail: impl Into<String>) -> Self {
        SqlGatewayError::TranslationError {
            sql: sql.into(),
            detail: detail.into(),
        }
    }

    /// Attach the original template to an execution failure.
    pub(crate) fn execution(sql: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        SqlGatewayError::ExecutionError {
            sql: sql.into(),
            detail: detail.to_string(),
        }
    }
}

/// Convert `InteractError` to a more specific `SqlGatewayError`
#[cfg(feature = "sqlite")]
impl From<deadpool_sqlite::InteractError> for SqlGatewayError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        SqlGatewayError::ConnectionError(format!("SQLite Interact Error: {err}"))
    }
}
