use deadpool_postgres::{Config as PgConfig, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::error::SqlGatewayError;

/// Create the PostgreSQL pool for the gateway.
///
/// Accepts either a connection URL (`cfg.url`) or discrete fields; when no
/// URL is given, the fields the driver cannot default are validated up front
/// so misconfiguration fails at startup rather than on first use.
///
/// # Errors
///
/// Returns `SqlGatewayError::ConfigError` if required fields are missing or
/// `SqlGatewayError::ConnectionError` if pool creation fails.
pub(crate) fn create_pool(pg_config: PgConfig) -> Result<Pool, SqlGatewayError> {
    if pg_config.url.is_none() {
        if pg_config.dbname.is_none() {
            return Err(SqlGatewayError::ConfigError(
                "dbname is required".to_string(),
            ));
        }
        if pg_config.host.is_none() {
            return Err(SqlGatewayError::ConfigError(
                "host is required".to_string(),
            ));
        }
        if pg_config.user.is_none() {
            return Err(SqlGatewayError::ConfigError(
                "user is required".to_string(),
            ));
        }
    }

    pg_config
        .create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| {
            SqlGatewayError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
        })
}
