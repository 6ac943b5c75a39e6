use deadpool_sqlite::{Config as DeadpoolSqliteConfig, Object, Pool, Runtime};

use crate::error::SqlGatewayError;

/// Create the SQLite pool for the gateway.
///
/// WAL journaling is applied once up front (it persists in the database
/// file), which also serves as a connection smoke test.
///
/// # Errors
///
/// Returns `SqlGatewayError::ConnectionError` if pool creation or the initial
/// pragma fails.
pub(crate) async fn create_pool(db_path: &str) -> Result<Pool, SqlGatewayError> {
    let cfg: DeadpoolSqliteConfig = DeadpoolSqliteConfig::new(db_path.to_string());

    let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
        SqlGatewayError::ConnectionError(format!("Failed to create SQLite pool: {e}"))
    })?;

    {
        let conn = acquire(&pool).await?;
        conn.interact(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL;")
                .map_err(SqlGatewayError::SqliteError)
        })
        .await??;
    }

    Ok(pool)
}

/// Check a connection out of the pool with foreign-key enforcement on.
///
/// `foreign_keys` is connection-local and deadpool creates connections
/// lazily, so the pragma is re-applied at every checkout rather than only on
/// the connection seen at pool creation.
///
/// # Errors
///
/// Returns `SqlGatewayError` on pool checkout or pragma failure.
pub(crate) async fn acquire(pool: &Pool) -> Result<Object, SqlGatewayError> {
    let conn = pool
        .get()
        .await
        .map_err(SqlGatewayError::PoolErrorSqlite)?;
    conn.interact(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(SqlGatewayError::SqliteError)
    })
    .await??;
    Ok(conn)
}
