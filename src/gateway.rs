use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::{BackendConfig, GatewayConfig};
use crate::error::SqlGatewayError;
use crate::results::ResultSet;
use crate::rewrite;
use crate::types::{DatabaseType, RowValues};

/// The backend handle, selected once at construction and immutable for the
/// process lifetime.
#[derive(Clone)]
pub enum GatewayPool {
    #[cfg(feature = "postgres")]
    Postgres(deadpool_postgres::Pool),
    #[cfg(feature = "sqlite")]
    Sqlite(deadpool_sqlite::Pool),
}

impl std::fmt::Debug for GatewayPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => f.debug_tuple("Postgres").finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.debug_tuple("Sqlite").finish(),
        }
    }
}

/// The seam call sites are written against; lets tests substitute a double
/// for the real gateway.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Execute one canonical-dialect statement with positional parameters.
    async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlGatewayError>;

    /// Run a multi-statement script without parameters or rewriting.
    async fn execute_batch(&self, script: &str) -> Result<(), SqlGatewayError>;
}

/// Dialect-translating query gateway.
///
/// Constructed once at startup and passed to call sites; holds no query-level
/// state between calls. On PostgreSQL the canonical dialect runs natively; on
/// SQLite each statement is rewritten first (time functions, `RETURNING *`
/// emulation, `ON CONFLICT` normalization, `$n` placeholders).
///
/// ```no_run
/// # async fn demo() -> Result<(), sql_gateway::SqlGatewayError> {
/// use sql_gateway::{Gateway, QueryGateway, RowValues};
///
/// let gateway = Gateway::connect_sqlite("./data/menu_app.db").await?;
/// let result = gateway
///     .execute(
///         "SELECT * FROM weekly_menus WHERE store_id = $1 ORDER BY day_of_week ASC",
///         &[RowValues::Text("store-001".into())],
///     )
///     .await?;
/// println!("{} rows", result.rows_affected);
/// gateway.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Gateway {
    pool: GatewayPool,
    db_type: DatabaseType,
}

impl Gateway {
    /// Connect the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns `SqlGatewayError::ConfigError` or
    /// `SqlGatewayError::ConnectionError` if the backend cannot be
    /// constructed.
    pub async fn connect(config: GatewayConfig) -> Result<Self, SqlGatewayError> {
        let db_type = config.db_type();
        let pool = match config.backend {
            #[cfg(feature = "sqlite")]
            BackendConfig::Sqlite { db_path } => {
                GatewayPool::Sqlite(crate::sqlite::config::create_pool(&db_path).await?)
            }
            #[cfg(feature = "postgres")]
            BackendConfig::Postgres(pg_config) => {
                GatewayPool::Postgres(crate::postgres::config::create_pool(pg_config)?)
            }
        };
        Ok(Self { pool, db_type })
    }

    /// Connect to an embedded SQLite database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns `SqlGatewayError::ConnectionError` if pool creation fails.
    #[cfg(feature = "sqlite")]
    pub async fn connect_sqlite(db_path: &str) -> Result<Self, SqlGatewayError> {
        Self::connect(GatewayConfig::sqlite(db_path)).await
    }

    /// Connect to a PostgreSQL server.
    ///
    /// # Errors
    ///
    /// Returns `SqlGatewayError::ConfigError` or
    /// `SqlGatewayError::ConnectionError` if pool creation fails.
    #[cfg(feature = "postgres")]
    pub async fn connect_postgres(
        pg_config: deadpool_postgres::Config,
    ) -> Result<Self, SqlGatewayError> {
        Self::connect(GatewayConfig::postgres(pg_config)).await
    }

    /// The backend type behind this gateway.
    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Release the pooled connections. Call once at process shutdown, from
    /// async context. A gateway that is never closed must instead be dropped
    /// inside the runtime: pooled connections need a live runtime to shut
    /// down, and dropping them outside one panics.
    pub fn close(&self) {
        match &self.pool {
            #[cfg(feature = "postgres")]
            GatewayPool::Postgres(pool) => pool.close(),
            #[cfg(feature = "sqlite")]
            GatewayPool::Sqlite(pool) => pool.close(),
        }
    }
}

#[async_trait]
impl QueryGateway for Gateway {
    async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlGatewayError> {
        let result = match &self.pool {
            #[cfg(feature = "postgres")]
            GatewayPool::Postgres(pool) => {
                let shape = rewrite::classify(sql)?;
                debug!(backend = "postgres", ?shape, "executing statement");
                crate::postgres::execute(pool, sql, params, &shape).await
            }
            #[cfg(feature = "sqlite")]
            GatewayPool::Sqlite(pool) => {
                let rewritten = rewrite::rewrite_for_sqlite(sql, params.len())?;
                debug!(
                    backend = "sqlite",
                    shape = ?rewritten.shape,
                    "executing rewritten statement"
                );
                let converted =
                    crate::sqlite::Params::convert_ordered(params, &rewritten.bind_order)?;
                crate::sqlite::execute(pool, sql, rewritten, converted.0).await
            }
        };

        if let Err(e) = &result {
            error!(error = %e, "gateway execute failed");
        }
        result
    }

    async fn execute_batch(&self, script: &str) -> Result<(), SqlGatewayError> {
        match &self.pool {
            #[cfg(feature = "postgres")]
            GatewayPool::Postgres(pool) => crate::postgres::execute_batch(pool, script).await,
            #[cfg(feature = "sqlite")]
            GatewayPool::Sqlite(pool) => crate::sqlite::execute_batch(pool, script).await,
        }
    }
}
