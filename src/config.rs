use crate::error::SqlGatewayError;
use crate::types::DatabaseType;

/// Backend selection, fixed once at gateway construction.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Embedded SQLite database at the given file path.
    #[cfg(feature = "sqlite")]
    Sqlite { db_path: String },
    /// PostgreSQL server, via a deadpool-postgres configuration.
    #[cfg(feature = "postgres")]
    Postgres(deadpool_postgres::Config),
}

/// Gateway configuration. The backend is the only configuration surface:
/// it is chosen once at startup and immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub backend: BackendConfig,
}

impl GatewayConfig {
    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite(db_path: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig::Sqlite {
                db_path: db_path.into(),
            },
        }
    }

    #[cfg(feature = "postgres")]
    #[must_use]
    pub fn postgres(pg_config: deadpool_postgres::Config) -> Self {
        Self {
            backend: BackendConfig::Postgres(pg_config),
        }
    }

    /// Read the backend selection from the environment.
    ///
    /// `DB_TYPE` selects `sqlite` (default) or `postgres`; `DATABASE_URL` is
    /// the SQLite file path or the PostgreSQL connection URL respectively.
    ///
    /// # Errors
    ///
    /// Returns `SqlGatewayError::ConfigError` for an unknown `DB_TYPE` or a
    /// missing `DATABASE_URL` when PostgreSQL is selected.
    pub fn from_env() -> Result<Self, SqlGatewayError> {
        let db_type = std::env::var("DB_TYPE").ok();
        let database_url = std::env::var("DATABASE_URL").ok();
        Self::resolve(db_type.as_deref(), database_url.as_deref())
    }

    /// Resolve a configuration from the raw `DB_TYPE` / `DATABASE_URL`
    /// values. Split out of [`from_env`](Self::from_env) so it can be tested
    /// without touching process environment.
    pub(crate) fn resolve(
        db_type: Option<&str>,
        database_url: Option<&str>,
    ) -> Result<Self, SqlGatewayError> {
        match db_type.unwrap_or("sqlite") {
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(Self::sqlite(
                database_url.unwrap_or("./data/menu_app.db"),
            )),
            #[cfg(feature = "postgres")]
            "postgres" => {
                let url = database_url.ok_or_else(|| {
                    SqlGatewayError::ConfigError(
                        "DATABASE_URL is required when DB_TYPE=postgres".to_string(),
                    )
                })?;
                let mut cfg = deadpool_postgres::Config::new();
                cfg.url = Some(url.to_string());
                Ok(Self::postgres(cfg))
            }
            other => Err(SqlGatewayError::ConfigError(format!(
                "unknown DB_TYPE `{other}` (expected sqlite or postgres)"
            ))),
        }
    }

    /// The backend type this configuration selects.
    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        match &self.backend {
            #[cfg(feature = "sqlite")]
            BackendConfig::Sqlite { .. } => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            BackendConfig::Postgres(_) => DatabaseType::Postgres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "sqlite")]
    fn defaults_to_sqlite() {
        let cfg = GatewayConfig::resolve(None, None).unwrap();
        assert_eq!(cfg.db_type(), DatabaseType::Sqlite);

        let cfg = GatewayConfig::resolve(Some("sqlite"), Some("/tmp/x.db")).unwrap();
        assert!(matches!(
            cfg.backend,
            BackendConfig::Sqlite { ref db_path } if db_path == "/tmp/x.db"
        ));
    }

    #[test]
    #[cfg(feature = "postgres")]
    fn postgres_requires_a_url() {
        assert!(GatewayConfig::resolve(Some("postgres"), None).is_err());

        let cfg = GatewayConfig::resolve(
            Some("postgres"),
            Some("postgres://user:pw@localhost/menu_app"),
        )
        .unwrap();
        assert_eq!(cfg.db_type(), DatabaseType::Postgres);
    }

    #[test]
    fn unknown_db_type_is_rejected() {
        assert!(GatewayConfig::resolve(Some("mysql"), None).is_err());
    }
}
