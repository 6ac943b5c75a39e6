//! Dialect-translating query gateway.
//!
//! Call sites write SQL once, in a canonical PostgreSQL-flavored dialect with
//! `$1..$n` positional parameters. The [`Gateway`] runs each statement
//! against whichever backend was selected at startup - a PostgreSQL server
//! (pass-through) or an embedded SQLite database (after rewriting time
//! functions, `ON CONFLICT` spacing, placeholders, and emulating
//! `INSERT ... RETURNING *` via a follow-up read) - and always returns the
//! same `{rows, rows_affected}` result shape.
//!
//! Known capability gap, by contract: `UPDATE`/`DELETE ... RETURNING *` on
//! SQLite returns an empty row set with the affected count, where PostgreSQL
//! returns the modified rows.

pub mod config;
pub mod error;
pub mod gateway;
pub mod results;
pub mod rewrite;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{BackendConfig, GatewayConfig};
pub use error::SqlGatewayError;
pub use gateway::{Gateway, GatewayPool, QueryGateway};
pub use results::{ResultSet, Row};
pub use rewrite::{RewrittenQuery, StatementShape};
pub use types::{DatabaseType, QueryAndParams, RowValues};
