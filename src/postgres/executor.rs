use deadpool_postgres::Pool;

use crate::error::SqlGatewayError;
use crate::results::ResultSet;
use crate::rewrite::StatementShape;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set_from_rows;

/// Execute a canonical-dialect statement on the Postgres pool, unchanged.
///
/// Row-returning shapes (`SELECT`/`WITH` and native `RETURNING *`
/// statements) go through `query`; plain writes go through `execute` so the
/// affected-row count is reported.
///
/// # Errors
///
/// Returns `SqlGatewayError` on pool checkout or execution failure; execution
/// errors carry the original template.
pub async fn execute(
    pool: &Pool,
    sql: &str,
    params: &[RowValues],
    shape: &StatementShape,
) -> Result<ResultSet, SqlGatewayError> {
    let client = pool
        .get()
        .await
        .map_err(SqlGatewayError::PoolErrorPostgres)?;
    let converted = Params::convert(params)?;

    if shape.returns_rows() {
        let rows = client
            .query(sql, converted.as_refs())
            .await
            .map_err(|e| SqlGatewayError::execution(sql, e))?;
        build_result_set_from_rows(&rows)
    } else {
        let affected = client
            .execute(sql, converted.as_refs())
            .await
            .map_err(|e| SqlGatewayError::execution(sql, e))?;
        let affected = usize::try_from(affected).map_err(|e| {
            SqlGatewayError::execution(sql, format!("affected rows conversion error: {e}"))
        })?;
        Ok(ResultSet::affected(affected))
    }
}

/// Run a multi-statement script (DDL, seed data) without parameters.
///
/// # Errors
///
/// Returns `SqlGatewayError` on pool checkout or execution failure.
pub async fn execute_batch(pool: &Pool, script: &str) -> Result<(), SqlGatewayError> {
    let client = pool
        .get()
        .await
        .map_err(SqlGatewayError::PoolErrorPostgres)?;
    client
        .batch_execute(script)
        .await
        .map_err(|e| SqlGatewayError::execution(script, e))
}
