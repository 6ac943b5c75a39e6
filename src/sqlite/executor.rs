use deadpool_sqlite::Pool;
use deadpool_sqlite::rusqlite::{self, ToSql, types::Value};

use crate::error::SqlGatewayError;
use crate::results::ResultSet;
use crate::rewrite::{RewrittenQuery, StatementShape};

use super::query::build_result_set;

/// Execute a rewritten statement on the SQLite pool.
///
/// `template` is the caller's original canonical-dialect SQL; it is attached
/// to execution errors so failures point back at the call site's statement,
/// not the rewritten form.
///
/// # Errors
///
/// Returns `SqlGatewayError` on pool checkout or execution failure. A
/// follow-up read that finds nothing during RETURNING emulation is an empty
/// result, not an error (the write already committed).
pub async fn execute(
    pool: &Pool,
    template: &str,
    query: RewrittenQuery,
    params: Vec<Value>,
) -> Result<ResultSet, SqlGatewayError> {
    let conn = super::config::acquire(pool).await?;

    let template = template.to_owned();
    conn.interact(move |conn| run_rewritten(conn, &template, &query, &params))
        .await?
}

/// Run a multi-statement script (DDL, seed data) without parameters.
///
/// # Errors
///
/// Returns `SqlGatewayError` on pool checkout or execution failure.
pub async fn execute_batch(pool: &Pool, script: &str) -> Result<(), SqlGatewayError> {
    let conn = super::config::acquire(pool).await?;

    let script = script.to_owned();
    conn.interact(move |conn| {
        conn.execute_batch(&script)
            .map_err(|e| SqlGatewayError::execution(&script, e))
    })
    .await?
}

/// Shape-based dispatch, run on the pooled connection. The whole of an
/// `INSERT ... RETURNING *` emulation (write, `last_insert_rowid()`,
/// follow-up read) happens on one connection so the rowid cannot be clobbered
/// by a neighboring call.
fn run_rewritten(
    conn: &rusqlite::Connection,
    template: &str,
    query: &RewrittenQuery,
    params: &[Value],
) -> Result<ResultSet, SqlGatewayError> {
    match &query.shape {
        StatementShape::Select => {
            let mut stmt = conn
                .prepare(&query.sql)
                .map_err(|e| SqlGatewayError::execution(template, e))?;
            build_result_set(&mut stmt, params)
                .map_err(|e| SqlGatewayError::execution(template, e))
        }
        StatementShape::InsertReturning { table } => {
            let changes = run_write(conn, template, &query.sql, params)?;
            if changes == 0 {
                // ON CONFLICT DO NOTHING skipped the insert; last_insert_rowid()
                // would still point at an older row.
                return Ok(ResultSet::affected(0));
            }

            let rowid = conn.last_insert_rowid();
            let follow_up = format!("SELECT * FROM {table} WHERE rowid = ?");
            let mut stmt = conn
                .prepare(&follow_up)
                .map_err(|e| SqlGatewayError::execution(template, e))?;
            let result_set = build_result_set(&mut stmt, &[Value::Integer(rowid)])
                .map_err(|e| SqlGatewayError::execution(template, e))?;

            if result_set.rows.is_empty() {
                Ok(ResultSet::affected(0))
            } else {
                Ok(result_set)
            }
        }
        // SQLite cannot return modified rows for UPDATE/DELETE through this
        // emulation; the documented gap is an empty row set with the count.
        StatementShape::UpdateOrDeleteReturning | StatementShape::PlainWrite => {
            let changes = run_write(conn, template, &query.sql, params)?;
            Ok(ResultSet::affected(changes))
        }
    }
}

fn run_write(
    conn: &rusqlite::Connection,
    template: &str,
    sql: &str,
    params: &[Value],
) -> Result<usize, SqlGatewayError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| SqlGatewayError::execution(template, e))?;
    stmt.execute(&param_refs[..])
        .map_err(|e| SqlGatewayError::execution(template, e))
}
