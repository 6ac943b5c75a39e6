use deadpool_sqlite::rusqlite::{self, Statement, ToSql, types::Value};

use crate::error::SqlGatewayError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlGatewayError::SqliteError` if the value cannot be read.
pub fn sqlite_extract_value(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> Result<RowValues, SqlGatewayError> {
    let value: Value = row.get(idx).map_err(SqlGatewayError::SqliteError)?;
    match value {
        Value::Null => Ok(RowValues::Null),
        Value::Integer(i) => Ok(RowValues::Int(i)),
        Value::Real(f) => Ok(RowValues::Float(f)),
        Value::Text(s) => Ok(RowValues::Text(s)),
        Value::Blob(b) => Ok(RowValues::Blob(b)),
    }
}

/// Run a prepared read and collect all matching rows into a `ResultSet`.
///
/// # Errors
///
/// Returns `SqlGatewayError::SqliteError` if query execution or value
/// extraction fails.
pub fn build_result_set(
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<ResultSet, SqlGatewayError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let column_count = column_names.len();

    let mut rows_iter = stmt.query(&param_refs[..])?;
    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(std::sync::Arc::new(column_names));

    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
