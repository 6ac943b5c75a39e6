use deadpool_sqlite::rusqlite;

use crate::error::SqlGatewayError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> rusqlite::types::Value {
    match value {
        RowValues::Int(i) => rusqlite::types::Value::Integer(*i),
        RowValues::Float(f) => rusqlite::types::Value::Real(*f),
        RowValues::Text(s) => rusqlite::types::Value::Text(s.clone()),
        RowValues::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => {
            rusqlite::types::Value::Text(dt.format("%F %T%.f").to_string())
        }
        RowValues::Null => rusqlite::types::Value::Null,
        RowValues::JSON(jval) => rusqlite::types::Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}

/// Unified `SQLite` parameter container.
pub struct Params(pub Vec<rusqlite::types::Value>);

impl Params {
    /// Build the bind list for an anonymous-placeholder statement.
    ///
    /// `bind_order` holds one zero-based parameter index per `?` placeholder,
    /// in occurrence order; a repeated `$n` in the template shows up here as
    /// a repeated index, so its value is bound again at that slot.
    ///
    /// # Errors
    ///
    /// Returns `SqlGatewayError::ParameterError` if an index is out of range
    /// (the rewriter validates these, so this indicates a caller-constructed
    /// bind order).
    pub fn convert_ordered(
        params: &[RowValues],
        bind_order: &[usize],
    ) -> Result<Self, SqlGatewayError> {
        let mut vec_values = Vec::with_capacity(bind_order.len());
        for &idx in bind_order {
            let value = params.get(idx).ok_or_else(|| {
                SqlGatewayError::ParameterError(format!(
                    "bind slot {idx} out of range for {} parameter(s)",
                    params.len()
                ))
            })?;
            vec_values.push(row_value_to_sqlite_value(value));
        }
        Ok(Params(vec_values))
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[rusqlite::types::Value] {
        &self.0
    }
}
