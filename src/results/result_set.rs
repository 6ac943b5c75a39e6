use super::row::Row;
use crate::types::RowValues;

/// A result set from a gateway call.
///
/// The shape is backend-independent: `rows` holds the returned rows (empty
/// for plain writes) and `rows_affected` is the row count for reads or the
/// affected-row count for writes. Callers never branch on backend type.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub rows: Vec<Row>,
    /// Row count for reads; affected-row count for DML statements
    pub rows_affected: usize,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<std::sync::Arc<Vec<String>>>,
    /// Name-to-index cache shared by all rows of this set
    column_index_cache: Option<std::sync::Arc<std::collections::HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known row capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index_cache: None,
        }
    }

    /// An empty result set reporting only an affected-row count (plain writes
    /// and the emulated `UPDATE`/`DELETE ... RETURNING *` gap).
    #[must_use]
    pub fn affected(rows_affected: usize) -> ResultSet {
        ResultSet {
            rows_affected,
            ..ResultSet::default()
        }
    }

    /// Set the column names for this result set (to be shared by all rows).
    pub fn set_column_names(&mut self, column_names: std::sync::Arc<Vec<String>>) {
        let cache = std::sync::Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<std::collections::HashMap<_, _>>(),
        );
        self.column_names = Some(column_names);
        self.column_index_cache = Some(cache);
    }

    /// Get the column names for this result set.
    #[must_use]
    pub fn get_column_names(&self) -> Option<&std::sync::Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set, sharing the set-level column names and
    /// lookup cache. Ignored if column names have not been set.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let (Some(column_names), Some(cache)) = (&self.column_names, &self.column_index_cache) {
            let row = Row {
                column_names: column_names.clone(),
                values: row_values,
                column_index_cache: cache.clone(),
            };

            self.rows.push(row);
            self.rows_affected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_names_and_report_count() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(std::sync::Arc::new(vec!["id".into(), "name".into()]));
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("a".into())]);
        rs.add_row_values(vec![RowValues::Int(2), RowValues::Text("b".into())]);

        assert_eq!(rs.rows_affected, 2);
        assert_eq!(rs.rows[0].get("name").unwrap().as_text(), Some("a"));
        assert_eq!(*rs.rows[1].get("id").unwrap().as_int().unwrap(), 2);
        assert!(rs.rows[1].get("missing").is_none());
    }

    #[test]
    fn affected_carries_no_rows() {
        let rs = ResultSet::affected(3);
        assert!(rs.rows.is_empty());
        assert_eq!(rs.rows_affected, 3);
    }
}
