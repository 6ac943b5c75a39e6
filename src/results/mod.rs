// Uniform result shape returned by the gateway, identical on both backends.

pub mod result_set;
pub mod row;

pub use result_set::ResultSet;
pub use row::Row;
