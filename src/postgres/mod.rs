// PostgreSQL backend - the canonical dialect runs natively here.
//
// Templates and parameters pass through unchanged; this module owns pool
// setup, parameter conversion, result extraction, and the query/execute
// split.
//
// - config: connection configuration and pool setup
// - params: parameter conversion between gateway and PostgreSQL types
// - query: result extraction and building
// - executor: statement dispatch

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use executor::{execute, execute_batch};
pub use params::Params;
pub use query::build_result_set_from_rows;
