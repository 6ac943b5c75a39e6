// SQLite backend - the embedded single-file engine.
//
// Statements arrive here already rewritten into the SQLite dialect; this
// module owns pool setup, parameter conversion, result extraction, and the
// shape-based dispatch (including RETURNING emulation).
//
// - config: pool creation and pragmas
// - params: parameter conversion between gateway and SQLite types
// - query: result extraction and building
// - executor: statement dispatch

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use executor::{execute, execute_batch};
pub use params::Params;
pub use query::build_result_set;
