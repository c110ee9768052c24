//! Daily log input schema
//!
//! Parsing of log payloads exported by the client (JSON arrays or NDJSON) and
//! the entry validation applied before logs reach the store.

mod adapter;
mod validate;

pub use adapter::*;
pub use validate::*;
