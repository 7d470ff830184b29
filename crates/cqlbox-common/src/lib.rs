//! cqlbox Common Library
//!
//! Shared error handling and logging for the cqlbox workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the harness-wide error taxonomy and result alias
//! - **Logging**: `tracing`-based logging configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use cqlbox_common::{CqlboxError, Result};
//!
//! fn load(id: &str) -> Result<String> {
//!     std::fs::read_to_string(id).map_err(|source| CqlboxError::ResourceRead {
//!         id: id.to_string(),
//!         source,
//!     })
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CqlboxError, Result};
