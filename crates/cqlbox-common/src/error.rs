//! Error types for cqlbox
//!
//! One taxonomy for the whole harness. Script-related errors stay
//! distinguishable from infrastructure errors so callers can tell a broken
//! seed script apart from a container that never came up.

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, CqlboxError>;

/// Error type for the containerized-Cassandra harness
#[derive(Error, Debug)]
pub enum CqlboxError {
    /// A named override directory or init script is absent from the resource roots
    #[error("Resource not found: '{0}'. Check the loader's resource roots and the identifier spelling.")]
    ResourceNotFound(String),

    /// A located resource could not be read (I/O failure or invalid UTF-8)
    #[error("Failed to read resource '{id}': {source}")]
    ResourceRead {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// A single statement was rejected by the running instance
    #[error("Statement rejected by the database: {0}")]
    Statement(String),

    /// A statement within a resolved init script failed against the delegate
    #[error("Init script '{script}' failed at statement {index}: {source}")]
    ScriptExecution {
        script: String,
        index: usize,
        #[source]
        source: Box<CqlboxError>,
    },

    /// The CQL endpoint did not answer a trivial query before the deadline
    #[error("CQL endpoint did not become ready: {0}")]
    NotReady(String),

    /// The container runtime reported a failure
    #[error("Container runtime error: {0}")]
    Container(String),

    /// Terminal launch failure after exhausting the configured startup attempts
    #[error("Container failed to launch after {attempts} attempts: {source}")]
    Launch {
        attempts: u32,
        #[source]
        source: Box<CqlboxError>,
    },
}

impl CqlboxError {
    /// Whether the error identifies the init script or its resources rather
    /// than the container infrastructure.
    ///
    /// Script-category errors surface as-is from the startup sequence instead
    /// of being flattened into [`CqlboxError::Launch`].
    pub fn is_script_error(&self) -> bool {
        matches!(
            self,
            CqlboxError::ResourceNotFound(_)
                | CqlboxError::ResourceRead { .. }
                | CqlboxError::ScriptExecution { .. }
        )
    }
}
