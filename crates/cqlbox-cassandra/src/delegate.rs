//! Database command delegate
//!
//! The narrow capability used to submit statements to the running instance.
//! [`SessionDelegate`] is the production implementation over a live driver
//! session; tests substitute their own implementations.

use async_trait::async_trait;
use cqlbox_common::{CqlboxError, Result};
use scylla::client::session::Session;
use std::sync::Arc;

/// Capability to execute a single statement against a running instance
#[async_trait]
pub trait CqlDelegate: Send + Sync {
    /// Submit one statement. A rejection fails the whole calling sequence.
    async fn execute(&self, statement: &str) -> Result<()>;
}

/// Delegate bound to a live `scylla` session
#[derive(Clone)]
pub struct SessionDelegate {
    session: Arc<Session>,
}

impl SessionDelegate {
    /// Bind a delegate to a ready session
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl std::fmt::Debug for SessionDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDelegate").finish_non_exhaustive()
    }
}

#[async_trait]
impl CqlDelegate for SessionDelegate {
    async fn execute(&self, statement: &str) -> Result<()> {
        self.session
            .query_unpaged(statement, ())
            .await
            .map(|_| ())
            .map_err(|err| CqlboxError::Statement(err.to_string()))
    }
}
