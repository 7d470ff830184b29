//! CQL readiness polling
//!
//! The container reporting "started" is not the same as the node accepting
//! queries. [`CqlWaitStrategy`] gates the post-start phase: it repeatedly
//! builds a driver session and issues a trivial query until the node answers
//! or the deadline passes. The session that succeeded is handed back so the
//! init script targets a connection that is known to be live.

use cqlbox_common::{CqlboxError, Result};
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const PROBE_QUERY: &str = "SELECT release_version FROM system.local";

/// Polls a CQL endpoint until it answers a trivial query
#[derive(Debug, Clone)]
pub struct CqlWaitStrategy {
    timeout: Duration,
    poll_interval: Duration,
}

impl CqlWaitStrategy {
    /// Create a strategy with the given deadline and poll interval
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Block until the endpoint is ready, returning the probing session.
    pub async fn wait_until_ready(&self, host: &str, port: u16) -> Result<Session> {
        let node = format!("{host}:{port}");
        let deadline = Instant::now() + self.timeout;
        let mut last_error = String::from("no probe attempted");

        loop {
            match Self::probe(&node).await {
                Ok(session) => {
                    info!(node = %node, "CQL endpoint ready");
                    return Ok(session);
                }
                Err(err) => {
                    debug!(node = %node, error = %err, "CQL endpoint not ready yet");
                    last_error = err;
                }
            }

            if Instant::now() >= deadline {
                return Err(CqlboxError::NotReady(format!("{node}: {last_error}")));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn probe(node: &str) -> std::result::Result<Session, String> {
        let session = SessionBuilder::new()
            .known_node(node)
            .connection_timeout(Duration::from_secs(5))
            .build()
            .await
            .map_err(|err| err.to_string())?;

        session
            .query_unpaged(PROBE_QUERY, ())
            .await
            .map_err(|err| err.to_string())?;

        Ok(session)
    }
}

impl Default for CqlWaitStrategy {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(1))
    }
}
