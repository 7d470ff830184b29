//! Containerized Apache Cassandra for integration testing
//!
//! Spins up a Cassandra container, optionally replaces its configuration
//! directory with a local override before the process starts, and optionally
//! applies a CQL init script once the node answers queries. Container
//! lifecycle is delegated to `testcontainers`; CQL execution is delegated to
//! the `scylla` driver.
//!
//! # Example
//!
//! ```no_run
//! use cqlbox_cassandra::{CassandraConfig, CassandraContainer};
//!
//! #[tokio::main]
//! async fn main() -> cqlbox_common::Result<()> {
//!     let cassandra = CassandraContainer::start_with_config(
//!         CassandraConfig::default().with_init_script("initial.cql"),
//!     )
//!     .await?;
//!
//!     let session = cassandra.session();
//!     session
//!         .query_unpaged("SELECT release_version FROM system.local", ())
//!         .await
//!         .expect("query failed");
//!     Ok(())
//! }
//! ```
//!
//! Override and script identifiers are resolved against the loader's resource
//! roots (`tests/resources` and `testdata` by default), mirroring how a test
//! keeps its fixtures next to the test code.

pub mod config;
pub mod config_override;
pub mod container;
pub mod delegate;
pub mod resource;
pub mod script;
pub mod wait;

pub use config::{
    CassandraConfig, CONTAINER_CONFIG_DIR, CQL_PORT, DEFAULT_IMAGE, DEFAULT_TAG, PASSWORD,
    USERNAME,
};
pub use config_override::{resolve_config_override, ConfigMount};
pub use container::CassandraContainer;
pub use delegate::{CqlDelegate, SessionDelegate};
pub use resource::{DirResourceLoader, ResourceLoader};
pub use script::{split_statements, InitScriptApplier};
pub use wait::CqlWaitStrategy;
