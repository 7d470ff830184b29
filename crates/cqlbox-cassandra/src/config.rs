//! Harness configuration for the Cassandra container
//!
//! A [`CassandraConfig`] is built once, up front, and stays immutable for the
//! whole run. Optional fields default to "absent"; the `with_*` methods cover
//! the fluent-configuration surface.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Fixed Instance Constants
// ============================================================================

/// Native transport port the image listens on.
pub const CQL_PORT: u16 = 9042;

/// Default superuser name. The stock image runs AllowAllAuthenticator, so
/// these credentials only matter once an override enables PasswordAuthenticator.
pub const USERNAME: &str = "cassandra";

/// Default superuser password, see [`USERNAME`].
pub const PASSWORD: &str = "cassandra";

/// In-container configuration directory replaced by an override mount.
pub const CONTAINER_CONFIG_DIR: &str = "/etc/cassandra";

/// Default Docker image.
pub const DEFAULT_IMAGE: &str = "cassandra";

/// Default image tag.
pub const DEFAULT_TAG: &str = "5.0";

/// Environment variable overriding the default image tag.
pub const TAG_ENV_VAR: &str = "CQLBOX_CASSANDRA_TAG";

/// Configuration for a containerized Cassandra instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CassandraConfig {
    /// Docker image name (default: "cassandra")
    pub image: String,

    /// Docker image tag (default: "5.0")
    pub tag: String,

    /// Resource identifier of a directory that fully replaces
    /// `/etc/cassandra` before the process starts. Absent by default.
    pub config_override: Option<String>,

    /// Resource identifier of a CQL script applied once the node is ready.
    /// Absent by default.
    pub init_script: Option<String>,

    /// How many times the full start sequence is attempted (default: 3)
    pub startup_attempts: u32,

    /// Deadline for the container process itself to come up (default: 120 s)
    pub startup_timeout: Duration,

    /// Deadline for the CQL endpoint to answer a trivial query (default: 120 s)
    pub ready_timeout: Duration,

    /// Environment variables passed to the container. Defaults keep test
    /// startup fast (small heap, no gossip settling wait).
    pub env_vars: Vec<(String, String)>,

    /// Directories searched when resolving override and script identifiers
    pub resource_roots: Vec<PathBuf>,
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            tag: DEFAULT_TAG.to_string(),
            config_override: None,
            init_script: None,
            startup_attempts: 3,
            startup_timeout: Duration::from_secs(120),
            ready_timeout: Duration::from_secs(120),
            env_vars: vec![
                (
                    "JVM_OPTS".to_string(),
                    "-Dcassandra.skip_wait_for_gossip_to_settle=0 -Dcassandra.initial_token=0"
                        .to_string(),
                ),
                ("HEAP_NEWSIZE".to_string(), "128M".to_string()),
                ("MAX_HEAP_SIZE".to_string(), "1024M".to_string()),
            ],
            resource_roots: vec![PathBuf::from("tests/resources"), PathBuf::from("testdata")],
        }
    }
}

impl CassandraConfig {
    /// Load defaults, honoring the `CQLBOX_CASSANDRA_TAG` environment
    /// variable. Blank values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(tag) = std::env::var(TAG_ENV_VAR) {
            if !tag.trim().is_empty() {
                config.tag = tag;
            }
        }

        config
    }

    /// Set the image name
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the image tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Replace `/etc/cassandra` with the named resource directory.
    ///
    /// The directory is mounted over the fixed configuration path, so the
    /// image's own configuration disappears entirely. If `cassandra.yaml` is
    /// missing or broken in the override, Cassandra itself fails to launch;
    /// this layer performs no completeness validation.
    pub fn with_configuration_override(mut self, location: impl Into<String>) -> Self {
        self.config_override = Some(location.into());
        self
    }

    /// Apply the named CQL script after the node reports ready.
    pub fn with_init_script(mut self, script: impl Into<String>) -> Self {
        self.init_script = Some(script.into());
        self
    }

    /// Set how many times the full start sequence is attempted
    pub fn with_startup_attempts(mut self, attempts: u32) -> Self {
        self.startup_attempts = attempts;
        self
    }

    /// Set the container startup deadline
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Set the CQL readiness deadline
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Add a container environment variable
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Add a directory to the resource search path
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_roots.push(root.into());
        self
    }
}
