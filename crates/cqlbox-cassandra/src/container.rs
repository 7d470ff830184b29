//! Containerized Cassandra instance
//!
//! [`CassandraContainer`] owns the running container and a ready driver
//! session. Each start attempt runs the full sequence: resolve the
//! configuration override, start the container, wait for the CQL endpoint,
//! apply the init script. A failed attempt is retried from the beginning up
//! to the configured attempt count; partial progress is never resumed.

use crate::config::{CassandraConfig, CQL_PORT, PASSWORD, USERNAME};
use crate::config_override::resolve_config_override;
use crate::delegate::SessionDelegate;
use crate::resource::DirResourceLoader;
use crate::script::InitScriptApplier;
use crate::wait::CqlWaitStrategy;
use cqlbox_common::{CqlboxError, Result};
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use testcontainers::{
    core::{IntoContainerPort, Mount, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tracing::{debug, info, warn};

/// A running, ready Cassandra container
pub struct CassandraContainer {
    container: ContainerAsync<GenericImage>,
    session: Arc<Session>,
    host: String,
    port: u16,
    config: CassandraConfig,
    // Scratch copy backing the override mount; must outlive the container.
    _override_dir: Option<TempDir>,
}

impl CassandraContainer {
    /// Start with default configuration
    pub async fn start() -> Result<Self> {
        Self::start_with_config(CassandraConfig::default()).await
    }

    /// Start with the given configuration.
    ///
    /// Retries the whole start sequence up to `startup_attempts` times. After
    /// exhausting attempts, script and resource errors surface as themselves;
    /// infrastructure failures surface as [`CqlboxError::Launch`].
    pub async fn start_with_config(config: CassandraConfig) -> Result<Self> {
        let attempts = config.startup_attempts.max(1);
        let mut last_error: Option<CqlboxError> = None;

        for attempt in 1..=attempts {
            info!(
                attempt,
                attempts,
                image = %config.image,
                tag = %config.tag,
                "Starting Cassandra container"
            );
            match Self::try_start(&config).await {
                Ok(container) => return Ok(container),
                Err(err) => {
                    warn!(attempt, error = %err, "Start attempt failed");
                    last_error = Some(err);
                }
            }
        }

        let source =
            last_error.unwrap_or_else(|| CqlboxError::Container("no attempt was made".to_string()));
        if source.is_script_error() {
            Err(source)
        } else {
            Err(CqlboxError::Launch {
                attempts,
                source: Box::new(source),
            })
        }
    }

    async fn try_start(config: &CassandraConfig) -> Result<Self> {
        let loader = DirResourceLoader::new(config.resource_roots.clone());

        // Pre-start configuration phase. The override is staged into a
        // scratch directory because the image entrypoint edits config files
        // in place; those writes must never land in the source tree.
        let mount = resolve_config_override(&loader, config.config_override.as_deref())?;
        let staged_override = match &mount {
            Some(mount) => Some(stage_override_dir(&mount.source)?),
            None => None,
        };

        let image = GenericImage::new(config.image.as_str(), config.tag.as_str())
            .with_exposed_port(CQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Startup complete"));

        let mut request = image.with_startup_timeout(config.startup_timeout);
        for (key, value) in &config.env_vars {
            request = request.with_env_var(key.as_str(), value.as_str());
        }
        if let (Some(mount), Some(staged)) = (&mount, &staged_override) {
            debug!(
                source = %mount.source.display(),
                staged = %staged.path().display(),
                target = %mount.target,
                "Mounting configuration override"
            );
            request = request.with_mount(Mount::bind_mount(
                staged.path().display().to_string(),
                mount.target.clone(),
            ));
        }

        let container = request
            .start()
            .await
            .map_err(|err| CqlboxError::Container(err.to_string()))?;
        let host = container
            .get_host()
            .await
            .map_err(|err| CqlboxError::Container(err.to_string()))?
            .to_string();
        let port = container
            .get_host_port_ipv4(CQL_PORT.tcp())
            .await
            .map_err(|err| CqlboxError::Container(err.to_string()))?;

        // Confirmed-started gate: the init script must target a live node.
        let wait = CqlWaitStrategy::new(config.ready_timeout, Duration::from_secs(1));
        let session = Arc::new(wait.wait_until_ready(&host, port).await?);

        // Post-start hook.
        let delegate = SessionDelegate::new(session.clone());
        InitScriptApplier::new(&loader)
            .apply(config.init_script.as_deref(), &delegate)
            .await?;

        Ok(Self {
            container,
            session,
            host,
            port,
            config: config.clone(),
            _override_dir: staged_override,
        })
    }

    /// Host the mapped CQL port is published on
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host port mapped to the container's native transport port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` contact point for driver sessions
    pub fn contact_point(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fixed username (effective once an override enables PasswordAuthenticator)
    pub fn username(&self) -> &'static str {
        USERNAME
    }

    /// Fixed password, see [`Self::username`]
    pub fn password(&self) -> &'static str {
        PASSWORD
    }

    /// The session that confirmed readiness (and ran the init script)
    pub fn session(&self) -> Arc<Session> {
        self.session.clone()
    }

    /// Build a fresh driver session against the running instance
    pub async fn new_session(&self) -> Result<Session> {
        SessionBuilder::new()
            .known_node(self.contact_point())
            .build()
            .await
            .map_err(|err| CqlboxError::NotReady(err.to_string()))
    }

    /// Configuration this instance was started with
    pub fn config(&self) -> &CassandraConfig {
        &self.config
    }

    /// Stop the container explicitly. Dropping the value also removes it.
    pub async fn stop(self) -> Result<()> {
        self.container
            .stop()
            .await
            .map_err(|err| CqlboxError::Container(err.to_string()))
    }
}

impl std::fmt::Debug for CassandraContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CassandraContainer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Copy the resolved override into a scratch directory that backs the mount,
/// keeping the original tree untouched by container-side edits.
fn stage_override_dir(source: &Path) -> Result<TempDir> {
    let staged = TempDir::new().map_err(|err| CqlboxError::ResourceRead {
        id: source.display().to_string(),
        source: err,
    })?;
    copy_tree(source, staged.path()).map_err(|err| CqlboxError::ResourceRead {
        id: source.display().to_string(),
        source: err,
    })?;
    Ok(staged)
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir(&target)?;
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
