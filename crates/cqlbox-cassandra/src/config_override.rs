//! Configuration override resolution
//!
//! Decides, before the process starts, whether the fixed in-container
//! configuration directory gets replaced by a local directory. The output is
//! a declarative mount directive; the container builder consumes it, this
//! module performs no side effects of its own.

use crate::config::CONTAINER_CONFIG_DIR;
use crate::resource::ResourceLoader;
use cqlbox_common::Result;
use std::path::PathBuf;
use tracing::debug;

/// Directive to mount a local tree over the container's configuration path,
/// replacing the existing contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMount {
    /// Absolute host path of the override directory
    pub source: PathBuf,
    /// In-container target directory
    pub target: String,
}

/// Resolve an optional override location to a mount directive.
///
/// Absent location means no mount: the image's default configuration is used.
/// A present location must resolve through the loader; the override's
/// internal completeness is deliberately not validated here. A broken or
/// empty override makes Cassandra itself fail startup, which surfaces later
/// as a launch failure.
pub fn resolve_config_override(
    loader: &dyn ResourceLoader,
    location: Option<&str>,
) -> Result<Option<ConfigMount>> {
    let Some(location) = location else {
        return Ok(None);
    };

    let source = loader.locate(location)?;
    debug!(
        location = %location,
        source = %source.display(),
        target = %CONTAINER_CONFIG_DIR,
        "Resolved configuration override"
    );

    Ok(Some(ConfigMount {
        source,
        target: CONTAINER_CONFIG_DIR.to_string(),
    }))
}
