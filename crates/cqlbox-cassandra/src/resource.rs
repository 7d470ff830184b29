//! Resource resolution
//!
//! The override directory and the init script are named by plain identifiers,
//! not paths, so the harness stays independent of any packaging mechanism.
//! [`ResourceLoader`] is the pluggable seam; [`DirResourceLoader`] is the
//! default implementation searching a list of root directories.

use cqlbox_common::{CqlboxError, Result};
use std::path::{Path, PathBuf};

/// Resolves resource identifiers to local content
pub trait ResourceLoader: Send + Sync {
    /// Resolve an identifier to an absolute path, or signal not-found.
    fn locate(&self, id: &str) -> Result<PathBuf>;

    /// Read a located resource as UTF-8 text.
    ///
    /// Invalid UTF-8 is reported as a read error, matching the fixed-encoding
    /// contract for init scripts.
    fn read_to_string(&self, id: &str) -> Result<String> {
        let path = self.locate(id)?;
        let bytes = std::fs::read(&path).map_err(|source| CqlboxError::ResourceRead {
            id: id.to_string(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|err| CqlboxError::ResourceRead {
            id: id.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })
    }
}

/// Loader searching a fixed list of root directories, first match wins
#[derive(Debug, Clone)]
pub struct DirResourceLoader {
    roots: Vec<PathBuf>,
}

impl DirResourceLoader {
    /// Create a loader over the given roots
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Roots searched by this loader, in order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl Default for DirResourceLoader {
    /// Search `tests/resources` and `testdata` under the current directory,
    /// which is the consuming crate's root under `cargo test`.
    fn default() -> Self {
        Self::new(vec![
            PathBuf::from("tests/resources"),
            PathBuf::from("testdata"),
        ])
    }
}

impl ResourceLoader for DirResourceLoader {
    fn locate(&self, id: &str) -> Result<PathBuf> {
        for root in &self.roots {
            let candidate = root.join(id);
            if candidate.exists() {
                return canonicalize(id, &candidate);
            }
        }
        Err(CqlboxError::ResourceNotFound(id.to_string()))
    }
}

fn canonicalize(id: &str, path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|source| CqlboxError::ResourceRead {
        id: id.to_string(),
        source,
    })
}
