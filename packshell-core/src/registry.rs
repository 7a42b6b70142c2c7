/*!
Backend selection and dispatch.

The registry owns one adapter per backend family, in preference order,
and answers three questions: which backend a caller asked for by name,
which backend a file name belongs to, and which backend actually works
on this host. Callers that want a bound [`Archive`] handle go through
[`create`](ArchiverRegistry::create) or [`open`](ArchiverRegistry::open)
instead of touching adapters directly.
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::adapter::{Archiver, BsdTarArchiver, GnuTarArchiver, ZipArchiver};
use crate::archive::Archive;
use crate::config::PackshellConfig;
use crate::error::{PackshellError, Result};

/// Ordered collection of archiver backends.
pub struct ArchiverRegistry {
    archivers: Vec<Arc<dyn Archiver>>,
}

impl ArchiverRegistry {
    /// Registry over the stock backends in the built-in preference
    /// order: zip, GNU tar, bsdtar.
    pub fn new() -> Self {
        Self::with_archivers(vec![
            Arc::new(ZipArchiver::new()),
            Arc::new(GnuTarArchiver::new()),
            Arc::new(BsdTarArchiver::new()),
        ])
    }

    /// Registry built from configuration: binary overrides and the
    /// process timeout flow into every adapter, and an optional
    /// preference list narrows and reorders the backends.
    pub fn from_config(config: &PackshellConfig) -> Result<Self> {
        config.validate()?;
        let runner = config.runner();
        let stock: Vec<Arc<dyn Archiver>> = vec![
            Arc::new(ZipArchiver::with_config(config.zip.clone(), runner.clone())),
            Arc::new(GnuTarArchiver::with_config(config.gnu_tar.clone(), runner.clone())),
            Arc::new(BsdTarArchiver::with_config(config.bsd_tar.clone(), runner)),
        ];
        let archivers = match &config.preference {
            None => stock,
            // validate() has already checked every name against the
            // stock set, so the lookup cannot come up empty.
            Some(preference) => preference
                .iter()
                .filter_map(|name| stock.iter().find(|a| a.name() == name).cloned())
                .collect(),
        };
        Ok(Self { archivers })
    }

    /// Registry over caller-supplied adapters, most preferred first.
    pub fn with_archivers(archivers: Vec<Arc<dyn Archiver>>) -> Self {
        Self { archivers }
    }

    /// Registered backends in preference order.
    pub fn archivers(&self) -> &[Arc<dyn Archiver>] {
        &self.archivers
    }

    /// Look a backend up by its stable name.
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Archiver>> {
        self.archivers
            .iter()
            .find(|archiver| archiver.name() == name)
            .cloned()
    }

    /// First backend that recognizes the file name's format.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn Archiver>> {
        self.archivers
            .iter()
            .find(|archiver| archiver.handles_path(path))
            .cloned()
            .ok_or(PackshellError::NoSupportedBackend)
    }

    /// First backend whose binaries respond on this host.
    ///
    /// Probes in preference order and stops at the first success; a
    /// host with no working backend at all yields
    /// [`PackshellError::NoSupportedBackend`].
    pub fn auto_detect(&self) -> Result<Arc<dyn Archiver>> {
        for archiver in &self.archivers {
            if archiver.is_supported() {
                debug!(backend = archiver.name(), "auto-detected archiver backend");
                return Ok(Arc::clone(archiver));
            }
            debug!(backend = archiver.name(), "backend unavailable on this host");
        }
        Err(PackshellError::NoSupportedBackend)
    }

    /// Create an archive, dispatching on the destination file name, and
    /// return a handle bound to the backend that built it.
    pub fn create(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<Archive> {
        let archiver = self.for_path(path)?;
        archiver.create(path, files, recursive)?;
        Ok(Archive::bind(path.to_path_buf(), archiver))
    }

    /// Bind a handle to an existing archive, dispatching on the file
    /// name. The file itself is not touched until an operation runs.
    pub fn open(&self, path: &Path) -> Result<Archive> {
        let archiver = self.for_path(path)?;
        Ok(Archive::bind(path.to_path_buf(), archiver))
    }
}

impl Default for ArchiverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
