/*!
Configuration for adapter construction.

Binary names and the process timeout are injected through these structs
instead of being read from globals, so two registries in one process can
drive different tool installations (the test suites point them at fake
binaries this way).
*/

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::adapter::{bsd_tar, gnu_tar, zip};
use crate::error::{PackshellError, Result};
use crate::process::SystemRunner;

/// Binary-name overrides for one backend's deflate and inflate roles.
///
/// `None` means the backend's conventional name, resolved through `PATH`
/// as usual. An override may be a bare name or an absolute path.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BinaryConfig {
    /// Compress-role binary (creates and mutates archives)
    pub deflator: Option<String>,

    /// Decompress-role binary (lists and extracts archives)
    pub inflator: Option<String>,
}

impl BinaryConfig {
    /// Config overriding both roles at once.
    pub fn with_binaries<S1: Into<String>, S2: Into<String>>(deflator: S1, inflator: S2) -> Self {
        Self {
            deflator: Some(deflator.into()),
            inflator: Some(inflator.into()),
        }
    }

    fn validate(&self, backend: &str) -> Result<()> {
        for (role, binary) in [("deflator", &self.deflator), ("inflator", &self.inflator)] {
            if let Some(name) = binary {
                if name.trim().is_empty() {
                    return Err(PackshellError::invalid_argument(format!(
                        "{backend} {role} binary override is empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Top-level configuration for building an archiver registry.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PackshellConfig {
    /// Binary overrides for the zip backend
    pub zip: BinaryConfig,

    /// Binary overrides for the GNU tar backend
    pub gnu_tar: BinaryConfig,

    /// Binary overrides for the bsdtar backend
    pub bsd_tar: BinaryConfig,

    /// Kill archiver processes that run longer than this many seconds.
    /// `None` waits as long as the tool does.
    pub timeout_secs: Option<u64>,

    /// Backend names to register, most preferred first. `None` registers
    /// all backends in the built-in order (zip, gnu-tar, bsd-tar); a
    /// listed subset registers only those backends.
    pub preference: Option<Vec<String>>,
}

impl PackshellConfig {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.zip.validate(zip::NAME)?;
        self.gnu_tar.validate(gnu_tar::NAME)?;
        self.bsd_tar.validate(bsd_tar::NAME)?;

        if self.timeout_secs == Some(0) {
            return Err(PackshellError::invalid_argument(
                "timeout_secs must be at least 1 second",
            ));
        }

        if let Some(preference) = &self.preference {
            if preference.is_empty() {
                return Err(PackshellError::invalid_argument(
                    "preference list must name at least one backend",
                ));
            }
            let known = [zip::NAME, gnu_tar::NAME, bsd_tar::NAME];
            for name in preference {
                if !known.contains(&name.as_str()) {
                    return Err(PackshellError::invalid_argument(format!(
                        "unknown backend {name:?} in preference list (known: {})",
                        known.join(", ")
                    )));
                }
            }
            for (idx, name) in preference.iter().enumerate() {
                if preference[..idx].contains(name) {
                    return Err(PackshellError::invalid_argument(format!(
                        "backend {name:?} appears twice in preference list"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Build the process runner this configuration describes.
    pub fn runner(&self) -> SystemRunner {
        match self.timeout_secs {
            Some(secs) => SystemRunner::with_timeout(Duration::from_secs(secs)),
            None => SystemRunner::new(),
        }
    }
}
