/*!
Archive handles bound to the backend that manages them.
*/

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapter::Archiver;
use crate::error::Result;
use crate::member::Member;

/// An archive file paired with the adapter that manages it.
///
/// Handles come out of the registry, either from a successful `create`
/// or from opening an existing path, so every handle is already bound
/// to a backend that recognizes its format. The handle itself never
/// changes; all mutation happens to the file on disk through the bound
/// adapter.
#[derive(Clone)]
pub struct Archive {
    path: PathBuf,
    archiver: Arc<dyn Archiver>,
}

impl Archive {
    pub(crate) fn bind(path: PathBuf, archiver: Arc<dyn Archiver>) -> Self {
        Self { path, archiver }
    }

    /// Location of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the backend this handle is bound to.
    pub fn backend(&self) -> &str {
        self.archiver.name()
    }

    /// List the archive's members in the backend's reported order.
    pub fn members(&self) -> Result<Vec<Member>> {
        self.archiver.list_members(&self.path)
    }

    /// Add files to the archive.
    pub fn add(&self, files: &[PathBuf], recursive: bool) -> Result<()> {
        self.archiver.add(&self.path, files, recursive)
    }

    /// Remove members from the archive, echoing the requested set back.
    pub fn remove(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        self.archiver.remove(&self.path, files)
    }

    /// Extract the archive into a destination directory.
    pub fn extract_to(&self, destination: &Path) -> Result<()> {
        self.archiver.extract(&self.path, destination)
    }
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("backend", &self.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ZipArchiver;
    use crate::config::BinaryConfig;
    use crate::process::ScriptedRunner;

    fn handle() -> Archive {
        let adapter = ZipArchiver::with_config(BinaryConfig::default(), ScriptedRunner::succeeding());
        Archive::bind(PathBuf::from("out.zip"), Arc::new(adapter))
    }

    #[test]
    fn test_handle_reports_its_binding() {
        let archive = handle();
        assert_eq!(archive.path(), Path::new("out.zip"));
        assert_eq!(archive.backend(), "zip");
        let debug = format!("{archive:?}");
        assert!(debug.contains("out.zip"));
        assert!(debug.contains("zip"));
    }

    #[test]
    fn test_operations_delegate_to_the_bound_adapter() {
        let archive = handle();
        archive.add(&[PathBuf::from("extra.txt")], false).unwrap();
        let removed = archive.remove(&[PathBuf::from("old.txt")]).unwrap();
        assert_eq!(removed, vec![PathBuf::from("old.txt")]);
    }
}
