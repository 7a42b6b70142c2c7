/*!
Archiver adapters driving external command-line tools.

This module defines the backend abstraction (port) and one concrete
adapter per tool family. An adapter composes three collaborators: it
assembles a [`Command`], hands it to a [`ProcessRunner`], and feeds the
captured output to its [`OutputParser`](crate::parser::OutputParser).
The rest of the crate only ever sees the uniform [`Archiver`] interface,
so new tool families slot in without touching dispatch or callers.
*/

pub mod bsd_tar;
pub mod gnu_tar;
pub mod zip;

use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::error::{PackshellError, Result};
use crate::member::{Member, VersionInfo};
use crate::process::ProcessResult;

/// Uniform interface over one external archiver tool family.
///
/// Mutating operations verify the process outcome before returning: a
/// failed process always surfaces as [`PackshellError::Execution`] and
/// never as a partial success. The one exception to error propagation is
/// [`is_supported`](Archiver::is_supported), which is a capability probe
/// and degrades every failure, including an uninstalled binary, to
/// `false`.
pub trait Archiver: Send + Sync {
    /// Stable backend identifier used by configuration and dispatch
    /// (e.g. "zip", "gnu-tar", "bsd-tar").
    fn name(&self) -> &str;

    /// Create a new archive and populate it in one invocation.
    ///
    /// # Arguments
    /// * `path` - Destination archive file
    /// * `files` - Files and directories to pack; must be non-empty
    /// * `recursive` - Whether directories are descended into
    ///
    /// # Returns
    /// Result indicating success or failure
    fn create(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()>;

    /// Add files to an existing archive.
    ///
    /// # Arguments
    /// * `path` - Archive file to grow
    /// * `files` - Files and directories to add; must be non-empty
    /// * `recursive` - Whether directories are descended into
    ///
    /// # Returns
    /// Result indicating success or failure
    fn add(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()>;

    /// Remove members from an existing archive.
    ///
    /// # Arguments
    /// * `path` - Archive file to shrink
    /// * `files` - Member paths to delete; must be non-empty
    ///
    /// # Returns
    /// The requested member set on success. The wrapped tools do not
    /// report which members they actually deleted, so this echoes the
    /// input rather than a backend-confirmed list.
    fn remove(&self, path: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// List the members of an archive in the backend's reported order.
    fn list_members(&self, path: &Path) -> Result<Vec<Member>>;

    /// Extract the full archive into a destination directory, creating
    /// the directory first when it does not exist.
    fn extract(&self, path: &Path, destination: &Path) -> Result<()>;

    /// Probe the compress-role binary for its version.
    fn deflator_version(&self) -> Result<VersionInfo>;

    /// Probe the decompress-role binary for its version.
    fn inflator_version(&self) -> Result<VersionInfo>;

    /// Configured compress-role binary name.
    fn deflator_binary(&self) -> &str;

    /// Configured decompress-role binary name.
    fn inflator_binary(&self) -> &str;

    /// Whether both of this backend's binaries respond on this host.
    ///
    /// Never fails: a missing binary, a crashing probe or any other
    /// execution problem all come back as `false`.
    fn is_supported(&self) -> bool;

    /// Whether this backend recognizes the file name's format.
    fn handles_path(&self, path: &Path) -> bool;
}

/// Promote a failed process result into an execution error.
///
/// The error message embeds the exact command line and the captured
/// stderr, which is usually the only diagnostic the tool produced.
pub(crate) fn ensure_success(result: ProcessResult, command: &Command) -> Result<ProcessResult> {
    if result.success {
        Ok(result)
    } else {
        Err(PackshellError::execution(command.command_line(), result.stderr))
    }
}

/// Reject an empty member set before anything is spawned.
pub(crate) fn require_members(files: &[PathBuf], operation: &str) -> Result<()> {
    if files.is_empty() {
        return Err(PackshellError::invalid_argument(format!(
            "no members given to {operation}"
        )));
    }
    Ok(())
}

// Re-export types for convenience
pub use bsd_tar::BsdTarArchiver;
pub use gnu_tar::GnuTarArchiver;
pub use zip::ZipArchiver;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_success_passes_through_successful_results() {
        let command = Command::new("zip").arg("-lv");
        let result = ProcessResult {
            success: true,
            exit_code: Some(0),
            stdout: "listing".to_string(),
            stderr: String::new(),
        };
        let passed = ensure_success(result, &command).unwrap();
        assert_eq!(passed.stdout, "listing");
    }

    #[test]
    fn test_ensure_success_embeds_command_line_and_stderr() {
        let command = Command::new("zip").arg("-r").arg("out.zip").arg("src");
        let result = ProcessResult {
            success: false,
            exit_code: Some(15),
            stdout: String::new(),
            stderr: "zip error: Nothing to do!".to_string(),
        };
        let err = ensure_success(result, &command).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("zip -r out.zip src"));
        assert!(message.contains("zip error: Nothing to do!"));
    }

    #[test]
    fn test_require_members_rejects_empty_sets() {
        let err = require_members(&[], "add").unwrap_err();
        assert!(matches!(err, PackshellError::InvalidArgument(_)));
        assert!(require_members(&[PathBuf::from("a")], "add").is_ok());
    }
}
