/*!
Adapter for GNU tar.

One binary serves both roles, driven with long-form flags so the built
command lines read unambiguously in logs and error messages. The
compression codec is chosen per call from the archive file name; paths
with no recognizable tar extension get a plain uncompressed stream.

In-place mutation only works on uncompressed archives: `--append` and
`--delete` operate on the tar stream itself, and GNU tar cannot rewrite
a compressed one. Those calls fail up front instead of producing a
corrupted file.
*/

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapter::{ensure_success, require_members, Archiver};
use crate::command::{path_arg, Command};
use crate::config::BinaryConfig;
use crate::error::{PackshellError, Result};
use crate::format::{ArchiveFormat, TarCompression};
use crate::member::{Member, VersionInfo};
use crate::parser::{OutputParser, TarParser};
use crate::process::{ProcessResult, ProcessRunner, SystemRunner};

/// Backend identifier used by registries and configuration.
pub const NAME: &str = "gnu-tar";

/// Conventional binary name for both roles.
pub const DEFAULT_BINARY: &str = "tar";

/// Archiver backed by the GNU `tar` binary.
pub struct GnuTarArchiver<R = SystemRunner> {
    deflator: String,
    inflator: String,
    runner: R,
    parser: TarParser,
}

impl GnuTarArchiver<SystemRunner> {
    /// Adapter using the conventional binary name and a blocking runner.
    pub fn new() -> Self {
        Self::with_config(BinaryConfig::default(), SystemRunner::new())
    }
}

impl Default for GnuTarArchiver<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> GnuTarArchiver<R> {
    /// Adapter with binary overrides from configuration and an explicit
    /// runner.
    pub fn with_config(config: BinaryConfig, runner: R) -> Self {
        Self {
            deflator: config
                .deflator
                .unwrap_or_else(|| DEFAULT_BINARY.to_string()),
            inflator: config
                .inflator
                .unwrap_or_else(|| DEFAULT_BINARY.to_string()),
            runner,
            parser: TarParser::gnu(),
        }
    }

    fn run_checked(&self, command: Command) -> Result<ProcessResult> {
        let result = self.runner.run(&command);
        ensure_success(result, &command)
    }

    fn compression_for(path: &Path) -> TarCompression {
        ArchiveFormat::from_path(path)
            .and_then(ArchiveFormat::tar_compression)
            .unwrap_or_default()
    }

    fn reject_compressed(path: &Path, operation: &str) -> Result<()> {
        if Self::compression_for(path).is_compressed() {
            return Err(PackshellError::not_supported(format!(
                "cannot {operation} members of a compressed tar archive"
            )));
        }
        Ok(())
    }

    fn file_flag(path: &Path) -> Result<String> {
        Ok(format!("--file={}", path_arg(path)?))
    }
}

impl<R: ProcessRunner> Archiver for GnuTarArchiver<R> {
    fn name(&self) -> &str {
        NAME
    }

    fn create(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()> {
        if files.is_empty() {
            return Err(PackshellError::not_supported("cannot create an empty archive"));
        }
        let mut command = Command::new(&self.deflator).arg("--create");
        if !recursive {
            command = command.arg("--no-recursion");
        }
        if let Some(flag) = Self::compression_for(path).gnu_flag() {
            command = command.arg(flag);
        }
        let command = command.arg(Self::file_flag(path)?).members(files)?;
        debug!(archive = %path.display(), members = files.len(), "creating tar archive");
        self.run_checked(command)?;
        Ok(())
    }

    fn add(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()> {
        require_members(files, "add")?;
        Self::reject_compressed(path, "add")?;
        let mut command = Command::new(&self.deflator).arg("--append");
        if !recursive {
            command = command.arg("--no-recursion");
        }
        let command = command.arg(Self::file_flag(path)?).members(files)?;
        self.run_checked(command)?;
        Ok(())
    }

    fn remove(&self, path: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        require_members(files, "remove")?;
        Self::reject_compressed(path, "remove")?;
        let command = Command::new(&self.deflator)
            .arg("--delete")
            .arg(Self::file_flag(path)?)
            .members(files)?;
        debug!(archive = %path.display(), members = files.len(), "removing tar members");
        self.run_checked(command)?;
        Ok(files.to_vec())
    }

    fn list_members(&self, path: &Path) -> Result<Vec<Member>> {
        let command = Command::new(&self.inflator)
            .arg("--list")
            .arg("--verbose")
            .arg(Self::file_flag(path)?);
        let result = self.run_checked(command)?;
        self.parser.parse_file_listing(&result.stdout)
    }

    fn extract(&self, path: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)?;
        let command = Command::new(&self.inflator)
            .arg("--extract")
            .arg(Self::file_flag(path)?)
            .arg("--directory")
            .arg(path_arg(destination)?);
        debug!(archive = %path.display(), destination = %destination.display(), "extracting tar archive");
        self.run_checked(command)?;
        Ok(())
    }

    fn deflator_version(&self) -> Result<VersionInfo> {
        let command = Command::new(&self.deflator).arg("--version");
        let result = self.run_checked(command)?;
        self.parser.parse_version(&result.stdout)
    }

    fn inflator_version(&self) -> Result<VersionInfo> {
        let command = Command::new(&self.inflator).arg("--version");
        let result = self.run_checked(command)?;
        self.parser.parse_version(&result.stdout)
    }

    fn deflator_binary(&self) -> &str {
        &self.deflator
    }

    fn inflator_binary(&self) -> &str {
        &self.inflator
    }

    fn is_supported(&self) -> bool {
        let deflate = self.runner.run(&Command::new(&self.deflator).arg("--help"));
        let inflate = self.runner.run(&Command::new(&self.inflator).arg("--help"));
        deflate.success && inflate.success
    }

    fn handles_path(&self, path: &Path) -> bool {
        matches!(ArchiveFormat::from_path(path), Some(format) if format.is_tar())
    }
}
