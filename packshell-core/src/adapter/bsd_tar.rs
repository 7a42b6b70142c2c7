/*!
Adapter for bsdtar (libarchive's tar).

Mostly flag-compatible with GNU tar but driven with its short options,
and it prints ls-style listing rows with month-name dates. The one hard
capability gap: libarchive has no in-place delete, so member removal is
refused outright rather than emulated with a rewrite.
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
pub const NAME: &str = "bsd-tar";

/// Conventional binary name for both roles.
pub const DEFAULT_BINARY: &str = "bsdtar";

/// Archiver backed by the `bsdtar` binary.
pub struct BsdTarArchiver<R = SystemRunner> {
    deflator: String,
    inflator: String,
    runner: R,
    parser: TarParser,
}

impl BsdTarArchiver<SystemRunner> {
    /// Adapter using the conventional binary name and a blocking runner.
    pub fn new() -> Self {
        Self::with_config(BinaryConfig::default(), SystemRunner::new())
    }
}

impl Default for BsdTarArchiver<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> BsdTarArchiver<R> {
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
            parser: TarParser::bsd(),
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
}

impl<R: ProcessRunner> Archiver for BsdTarArchiver<R> {
    fn name(&self) -> &str {
        NAME
    }

    fn create(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()> {
        if files.is_empty() {
            return Err(PackshellError::not_supported("cannot create an empty archive"));
        }
        let mut command = Command::new(&self.deflator).arg("-c");
        if !recursive {
            command = command.arg("-n");
        }
        if let Some(flag) = Self::compression_for(path).bsd_flag() {
            command = command.arg(flag);
        }
        let command = command.arg("-f").arg(path_arg(path)?).members(files)?;
        debug!(archive = %path.display(), members = files.len(), "creating tar archive");
        self.run_checked(command)?;
        Ok(())
    }

    fn add(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()> {
        require_members(files, "add")?;
        if Self::compression_for(path).is_compressed() {
            return Err(PackshellError::not_supported(
                "cannot add members to a compressed tar archive",
            ));
        }
        let mut command = Command::new(&self.deflator).arg("-r");
        if !recursive {
            command = command.arg("-n");
        }
        let command = command.arg("-f").arg(path_arg(path)?).members(files)?;
        self.run_checked(command)?;
        Ok(())
    }

    fn remove(&self, _path: &Path, _files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        Err(PackshellError::not_supported(
            "bsdtar cannot remove members in place",
        ))
    }

    fn list_members(&self, path: &Path) -> Result<Vec<Member>> {
        let command = Command::new(&self.inflator)
            .arg("-t")
            .arg("-v")
            .arg("-f")
            .arg(path_arg(path)?);
        let result = self.run_checked(command)?;
        self.parser.parse_file_listing(&result.stdout)
    }

    fn extract(&self, path: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)?;
        let command = Command::new(&self.inflator)
            .arg("-x")
            .arg("-f")
            .arg(path_arg(path)?)
            .arg("-C")
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
