/*!
Adapter for the Info-ZIP `zip`/`unzip` tool pair.

The two roles live in two binaries: `zip` creates and mutates archives,
`unzip` lists and extracts them. Both respond to `-h` with a banner that
names their version, which doubles as the support probe.
*/

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapter::{ensure_success, require_members, Archiver};
use crate::command::{path_arg, Command};
use crate::config::BinaryConfig;
use crate::error::{PackshellError, Result};
use crate::format::ArchiveFormat;
use crate::member::{Member, VersionInfo};
use crate::parser::{OutputParser, ZipParser};
use crate::process::{ProcessResult, ProcessRunner, SystemRunner};

/// Backend identifier used by registries and configuration.
pub const NAME: &str = "zip";

/// Conventional compress-role binary name.
pub const DEFAULT_DEFLATOR: &str = "zip";

/// Conventional decompress-role binary name.
pub const DEFAULT_INFLATOR: &str = "unzip";

/// Archiver backed by the `zip` and `unzip` binaries.
///
/// Generic over the process runner so tests can script process outcomes;
/// the default runner spawns real processes.
pub struct ZipArchiver<R = SystemRunner> {
    deflator: String,
    inflator: String,
    runner: R,
    parser: ZipParser,
}

impl ZipArchiver<SystemRunner> {
    /// Adapter using the conventional binary names and a blocking runner.
    pub fn new() -> Self {
        Self::with_config(BinaryConfig::default(), SystemRunner::new())
    }
}

impl Default for ZipArchiver<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> ZipArchiver<R> {
    /// Adapter with binary overrides from configuration and an explicit
    /// runner.
    pub fn with_config(config: BinaryConfig, runner: R) -> Self {
        Self {
            deflator: config
                .deflator
                .unwrap_or_else(|| DEFAULT_DEFLATOR.to_string()),
            inflator: config
                .inflator
                .unwrap_or_else(|| DEFAULT_INFLATOR.to_string()),
            runner,
            parser: ZipParser,
        }
    }

    fn run_checked(&self, command: Command) -> Result<ProcessResult> {
        let result = self.runner.run(&command);
        ensure_success(result, &command)
    }
}

impl<R: ProcessRunner> Archiver for ZipArchiver<R> {
    fn name(&self) -> &str {
        NAME
    }

    fn create(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()> {
        if files.is_empty() {
            // The zip format cannot represent an archive with no entries.
            return Err(PackshellError::not_supported("cannot create an empty archive"));
        }
        let mut command = Command::new(&self.deflator);
        if recursive {
            command = command.arg("-r");
        }
        let command = command.arg(path_arg(path)?).members(files)?;
        debug!(archive = %path.display(), members = files.len(), "creating zip archive");
        self.run_checked(command)?;
        Ok(())
    }

    fn add(&self, path: &Path, files: &[PathBuf], recursive: bool) -> Result<()> {
        require_members(files, "add")?;
        let mut command = Command::new(&self.deflator);
        if recursive {
            command = command.arg("-r");
        }
        let command = command.arg("-u").arg(path_arg(path)?).members(files)?;
        self.run_checked(command)?;
        Ok(())
    }

    fn remove(&self, path: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        require_members(files, "remove")?;
        let command = Command::new(&self.deflator)
            .arg("-d")
            .arg(path_arg(path)?)
            .members(files)?;
        debug!(archive = %path.display(), members = files.len(), "removing zip members");
        self.run_checked(command)?;
        Ok(files.to_vec())
    }

    fn list_members(&self, path: &Path) -> Result<Vec<Member>> {
        let command = Command::new(&self.inflator).arg("-lv").arg(path_arg(path)?);
        let result = self.run_checked(command)?;
        self.parser.parse_file_listing(&result.stdout)
    }

    fn extract(&self, path: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)?;
        let command = Command::new(&self.inflator)
            .arg(path_arg(path)?)
            .arg("-d")
            .arg(path_arg(destination)?);
        debug!(archive = %path.display(), destination = %destination.display(), "extracting zip archive");
        self.run_checked(command)?;
        Ok(())
    }

    fn deflator_version(&self) -> Result<VersionInfo> {
        let command = Command::new(&self.deflator).arg("-h");
        let result = self.run_checked(command)?;
        self.parser.parse_version(&result.stdout)
    }

    fn inflator_version(&self) -> Result<VersionInfo> {
        let command = Command::new(&self.inflator).arg("-h");
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
        let deflate = self.runner.run(&Command::new(&self.deflator).arg("-h"));
        let inflate = self.runner.run(&Command::new(&self.inflator).arg("-h"));
        deflate.success && inflate.success
    }

    fn handles_path(&self, path: &Path) -> bool {
        matches!(ArchiveFormat::from_path(path), Some(ArchiveFormat::Zip))
    }
}
