/*!
# packshell Core Engine

Archive management through external command-line tools.

This crate drives the host's `zip`/`unzip`, GNU `tar` and `bsdtar`
binaries as child processes, translating archive operations into exact
command-line invocations and parsing the textual output back into
structured results. No compression happens in-process; everything is
delegated to the wrapped tools:

- One adapter per tool family behind a uniform `Archiver` trait
- Strict listing and version-banner parsers per backend grammar
- A registry that dispatches by file extension, by configured name, or
  by probing which tools are installed
- Configuration-injected binary names and process timeouts

## Architecture

Each adapter composes three seams, all replaceable in tests:
- command assembly builds a positionally exact argument vector
- a process runner executes it and captures an immutable result
- an output parser turns the captured text into members and versions

## Usage

```rust,no_run
use packshell_core::ArchiverRegistry;
use std::path::{Path, PathBuf};

let registry = ArchiverRegistry::new();

// Create an archive; the .tar.gz extension picks the GNU tar backend.
let archive = registry.create(
    Path::new("bundle.tar.gz"),
    &[PathBuf::from("src"), PathBuf::from("README.md")],
    true,
)?;

// Inspect it through the bound handle.
for member in archive.members()? {
    println!("{} ({} bytes)", member.name, member.size);
}

// Unpack it somewhere else.
archive.extract_to(Path::new("/tmp/unpacked"))?;
# Ok::<(), packshell_core::PackshellError>(())
```
*/

pub mod adapter;
pub mod archive;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod member;
pub mod parser;
pub mod process;
pub mod registry;

pub use adapter::{Archiver, BsdTarArchiver, GnuTarArchiver, ZipArchiver};
pub use archive::Archive;
pub use command::Command;
pub use config::{BinaryConfig, PackshellConfig};
pub use error::{PackshellError, Result};
pub use format::{ArchiveFormat, TarCompression};
pub use member::{Member, VersionInfo};
pub use parser::{OutputParser, TarParser, ZipParser};
pub use process::{ProcessResult, ProcessRunner, SystemRunner};
pub use registry::ArchiverRegistry;
