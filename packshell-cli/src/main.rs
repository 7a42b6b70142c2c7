/*!
packshell CLI - Command-line interface for the packshell archiver system.

Drives the host's zip and tar tools through one front end: create, grow,
shrink, list and extract archives, and inspect which backends are usable
on this machine.
*/

use clap::{Parser, Subcommand};
use packshell_core::{Archiver, ArchiverRegistry, PackshellConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "packshell")]
#[command(about = "Archive management through external zip and tar tools")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON configuration file (binary overrides, timeout,
    /// backend preference)
    #[arg(short, long, global = true, env = "PACKSHELL_CONFIG")]
    config: Option<PathBuf>,

    /// Force a backend by name instead of dispatching on the extension
    #[arg(short, long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new archive from the given files
    Create {
        /// Destination archive (extension selects the backend)
        archive: PathBuf,
        /// Files and directories to pack
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Do not descend into directories
        #[arg(long)]
        no_recursion: bool,
    },
    /// Add files to an existing archive
    Add {
        /// Archive to grow
        archive: PathBuf,
        /// Files and directories to add
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Do not descend into directories
        #[arg(long)]
        no_recursion: bool,
    },
    /// Remove members from an archive
    Remove {
        /// Archive to shrink
        archive: PathBuf,
        /// Member paths to delete
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the members of an archive
    List {
        /// Archive to inspect
        archive: PathBuf,
        /// Emit the listing as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Extract an archive into a directory
    Extract {
        /// Archive to unpack
        archive: PathBuf,
        /// Destination directory (created if missing)
        #[arg(default_value = ".")]
        destination: PathBuf,
    },
    /// Probe the configured backends and report availability
    Backends,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Type")]
    kind: String,
}

#[derive(Tabled)]
struct BackendRow {
    #[tabled(rename = "Backend")]
    name: String,
    #[tabled(rename = "Deflator")]
    deflator: String,
    #[tabled(rename = "Inflator")]
    inflator: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Build the registry from configuration (or defaults)
    let registry = build_registry(&cli)?;

    // Execute command
    match &cli.command {
        Commands::Create {
            archive,
            files,
            no_recursion,
        } => create_archive(&registry, &cli, archive, files, !no_recursion)?,
        Commands::Add {
            archive,
            files,
            no_recursion,
        } => add_members(&registry, &cli, archive, files, !no_recursion)?,
        Commands::Remove { archive, files } => remove_members(&registry, &cli, archive, files)?,
        Commands::List { archive, json } => list_members(&registry, &cli, archive, *json)?,
        Commands::Extract {
            archive,
            destination,
        } => extract_archive(&registry, &cli, archive, destination)?,
        Commands::Backends => show_backends(&registry)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_registry(cli: &Cli) -> Result<ArchiverRegistry, anyhow::Error> {
    let config = match &cli.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<PackshellConfig>(&text)?
        }
        None => PackshellConfig::default(),
    };
    Ok(ArchiverRegistry::from_config(&config)?)
}

fn select_backend(
    registry: &ArchiverRegistry,
    cli: &Cli,
    path: &Path,
) -> Result<Arc<dyn Archiver>, anyhow::Error> {
    if let Some(name) = &cli.backend {
        return registry
            .by_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown backend: {name}"));
    }
    Ok(registry.for_path(path)?)
}

fn create_archive(
    registry: &ArchiverRegistry,
    cli: &Cli,
    archive: &Path,
    files: &[PathBuf],
    recursive: bool,
) -> Result<(), anyhow::Error> {
    let archiver = select_backend(registry, cli, archive)?;
    info!("Creating {} via {}", archive.display(), archiver.name());
    archiver.create(archive, files, recursive)?;
    println!(
        "✓ Created {} from {} path(s)",
        archive.display(),
        files.len()
    );
    Ok(())
}

fn add_members(
    registry: &ArchiverRegistry,
    cli: &Cli,
    archive: &Path,
    files: &[PathBuf],
    recursive: bool,
) -> Result<(), anyhow::Error> {
    let archiver = select_backend(registry, cli, archive)?;
    archiver.add(archive, files, recursive)?;
    println!("✓ Added {} path(s) to {}", files.len(), archive.display());
    Ok(())
}

fn remove_members(
    registry: &ArchiverRegistry,
    cli: &Cli,
    archive: &Path,
    files: &[PathBuf],
) -> Result<(), anyhow::Error> {
    let archiver = select_backend(registry, cli, archive)?;
    let removed = archiver.remove(archive, files)?;
    println!(
        "✓ Removed {} member(s) from {}",
        removed.len(),
        archive.display()
    );
    Ok(())
}

fn list_members(
    registry: &ArchiverRegistry,
    cli: &Cli,
    archive: &Path,
    json: bool,
) -> Result<(), anyhow::Error> {
    let archiver = select_backend(registry, cli, archive)?;
    let members = archiver.list_members(archive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&members)?);
        return Ok(());
    }

    if members.is_empty() {
        println!("{} has no members", archive.display());
        return Ok(());
    }

    let rows: Vec<MemberRow> = members
        .iter()
        .map(|member| MemberRow {
            name: member.name.clone(),
            size: format_size(member.size),
            modified: member
                .modified
                .map(|when| when.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            kind: if member.directory { "dir" } else { "file" }.to_string(),
        })
        .collect();

    let table = Table::new(rows);
    println!("{table}");
    println!("{} member(s)", members.len());
    Ok(())
}

fn extract_archive(
    registry: &ArchiverRegistry,
    cli: &Cli,
    archive: &Path,
    destination: &Path,
) -> Result<(), anyhow::Error> {
    let archiver = select_backend(registry, cli, archive)?;
    info!(
        "Extracting {} into {} via {}",
        archive.display(),
        destination.display(),
        archiver.name()
    );
    archiver.extract(archive, destination)?;
    println!(
        "✓ Extracted {} into {}",
        archive.display(),
        destination.display()
    );
    Ok(())
}

fn show_backends(registry: &ArchiverRegistry) -> Result<(), anyhow::Error> {
    let rows: Vec<BackendRow> = registry
        .archivers()
        .iter()
        .map(|archiver| {
            let available = archiver.is_supported();
            BackendRow {
                name: archiver.name().to_string(),
                deflator: resolve_binary(archiver.deflator_binary()),
                inflator: resolve_binary(archiver.inflator_binary()),
                available: if available { "yes" } else { "no" }.to_string(),
                version: if available {
                    archiver
                        .deflator_version()
                        .map(|version| version.to_string())
                        .unwrap_or_else(|_| "unknown".to_string())
                } else {
                    "-".to_string()
                },
            }
        })
        .collect();

    let table = Table::new(rows);
    println!("{table}");
    Ok(())
}

fn resolve_binary(name: &str) -> String {
    match which::which(name) {
        Ok(path) => path.display().to_string(),
        Err(_) => format!("{name} (not found)"),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
