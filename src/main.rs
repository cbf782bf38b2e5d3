use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use world_backup::config::{self, Config};
use world_backup::managers::logging::{self, LoggingConfig};
use world_backup::utils::BackupRecord;
use world_backup::{BackupManager, BackupOutcome};

#[derive(Parser)]
#[command(name = "world-backup")]
#[command(about = "Snapshot world directories into rotating zip archives", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (written with defaults if missing)
    #[arg(short, long, default_value = "backup-config.toml")]
    config: PathBuf,

    /// Directory archives are written to (overrides config)
    #[arg(long, global = true)]
    backup_dir: Option<PathBuf>,

    /// Number of archives to keep, 0 or less keeps all (overrides config)
    #[arg(long, global = true, allow_hyphen_values = true)]
    retention: Option<i64>,

    /// World directory to back up; repeat for several (replaces configured worlds)
    #[arg(short, long = "world", global = true)]
    worlds: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive all existing worlds, then apply retention
    Run,

    /// Apply retention without creating a new archive
    Rotate,

    /// List backup archives, oldest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate,
}

/// One archive as printed by `list --json`
#[derive(Serialize)]
struct ArchiveListing {
    name: String,
    path: PathBuf,
    size_bytes: u64,
    modified: String,
}

impl From<&BackupRecord> for ArchiveListing {
    fn from(record: &BackupRecord) -> Self {
        Self {
            name: record.name.clone(),
            path: record.path.clone(),
            size_bytes: record.size,
            modified: DateTime::<Local>::from(record.modified).to_rfc3339(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let validating = matches!(cli.command, Some(Commands::Validate));

    // Validation never writes a default config
    let (mut config, created) = if validating {
        config::load_config(&cli.config).map(|loaded| (loaded, false))
    } else {
        config::load_or_create_config(&cli.config)
    }
    .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    if created {
        eprintln!("Created {} with default settings.", cli.config.display());
    }
    apply_cli_overrides(&mut config, &cli);

    // Everything relative (logs, backups, worlds) resolves against work_dir
    if let Some(ref work_dir) = config.global.work_dir {
        std::env::set_current_dir(work_dir)
            .with_context(|| format!("Failed to enter work_dir {:?}", work_dir))?;
    }

    // Validation only needs the console; everything else logs to file too
    // (must keep guard alive)
    let _log_guard = if validating {
        logging::init_console_logging();
        None
    } else {
        let logging_config = LoggingConfig::from_config(
            &config.global.log_directory,
            &config.global.log_level,
            config.global.log_max_files,
        );
        Some(logging::init_logging(&logging_config)?)
    };

    if let Some(ref work_dir) = config.global.work_dir {
        debug!("Working directory: {:?}", work_dir);
    }

    let manager = BackupManager::new(config.backup.clone());

    match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::Run => {
            info!("Starting backup of {} candidate world(s)", config.backup.worlds.len());

            match manager.run()? {
                BackupOutcome::NothingToBackUp => {
                    println!("No worlds found, nothing to back up");
                }
                BackupOutcome::Created(report) => {
                    println!("✓ Backup created: {}", report.archive.display());
                    println!("  {}", report.summary);
                    for removed in &report.removed {
                        println!("  Removed old backup: {}", removed.display());
                    }
                    if let Some(warning) = report.rotation_warning {
                        eprintln!("⚠ {}", warning);
                    }
                }
            }
        }

        Commands::Rotate => {
            let policy = manager.settings().retention();
            if policy.is_disabled() {
                println!("Retention is disabled (retention_count = {}), nothing to do", policy.limit);
                return Ok(());
            }

            let removed = manager.rotate().context("Rotation failed")?;
            if removed.is_empty() {
                println!("Nothing to remove (keeping up to {} backups)", policy.limit);
            } else {
                for path in &removed {
                    println!("Removed: {}", path.display());
                }
                println!("\n✓ Removed {} backup(s)", removed.len());
            }
        }

        Commands::List { json } => {
            let records = manager.list_backups()?;

            if json {
                let listing: Vec<ArchiveListing> = records.iter().map(ArchiveListing::from).collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }

            println!("Backups in {}:\n", manager.backup_dir().display());
            if records.is_empty() {
                println!("  No backups found.");
                return Ok(());
            }

            println!("  {:<36} {:<20} {:>10}", "Name", "Modified", "Size");
            println!("  {}", "-".repeat(68));
            for record in &records {
                let modified = DateTime::<Local>::from(record.modified);
                println!(
                    "  {:<36} {:<20} {:>10}",
                    record.name,
                    modified.format("%Y-%m-%d %H:%M:%S"),
                    format_size(record.size)
                );
            }
            println!("\n  Total: {} backups", records.len());
        }

        Commands::Validate => {
            let backup = manager.settings();
            println!("Configuration is valid!");
            println!("Backup directory: {}", backup.directory.display());
            println!("Worlds: {}", backup.worlds.join(", "));
            if backup.retention().is_disabled() {
                println!("Retention: disabled (keep all)");
            } else {
                println!("Retention: keep {} backups", backup.retention_count);
            }
            if let Some(ref work_dir) = config.global.work_dir {
                println!("Work dir: {}", work_dir.display());
            }
        }
    }

    Ok(())
}

/// Command-line flags win over file and environment settings
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref dir) = cli.backup_dir {
        config.backup.directory = dir.clone();
    }
    if let Some(limit) = cli.retention {
        config.backup.retention_count = limit;
    }
    if !cli.worlds.is_empty() {
        config.backup.worlds = cli.worlds.clone();
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
