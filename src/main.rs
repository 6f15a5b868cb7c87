//! Optodb CLI - command-line interface for the measurement metadata store

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use optodb::config::{self, OptodbConfig};
use optodb::ingest::{self, ImportOptions};
use optodb::storage::Database;
use optodb::{export, ui};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "optodb")]
#[command(version)]
#[command(about = "Optical measurement metadata store")]
#[command(long_about = r#"
Optodb keeps optical-measurement metadata in a local SQLite file:
  • Devices under test with wafer/DOE/die/cage/device coordinates
  • Measurement sessions, conditions and raw-data references
  • Spectral-analysis results with lineage back to their input data

Example usage:
  optodb init --database measurement_data.db
  optodb import ./20260202 --doe DOE1
  optodb stats
  optodb export --output database_export.xlsx
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and apply the schema
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Import every measurement file in a folder
    Import {
        /// Folder containing measurement files
        folder: PathBuf,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// DOE coordinate for the imported DUTs
        #[arg(long)]
        doe: Option<String>,

        /// Operator recorded on the session
        #[arg(long)]
        operator: Option<String>,

        /// Measurement-system version recorded on the session
        #[arg(long)]
        system_version: Option<String>,

        /// Free-form session notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show row counts per table
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Export every table to an xlsx workbook, one sheet per table
    Export {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output workbook path
        #[arg(short, long, default_value = "database_export.xlsx")]
        output: PathBuf,
    },

    /// Print the full nested record of one session as JSON
    Session {
        /// Session key
        id: i64,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Destroy and recreate the store
    Reset {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Required confirmation
        #[arg(long)]
        force: bool,
    },
}

fn resolve_database(flag: Option<PathBuf>, config: &OptodbConfig) -> PathBuf {
    flag.or_else(|| config.database.clone().map(PathBuf::from))
        .unwrap_or_else(config::default_database_path)
}

/// Open the store and make sure the schema exists (idempotent)
fn open_store(db_path: &Path) -> anyhow::Result<Database> {
    config::ensure_db_dir(db_path)?;
    let db = Database::open(db_path)?;
    db.create_schema()?;
    Ok(db)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = config::load_config(None)?.unwrap_or_default();

    match cli.command {
        Commands::Init { database } => {
            let db_path = resolve_database(database, &config);
            open_store(&db_path)?;
            ui::success(&format!("Database initialized at {}", db_path.display()));
        }

        Commands::Import { folder, database, doe, operator, system_version, notes } => {
            if !folder.is_dir() {
                anyhow::bail!("folder not found: {}", folder.display());
            }
            let db_path = resolve_database(database, &config);
            let db = open_store(&db_path)?;

            let defaults = ImportOptions::default();
            let options = ImportOptions {
                doe: doe.or_else(|| config.doe.clone()).unwrap_or(defaults.doe),
                operator: operator.or_else(|| config.operator.clone()).or(defaults.operator),
                system_version: system_version
                    .or_else(|| config.system_version.clone())
                    .or(defaults.system_version),
                notes,
            };

            let report = ingest::import_folder(&db, &folder, &options)?;
            for name in &report.skipped {
                ui::warn(&format!("skipped: {}", name));
            }
            ui::success(&format!(
                "Imported {} file(s) from {}, skipped {}",
                report.imported,
                folder.display(),
                report.skipped.len()
            ));
            println!("{}", ui::stats_table(&db.stats()?));
        }

        Commands::Stats { database } => {
            let db_path = resolve_database(database, &config);
            let db = open_store(&db_path)?;
            println!("{}", ui::stats_table(&db.stats()?));
        }

        Commands::Export { database, output } => {
            let db_path = resolve_database(database, &config);
            let db = open_store(&db_path)?;
            let written = export::export_workbook(&db, &output)?;
            ui::success(&format!("Exported workbook to {}", written.display()));
        }

        Commands::Session { id, database } => {
            let db_path = resolve_database(database, &config);
            let db = open_store(&db_path)?;
            match db.session_full_info(id)? {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => ui::error(&format!("No session with id {}", id)),
            }
        }

        Commands::Reset { database, force } => {
            if !force {
                anyhow::bail!("reset deletes all data; pass --force to confirm");
            }
            let db_path = resolve_database(database, &config);
            let db = open_store(&db_path)?;
            db.reset()?;
            ui::success(&format!("Database reset at {}", db_path.display()));
        }
    }

    Ok(())
}
