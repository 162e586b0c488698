//! ShelfDB CLI
//!
//! Command-line tools for inspecting and maintaining a ShelfDB directory.
//!
//! # Commands
//!
//! - `list` - List collections with their mode and size
//! - `show` - Print a collection, or the value at a deep path
//! - `verify` - Decode every collection and report corrupt files
//! - `drop` - Delete one collection
//! - `purge` - Delete every collection

mod commands;

use clap::{Parser, Subcommand};
use shelfdb_core::{Config, Database, Format};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// ShelfDB command-line database tools.
#[derive(Parser)]
#[command(name = "shelfdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Collection file format (json, cbor)
    #[arg(global = true, short, long, default_value = "json")]
    format: Format,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List collections with their mode and size
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a collection value
    Show {
        /// Collection name
        collection: String,

        /// Deep path inside the collection (e.g. "settings.volume")
        #[arg(long = "path-expr")]
        path_expr: Option<String>,

        /// Print compact JSON
        #[arg(short, long)]
        compact: bool,
    },

    /// Decode every collection and report corrupt files
    Verify,

    /// Delete one collection
    Drop {
        /// Collection name
        collection: String,
    },

    /// Delete every collection
    Purge {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::List { json } => {
            let db = open(cli.path.as_deref(), cli.format, "list")?;
            commands::list::run(&db, json)?;
        }
        Commands::Show {
            collection,
            path_expr,
            compact,
        } => {
            let db = open(cli.path.as_deref(), cli.format, "show")?;
            commands::show::run(&db, &collection, path_expr.as_deref(), compact)?;
        }
        Commands::Verify => {
            let db = open(cli.path.as_deref(), cli.format, "verify")?;
            commands::verify::run(&db)?;
        }
        Commands::Drop { collection } => {
            let db = open(cli.path.as_deref(), cli.format, "drop")?;
            commands::drop::run(&db, &collection).await?;
        }
        Commands::Purge { yes } => {
            let db = open(cli.path.as_deref(), cli.format, "purge")?;
            commands::purge::run(&db, yes).await?;
        }
        Commands::Version => {
            println!("ShelfDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ShelfDB Core v{}", shelfdb_core::VERSION);
        }
    }

    Ok(())
}

/// Opens an existing database directory for a command.
fn open(
    path: Option<&Path>,
    format: Format,
    command: &str,
) -> Result<Database, Box<dyn std::error::Error>> {
    let path = path.ok_or_else(|| format!("Database path required for {command}"))?;
    let config = Config::default().create_if_missing(false).format(format);
    Ok(Database::open_with_config(path, config)?)
}
