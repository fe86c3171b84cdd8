//! Mesh command-line tool
//!
//! Inspects and edits the sections, blocks and meta kept in a Mesh store.
//!
//! Usage:
//!   mesh show 12
//!   mesh create-section --page 4 --title Intro --template mcs-columns-2.php
//!   mesh meta set 12 _mcs_collapse 1

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mesh_cli::{commands, MeshConfig};
use mesh_model::{DataStore, MeshObject};
use mesh_storage::SqliteStore;
use mesh_types::ObjectId;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mesh")]
#[command(about = "Inspect and edit Mesh sections and blocks")]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "mesh.toml")]
    config: PathBuf,

    /// Database file, overriding the config
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an object as JSON
    Show { id: ObjectId },

    /// Create a section and its blocks
    CreateSection {
        /// Page the section belongs to
        #[arg(long)]
        page: ObjectId,

        #[arg(long, default_value = "")]
        title: String,

        /// Template file name or column count
        #[arg(long, default_value = "1")]
        template: String,
    },

    /// Edit object meta
    Meta {
        #[command(subcommand)]
        action: MetaAction,
    },
}

#[derive(Subcommand, Debug)]
enum MetaAction {
    /// Set a key, replacing earlier values
    Set { id: ObjectId, key: String, value: String },
    /// Delete every value under a key
    Delete { id: ObjectId, key: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = MeshConfig::load_from(&args.config);

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let db = args.db.unwrap_or(config.storage.path);
    debug!("Using database {}", db.display());
    let store: Arc<dyn DataStore> = Arc::new(
        SqliteStore::open(&db).with_context(|| format!("Failed to open database {}", db.display()))?,
    );

    match args.command {
        Command::Show { id } => {
            let value = commands::show(store, id).with_context(|| format!("Failed to show {id}"))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::CreateSection { page, title, template } => {
            let (section, blocks) = commands::create_section(store, page, &title, &template)
                .context("Failed to create section")?;
            println!("{}", section.get_id());
            for block in &blocks {
                println!("  block {} (width {})", block.get_id(), block.column_width());
            }
        }
        Command::Meta { action: MetaAction::Set { id, key, value } } => {
            commands::set_meta(store, id, &key, &value)
                .with_context(|| format!("Failed to set {key} on {id}"))?;
            info!("Set {} on {}", key, id);
        }
        Command::Meta { action: MetaAction::Delete { id, key } } => {
            let removed = commands::delete_meta(store, id, &key)
                .with_context(|| format!("Failed to delete {key} on {id}"))?;
            if !removed {
                info!("No {} on {}", key, id);
            }
        }
    }

    Ok(())
}
