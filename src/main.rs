//! Binary entry point. Without a subcommand it opens the TUI, optionally
//! preloading a file; the subcommands run one conversion or search and exit.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jasoseo_manager::logging::{self, LogTarget};
use jasoseo_manager::{run_app, App, Config, ValidationError, Workspace};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "jasoseo-manager", version)]
#[command(about = "Manage job application essays per company", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text or SQLite file to open on startup
    file: Option<PathBuf>,

    /// Directory for default save paths and the log file
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. debug)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search every record in a text or SQLite file
    Search {
        file: PathBuf,
        query: String,
    },

    /// Convert a text file into a SQLite export
    ToSql {
        text: PathBuf,
        db: PathBuf,
    },

    /// Convert a SQLite export into a text file
    FromSql {
        db: PathBuf,
        text: PathBuf,

        /// Write only this company
        #[arg(long)]
        company: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir, cli.log_level)?;

    match cli.command {
        None => {
            logging::init(&config, LogTarget::File)?;
            run_tui(&config, cli.file)
        }
        Some(command) => {
            logging::init(&config, LogTarget::Stderr)?;
            run_command(&config, command)
        }
    }
}

fn run_tui(config: &Config, file: Option<PathBuf>) -> Result<()> {
    let mut workspace = Workspace::new(config.data_dir.clone());
    if let Some(path) = file {
        // A bad preload should not keep the editor from opening.
        if let Err(err) = workspace.load_path(&path) {
            warn!(path = %path.display(), error = %err, "could not preload file");
        }
    }

    info!(data_dir = %config.data_dir.display(), "starting TUI");
    let mut app = App::new(workspace);
    run_app(&mut app)
}

fn run_command(config: &Config, command: Commands) -> Result<()> {
    let mut workspace = Workspace::new(config.data_dir.clone());
    match command {
        Commands::Search { file, query } => {
            workspace
                .load_path(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            println!("{}", workspace.search(&query).render());
        }
        Commands::ToSql { text, db } => {
            workspace
                .load_text_file(&text)
                .with_context(|| format!("failed to load {}", text.display()))?;
            let rows = workspace
                .export_sql(&db)
                .with_context(|| format!("failed to export {}", db.display()))?;
            println!("{rows} records written to {}", db.display());
        }
        Commands::FromSql { db, text, company } => {
            workspace
                .load_sql_file(&db)
                .with_context(|| format!("failed to import {}", db.display()))?;
            match company {
                Some(name) => {
                    if !workspace.select_company(&name) {
                        return Err(ValidationError::UnknownCompany(name).into());
                    }
                    workspace.save_company_to_file(&text)?;
                }
                None => workspace.save_all_as(&text)?,
            }
            println!("written to {}", text.display());
        }
    }
    Ok(())
}
