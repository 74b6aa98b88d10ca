//! Core library surface for the 자소서 (job application essay) manager.
//!
//! Everything the TUI does goes through [`Workspace`], so the headless
//! subcommands in `main.rs` and the integration tests drive the same code.
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod logging;
pub mod merge;
pub mod models;
pub mod search;
pub mod ui;
pub mod workspace;

/// Text and row transforms.
pub use codec::{export_rows, format_text, import_rows, parse_text, parse_text_checked, QuestionRow};

pub use config::Config;
pub use error::{CoreError, Result, ValidationError};
pub use merge::{merge_into, MergeOutcome};

/// The two domain types every layer manipulates.
pub use models::{CompanyStore, PartialStore, Record};

pub use search::{search, SearchReport};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

pub use workspace::{SaveTarget, Workspace};
