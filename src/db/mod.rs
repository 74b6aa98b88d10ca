//! SQLite persistence for the `questions` table, split across logical
//! submodules.

mod connection;
mod questions;

pub use connection::{open_export_target, open_import_source};
pub use questions::{fetch_questions, replace_questions};
