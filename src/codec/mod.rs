//! Stateless transforms between the in-memory store and its two on-disk
//! shapes: the tagged text format and flat `questions` rows.

pub mod sql;
pub mod text;

pub use sql::{export_rows, import_rows, QuestionRow};
pub use text::{format_text, parse_text, parse_text_checked};
