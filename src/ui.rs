//! Ratatui front-end: a company list beside the selected company's
//! questions, with modal forms for editing and file prompts.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
