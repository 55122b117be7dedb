//! Ratatui front-end: a table of students with insert, edit, delete and
//! search dialogs layered on top.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
