//! Core library surface for the student records TUI.
//!
//! The gateway in [`db`] is usable on its own; the [`ui`] module is one
//! consumer of it.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;
pub mod validation;

/// The persistence entry points used by `main.rs` and the integration tests.
pub use db::{Gateway, MySqlBackend, SqliteBackend, StudentBackend};

pub use config::{Config, ServerConfig, StoreConfig};
pub use error::{GatewayError, GatewayResult, ValidationError};
pub use models::{Course, Student};
pub use validation::ValidationRules;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
