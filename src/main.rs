//! Binary entry point: read configuration, start file logging, open the
//! configured store, and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use student_records::{logging::init_logging, run_app, App, Config, Gateway};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    let log_path = init_logging(&config.log_dir)?;

    let gateway = Gateway::open(&config.store, config.rules.clone()).with_context(|| {
        format!(
            "failed to open the student store (details in {})",
            log_path.display()
        )
    })?;
    tracing::info!(backend = %gateway.describe(), "student store ready");

    let mut app = App::new(gateway);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal session ended with an error");
    }
    result
}
