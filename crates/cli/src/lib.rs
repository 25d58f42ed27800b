pub mod cli;
pub mod commands;
pub mod config;
pub mod edits;
pub mod logging;

use anyhow::{Context, Result};

pub use listmgr_core as core;
pub use listmgr_core::AppConfig;

/// Execute a parsed command on an internal Tokio runtime, writing to stdout.
pub fn run(cli: cli::Cli) -> Result<()> {
    logging::init_tracing(&cli.log_filter)?;
    let config = config::from_cli(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    runtime.block_on(commands::execute(&config, cli.command, &mut handle))
}
