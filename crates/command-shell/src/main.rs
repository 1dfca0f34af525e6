//! Command shell - main entry point.

use anyhow::Context;
use command_shell::{commands, shell, AppResult, CommandAdapter, Config, OutputFormat};
use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.shell.log_level, config.shell.output == OutputFormat::Json);

    info!("Starting command shell...");

    let modules = commands::all();
    let adapter = CommandAdapter::new(&modules, &config.shell)?;

    info!(
        "Type {}help for a list of commands (user={}, channel={})",
        config.shell.prefix, config.identity.user, config.identity.channel
    );

    let handled = shell::run(
        &adapter,
        &config.identity,
        config.shell.output,
        BufReader::new(io::stdin()),
        io::stdout(),
    )
    .await?;

    info!("Shutting down after {} commands", handled);
    Ok(())
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // Replies go to stdout; keep logs on stderr.
    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}
