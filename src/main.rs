use anyhow::Result;
use clap::Parser;
use fxledger::Config;
use fxledger::cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Logs go to stderr so command output stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fxledger=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Reads .env before the log filter looks at RUST_LOG
    let config = Config::from_env()?;
    init_tracing();

    let cli = Cli::parse();
    cli.run(config).await
}
