mod cli;

use clap::Parser;
use cli::Cli;
use heartbleed_probe::engine::Engine;
use heartbleed_probe::output::OutputChannel;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = cli.into_config()?;

    let output = OutputChannel::new(cfg.output.clone())?;
    let mut engine = Engine::new(cfg, output)?;
    let summary = engine.run().await?;

    tracing::info!(
        vulnerable = summary.vulnerable,
        not_vulnerable = summary.not_vulnerable,
        unknown = summary.unknown,
        "scan finished"
    );

    if summary.vulnerable > 0 {
        std::process::exit(2);
    }
    Ok(())
}
