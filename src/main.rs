use anyhow::Result;
use clap::Parser;
use sellsword::cli::Cli;
use sellsword::commands;

fn main() -> Result<()> {
    // Parse first so --verbose can pick the log level
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "sellsword=debug"
    } else {
        "sellsword=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // stdout is evaluated by the shell, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    commands::execute(cli)
}
