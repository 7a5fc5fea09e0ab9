mod app;
mod cli;
mod commands;
mod types;

use clap::Parser;

/// Entry point for the `hltools` command.
///
/// Sets up logging from `RUST_LOG` (default `warn`, or `debug` with
/// `--verbose`) and dispatches to the subcommand.
fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    app::run(cli)
}
