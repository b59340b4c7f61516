use clap::Parser;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    config::init_tracing(cli.verbose);
    commands::run_command(cli)
}
