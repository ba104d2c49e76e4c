mod cli;
mod commands;
mod infra;
mod session;
mod shared;
#[cfg(test)]
mod testing;

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use session::Session;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `UPS_LOG=debug`.
const LOG_ENV: &str = "UPS_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("upsource_cli=debug,warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut session = Session::new(cli.config);

    match cli.command {
        Commands::Config(cmd) => cmd.run(&session)?,
        Commands::Review(cmd) => cmd.run(&mut session).await?,
        Commands::Branch(cmd) => cmd.run(&session).await?,
        Commands::Revision(cmd) => cmd.run(&mut session).await?,
        Commands::User(cmd) => cmd.run(&session).await?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ups", &mut io::stdout());
        }
    }

    Ok(())
}
