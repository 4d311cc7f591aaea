//! Ralph CLI - workflow engine for agent-driven issue pipelines

use clap::Parser;
use ralph_engine::cli::{Cli, Commands};
use ralph_engine::errors::to_exit_code;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the level follows --verbose / --quiet
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::debug!(code = e.code(), "command failed");
            eprintln!("Error: {}", e);
            std::process::exit(to_exit_code(&e));
        }
    }
}

fn run(cli: Cli) -> ralph_engine::Result<()> {
    let cwd = cli.cwd.as_deref();
    let json = cli.json;
    match cli.command {
        Commands::States { export } => {
            ralph_engine::cli::commands::states::run(cwd, json, export.as_deref())
        }
        Commands::Transition { from, to } => {
            ralph_engine::cli::commands::transition::run(cwd, &from, &to, json)
        }
        Commands::Resolve { input, command } => {
            ralph_engine::cli::commands::resolve::run(cwd, &input, &command, json)
        }
        Commands::Pipeline {
            file,
            group_primary,
        } => ralph_engine::cli::commands::pipeline::run(cwd, &file, group_primary, json),
        Commands::Streams { file, positions } => {
            ralph_engine::cli::commands::streams::run(cwd, &file, positions.as_deref(), json)
        }
        Commands::Route { issue, config } => {
            ralph_engine::cli::commands::route::run(cwd, &issue, config.as_deref(), json)
        }
        Commands::ValidateConfig {
            config,
            live,
            states_file,
        } => ralph_engine::cli::commands::validate_config::run(
            cwd,
            config.as_deref(),
            live,
            states_file.as_deref(),
            json,
        ),
    }
}
