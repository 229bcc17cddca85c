use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wsync_cli::commands::{duration, plan, sync};
use wsync_cli::{Cli, Commands, Config, connect};

fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support; stdout is reserved for reports
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout();
    match &cli.command {
        Some(Commands::Duration { values }) => {
            // Pure arithmetic; no config or network needed
            duration::run(&mut stdout, values)?;
        }
        Some(Commands::Plan(args)) => {
            let config = load_config(&cli)?;
            let synchronizer = connect::synchronizer(&config)?;
            let window = connect::window(&config, args.window.days);
            let cancel = connect::cancel_on_ctrl_c();
            plan::run(&mut stdout, &synchronizer, window, args.window.json, &cancel).await?;
        }
        Some(Commands::Sync(args)) => {
            let config = load_config(&cli)?;
            let synchronizer = connect::synchronizer(&config)?;
            let window = connect::window(&config, args.window.days);
            let cleanup_orphaned = args.cleanup_orphaned || config.sync.cleanup_orphaned;
            let cancel = connect::cancel_on_ctrl_c();
            sync::run(
                &mut stdout,
                &synchronizer,
                window,
                args,
                cleanup_orphaned,
                &cancel,
            )
            .await?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
