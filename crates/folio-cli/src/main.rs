use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config_cmds;
mod hints_cmd;
mod page_view;
mod scan_cmd;
mod simulate_cmd;
mod warm_cmd;

use cli::{Cli, Commands, ConfigCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; -v only changes the fallback level.
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    let output_format = cli.format.clone();
    let cd = cli.cd;

    match cli.command {
        Commands::Warm {
            base_url,
            page,
            no_idle,
            max_concurrent,
        } => {
            warm_cmd::handle_warm(cd, base_url, page, no_idle, max_concurrent, output_format)
                .await?;
        }
        Commands::Hints { page, no_idle } => {
            hints_cmd::handle_hints(cd, page, no_idle, output_format).await?;
        }
        Commands::Simulate { script } => {
            simulate_cmd::handle_simulate(cd, script, output_format).await?;
        }
        Commands::Scan { files } => {
            scan_cmd::handle_scan(cd, files, output_format)?;
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => config_cmds::handle_config_show(cd, output_format)?,
            ConfigCommands::Validate => config_cmds::handle_config_validate(cd)?,
            ConfigCommands::Init { force } => config_cmds::handle_config_init(cd, force)?,
        },
    }

    Ok(())
}
