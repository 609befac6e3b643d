// pricefeed/src/main.rs

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use pricefeed::cli::{Cli, Commands};
use pricefeed::commands;

#[tokio::main]
async fn main() {
    // RUST_LOG=debug pricefeed load ... for details
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { project_dir } => commands::fetch::execute(project_dir).await,
        Commands::Transform { project_dir } => commands::transform::execute(project_dir).await,
        Commands::Load { project_dir } => commands::load::execute(project_dir).await,
        Commands::Run { project_dir } => commands::run::execute(project_dir).await,
        Commands::Serve { project_dir, addr } => commands::serve::execute(project_dir, addr).await,
        Commands::Top { project_dir, limit } => commands::top::execute(project_dir, limit).await,
        Commands::Search {
            project_dir,
            min,
            max,
        } => commands::search::execute(project_dir, min, max).await,
        Commands::Snapshots { project_dir, stage } => {
            commands::snapshots::execute(project_dir, stage.into())
        }
    };

    if let Err(e) = result {
        eprintln!("\n💥 {:#}", e);
        std::process::exit(1);
    }
}
