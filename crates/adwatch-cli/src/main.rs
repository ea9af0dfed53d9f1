mod run;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adwatch")]
#[command(about = "Watch classified-ad listing pages and post new listings to a webhook")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll every source repeatedly until the run budget is spent (default)
    Run {
        /// Log new listings instead of posting them to the webhook
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a single pass and exit
    Once {
        /// Log new listings instead of posting them to the webhook
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate configuration and the source list without fetching anything
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = adwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => run::run_loop(&config, dry_run).await?,
        Commands::Once { dry_run } => run::run_single(&config, dry_run).await?,
        Commands::Check => run::check(&config).await?,
    }

    Ok(())
}
