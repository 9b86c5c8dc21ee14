use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::sync::Pass;

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(
    about = "Synchronize the upstream model catalog into a relational database",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Models and categories, then associations (default)
    Sync,
    /// Models and categories only
    Catalog,
    /// Link stored models to stored categories
    Associations,
    /// Count upstream models tagged with every given category
    Count {
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },
    /// Look up one upstream model by username
    Show { username: String },
}

pub(crate) fn get_database_url() -> Result<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable must be set"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => commands::sync::run(Pass::Full).await,
        Commands::Catalog => commands::sync::run(Pass::Catalog).await,
        Commands::Associations => commands::sync::run(Pass::Associations).await,
        Commands::Count { categories } => commands::upstream::run_count(categories).await,
        Commands::Show { username } => commands::upstream::run_show(username).await,
    }
}
