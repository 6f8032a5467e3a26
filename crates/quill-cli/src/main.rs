mod flows;
mod topics;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "quill-cli")]
#[command(about = "Quill content pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Upsert topics from a YAML seed file
    SeedTopics {
        /// Seed file path (defaults to `QUILL_TOPICS_PATH`)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Run the write flow once
    Write {
        /// Claim this specific topic instead of the next ready one
        #[arg(long)]
        topic: Option<i64>,
    },
    /// Run the publish flow once
    Publish,
    /// Run the write flow and then the publish flow
    Run,
    /// Ask the generation backend for new topic ideas
    Suggest,
    /// Turn a one-line idea into a ready topic
    Investigate {
        /// The idea to research
        idea: String,
        /// Claim priority of the created topic (higher is claimed first)
        #[arg(long, default_value = "0")]
        priority: i32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("quill-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = quill_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = quill_db::PoolConfig::from_app_config(&config);
    let pool = quill_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = quill_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::SeedTopics { path } => {
            let path = path.unwrap_or_else(|| config.topics_path.clone());
            topics::run_seed_topics(&pool, &path).await
        }
        Commands::Write { topic } => flows::run_write(pool, &config, topic).await,
        Commands::Publish => flows::run_publish(pool, &config).await,
        Commands::Run => flows::run_invocation(pool, &config).await,
        Commands::Suggest => topics::run_suggest(&config).await,
        Commands::Investigate { idea, priority } => {
            topics::run_investigate(&pool, &config, &idea, priority).await
        }
    }
}
