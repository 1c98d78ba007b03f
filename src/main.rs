use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "khata-engage")]
#[command(about = "Achievements, streaks, daily challenges and leaderboards for your shop")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.khata/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and seed the engagement database
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show level, points, streak and today's challenges
    Status,

    /// Record today's app open
    CheckIn,

    /// Report current app metrics
    Record(cli::record::RecordArgs),

    /// Show today's daily challenges
    Challenges,

    /// List achievements
    Achievements {
        /// Show only unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },

    /// Show a ranked leaderboard
    Leaderboard {
        /// global, city or friends
        #[arg(long, default_value = "global")]
        scope: String,
    },

    /// Delete all engagement progress
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Init { force }) => {
            cli::init::init_command(config_path, force).await?;
        }
        Some(Commands::Status) | None => {
            cli::status::status_command(config_path).await?;
        }
        Some(Commands::CheckIn) => {
            cli::checkin::check_in_command(config_path).await?;
        }
        Some(Commands::Record(args)) => {
            cli::record::record_command(config_path, args).await?;
        }
        Some(Commands::Challenges) => {
            cli::challenges::challenges_command(config_path).await?;
        }
        Some(Commands::Achievements { unlocked }) => {
            cli::achievements::achievements_command(config_path, unlocked).await?;
        }
        Some(Commands::Leaderboard { scope }) => {
            cli::leaderboard::leaderboard_command(config_path, &scope).await?;
        }
        Some(Commands::Reset { yes }) => {
            cli::reset::reset_command(config_path, yes).await?;
        }
    }

    Ok(())
}
