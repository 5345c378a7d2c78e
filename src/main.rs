use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gleaner::commands;
use gleaner::config::Config;

#[derive(Parser)]
#[command(
    name = "gleaner",
    version,
    about = "Contact harvester for hackathon listings, GitHub stargazers and club directories",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest a hackathon participant listing
    Participants {
        /// Participant listing URL
        url: String,

        /// Maximum number of records to harvest
        #[arg(short, long, default_value = "5000")]
        max: usize,

        /// Number of records to skip from the front of the listing
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Items between partial checkpoints (defaults to config)
        #[arg(long)]
        checkpoint_interval: Option<usize>,

        /// Fetch each participant's profile page for contact details
        #[arg(long, default_value = "false")]
        with_contacts: bool,

        /// Output directory
        #[arg(long, default_value = "output")]
        output: PathBuf,

        /// Resume from saved session state
        #[arg(long, default_value = "false")]
        resume: bool,
    },

    /// Harvest the stargazers of a GitHub repository
    Stargazers {
        /// Repository as owner/name
        repo: String,

        /// Page ceiling for the walk (defaults to config)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Skip fetching each stargazer's profile for contact details
        #[arg(long, default_value = "false")]
        no_profiles: bool,

        /// Output directory
        #[arg(long, default_value = "output")]
        output: PathBuf,
    },

    /// Enrich a previous export with GitHub profile data
    Enrich {
        /// JSON export to enrich
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "output")]
        output: PathBuf,
    },

    /// Discover and validate university club directories
    Clubs {
        /// Search-results URLs to scan
        urls: Vec<String>,

        /// File with one search-results URL per line
        #[arg(long)]
        input: Option<PathBuf>,

        /// Keep candidates without fetching them to confirm they render
        /// an organization listing
        #[arg(long, default_value = "false")]
        no_validate: bool,

        /// Keep at most this many ranked directories
        #[arg(long)]
        max: Option<usize>,

        /// Output directory
        #[arg(long, default_value = "output")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    setup_tracing(
        config.logging.effective_format(cli.log_format.as_deref()),
        config.logging.effective_level(cli.verbose),
    )?;

    tracing::info!("gleaner starting");

    match cli.command {
        Commands::Participants {
            url,
            max,
            offset,
            checkpoint_interval,
            with_contacts,
            output,
            resume,
        } => {
            tracing::info!(
                url = %url,
                max = %max,
                offset = %offset,
                resume = %resume,
                "Starting participants command"
            );
            commands::participants(
                config,
                url,
                max,
                offset,
                checkpoint_interval,
                with_contacts,
                output,
                resume,
            )
            .await?;
        }

        Commands::Stargazers {
            repo,
            max_pages,
            no_profiles,
            output,
        } => {
            tracing::info!(repo = %repo, profiles = !no_profiles, "Starting stargazers command");
            commands::stargazers(config, repo, max_pages, !no_profiles, output).await?;
        }

        Commands::Enrich { input, output } => {
            tracing::info!(input = %input.display(), "Starting enrich command");
            commands::enrich(config, input, output).await?;
        }

        Commands::Clubs {
            urls,
            input,
            no_validate,
            max,
            output,
        } => {
            tracing::info!(
                urls = urls.len(),
                validate = !no_validate,
                "Starting clubs command"
            );
            commands::clubs(config, urls, input, !no_validate, max, output).await?;
        }
    }

    tracing::info!("gleaner completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(format!("gleaner={level},warn"));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
