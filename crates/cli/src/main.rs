//! GitDash CLI
//!
//! Renders a GitHub profile dashboard in the terminal and runs the web API.

mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use gitdash_analyzer::{generate_insight, DashboardSummary, OllamaGenerator};
use gitdash_api::{create_router, AppState};
use gitdash_collector::{Aggregate, GithubClient, ProfileAggregator};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "gd")]
#[command(about = "GitDash - GitHub profile dashboard")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./gitdash.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard for a GitHub user
    Show {
        /// GitHub username
        username: String,

        /// Print the aggregate and summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a profile analysis for a GitHub user
    Insight {
        /// GitHub username
        username: String,
    },

    /// Start the web server
    Serve {
        /// Address to bind to
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Static files directory
        #[arg(short, long)]
        static_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Show { username, json } => {
            show(&config, &username, json).await?;
        }
        Commands::Insight { username } => {
            insight(&config, &username).await?;
        }
        Commands::Serve { bind, static_dir } => {
            serve(config, bind, static_dir).await?;
        }
    }

    Ok(())
}

fn build_aggregator(config: &Config) -> Result<ProfileAggregator> {
    if config.github.github_token.is_none() {
        warn!("GITHUB_TOKEN not set. API rate limits will be restricted.");
    }

    let client = GithubClient::new(config.github.clone())
        .context("Failed to create GitHub client")?;
    Ok(ProfileAggregator::new(Arc::new(client)))
}

#[derive(Serialize)]
struct JsonDashboard<'a> {
    aggregate: &'a Aggregate,
    summary: &'a DashboardSummary,
}

async fn show(config: &Config, username: &str, json: bool) -> Result<()> {
    let aggregator = build_aggregator(config)?;
    let aggregate = aggregator.aggregate(username).await?;
    let summary = DashboardSummary::build(&aggregate, chrono::Utc::now());

    if json {
        let output = JsonDashboard {
            aggregate: &aggregate,
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::render_dashboard(&summary)?);
    }

    Ok(())
}

async fn insight(config: &Config, username: &str) -> Result<()> {
    let aggregator = build_aggregator(config)?;
    let generator = OllamaGenerator::new(config.insight.clone())?;

    let aggregate = aggregator.aggregate(username).await?;
    println!("Analyzing {}...\n", aggregate.user.display_name());

    let text = generate_insight(&generator, &aggregate).await?;
    println!("{}", text);

    Ok(())
}

async fn serve(config: Config, bind: Option<SocketAddr>, static_dir: Option<PathBuf>) -> Result<()> {
    let bind = bind.unwrap_or(config.server.bind);
    let static_dir = static_dir.or_else(|| config.server.static_dir.clone());

    let mut state = AppState::new(build_aggregator(&config)?);
    if config.server.insight {
        state = state.with_generator(Arc::new(OllamaGenerator::new(config.insight.clone())?));
    }

    let router = create_router(Arc::new(state), static_dir.clone());

    info!("Starting GitDash server on {}", bind);
    if let Some(ref dir) = static_dir {
        info!("Serving static files from {}", dir.display());
    }
    info!("API available at http://{}/api/v1", bind);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
