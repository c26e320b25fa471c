mod config;
mod feed;
mod history;
mod poster;
mod twitter;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use feed::FeedFetcher;
use history::RecentUrls;
use poster::{DryRun, Publisher};
use tracing_subscriber::prelude::*;
use twitter::TwitterClient;

/// Tweets new entries from an Atom feed.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Dotenv files to load before reading the environment.
    env_files: Vec<PathBuf>,

    /// Log what would be posted instead of posting it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with env-declared filters.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "feed_tweeter=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    //
    // Load configuration.
    // Variables already set in the environment win over the dotenv files.
    for path in &cli.env_files {
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load env file {}", path.display()))?;
    }

    let mut config = config::Config::from_env().context("Invalid configuration")?;
    config.dry_run = cli.dry_run;
    tracing::debug!("Configuration: {config:?}");

    //
    // Find out what was already tweeted.
    let client = TwitterClient::new(&config.credentials, config.api_url.clone())
        .context("Failed to create Twitter client")?;
    let recent = RecentUrls::fetch(&client, config.user_id, config.max_statuses).await?;

    //
    // Retrieve the feed and pick what to post.
    let entries = FeedFetcher::new()?.fetch(&config.feed_url).await?;
    let entries = feed::select_entries(entries, config.max_entries);
    tracing::info!("Considering {} entries", entries.len());

    //
    // Post, oldest first.
    let publisher: &dyn Publisher = if config.dry_run { &DryRun } else { &client };
    let summary = poster::post_entries(&entries, &recent, &config.template, publisher).await?;

    tracing::info!(
        "Done: {} posted, {} already posted, {} duplicates, {} without link",
        summary.posted,
        summary.already_posted,
        summary.duplicate,
        summary.no_link
    );

    Ok(())
}
