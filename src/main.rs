use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};

mod app;
mod changes;
mod config;
mod error;
mod feed;
mod models;
mod services;
mod store;

use app::App;
use config::Config;
use error::Result;
use feed::{PendingQueue, Registry};
use store::{load_document, save_document};

#[derive(Debug, Parser)]
#[command(name = "sitewatch", version, about = "Watch web pages and record what changed")]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check every registered source once (the default)
    Crawl,
    /// Queue a page to be merged into the registry
    Add {
        url: String,
        #[arg(long)]
        title: Option<String>,
        /// CSS selector of the region to watch
        #[arg(long)]
        selector: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Merge queued pages into the registry
    Merge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Crawl) {
        Command::Crawl => crawl(&config).await,
        Command::Add {
            url,
            title,
            selector,
            tags,
        } => add(&config, &url, title, selector, tags),
        Command::Merge => merge(&config),
    }
}

async fn crawl(config: &Config) -> Result<()> {
    let mut app = App::new(config)?;
    let report = app.crawl(Utc::now()).await;
    app.save()?;

    println!(
        "Updated {} of {} sources ({} skipped)",
        report.updated.len(),
        report.total(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.id, skipped.reason);
    }
    Ok(())
}

fn add(
    config: &Config,
    url: &str,
    title: Option<String>,
    selector: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let registry: Registry = load_document(&config.registry_path())?;
    if registry.contains_url(url) {
        tracing::warn!("{} is already registered", url);
    }

    let tags: BTreeSet<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let pending_path = config.pending_path();
    let mut queue: PendingQueue = load_document(&pending_path)?;
    let queued = queue.push(url, title, selector, tags, Utc::now())?.url.clone();
    save_document(&pending_path, &queue)?;

    println!("Queued {} ({} pending)", queued, queue.len());
    Ok(())
}

fn merge(config: &Config) -> Result<()> {
    let registry_path = config.registry_path();
    let pending_path = config.pending_path();

    let mut registry: Registry = load_document(&registry_path)?;
    let mut queue: PendingQueue = load_document(&pending_path)?;
    if queue.is_empty() {
        println!("Nothing to merge");
        return Ok(());
    }

    let report = queue.merge_into(&mut registry, Utc::now());
    save_document(&registry_path, &registry)?;
    save_document(&pending_path, &queue)?;

    println!(
        "Merged {} sources ({} already registered)",
        report.added.len(),
        report.duplicates.len()
    );
    for id in &report.added {
        println!("  added {}", id);
    }
    Ok(())
}
