use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use favicon_resolver::{
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    models::{BookmarkExport, DisplayDirective, DisplayState, FallbackTile, ResolutionOutcome},
    services::{
        CloudinaryStore, FaviconService, FileIconStore, GoogleFaviconProvider, IconProvider,
        RemoteIconStore,
    },
    utils::{UrlUtils, color_for_domain},
};

#[derive(Parser)]
#[command(name = "favicon-resolver")]
#[command(version)]
#[command(about = "Resolve, cache and publish the best available favicon for a URL")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level
    #[arg(short = 'v', long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the icon for one URL and print the display directive
    Resolve {
        url: String,

        /// Title used for the fallback letter when the URL has no domain
        #[arg(short, long, default_value = "")]
        title: String,

        /// Print the directive as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve every bookmark in an export file, filling the cache
    Warm {
        file: PathBuf,

        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },
    /// Show the domain, color and fallback letter derived from a URL
    Domain { url: String },
    /// Publish the high resolution provider icon for a bookmark URL
    Seed { url: String },
    /// Show size of the local icon cache
    CacheStats,
    /// Write a default configuration file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("favicon_resolver={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Command::InitConfig = cli.command {
        Config::write_default(&cli.config)?;
        println!("{}", cli.config.display());
        return Ok(());
    }

    let config = Config::load_from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Resolve { url, title, json } => resolve(&config, &url, &title, json).await,
        Command::Warm { file, concurrency } => warm(&config, &file, concurrency).await,
        Command::Domain { url } => {
            let domain = UrlUtils::get_domain(&url);
            let tile = FallbackTile::for_input(&domain, "");
            println!("domain: {domain}");
            println!("color:  {}", color_for_domain(&domain));
            println!("letter: {}", tile.letter);
            if !domain.is_empty() {
                let store =
                    CloudinaryStore::new(config.remote_store.clone(), reqwest::Client::new());
                let google = GoogleFaviconProvider::new(config.providers.google_size);
                println!("remote: {}", store.fetch_url(&domain));
                println!("proxy:  {}", store.fetch_proxy_url(&google.icon_url(&domain)));
            }
            Ok(())
        }
        Command::Seed { url } => {
            let service = FaviconService::from_config(&config).await?;
            let receipt = service.seed_remote(&url).await?;
            println!("{} -> {}", receipt.public_id, receipt.secure_url);
            Ok(())
        }
        Command::CacheStats => {
            let store = FileIconStore::open(&config.cache.path).await?;
            let stats = store.stats().await?;
            println!("path:    {}", store.root().display());
            println!("entries: {}", stats.entries);
            println!("bytes:   {}", stats.total_bytes);
            Ok(())
        }
        Command::InitConfig => Ok(()),
    }
}

async fn resolve(config: &Config, url: &str, title: &str, json: bool) -> Result<()> {
    let service = FaviconService::from_config(config).await?;
    let resolver = service.resolver();

    let outcome = resolver.resolve(url, title).await;
    resolver.flush().await;

    let directive = match outcome {
        ResolutionOutcome::Applied(state) => state.directive(),
        ResolutionOutcome::Superseded => resolver.state().await.directive(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&directive)?);
    } else {
        match &directive {
            DisplayDirective::Loading => println!("loading"),
            DisplayDirective::Image { src, cached, .. } if *cached => println!("cached {src}"),
            DisplayDirective::Image { src, .. } => println!("image {src}"),
            DisplayDirective::Fallback { letter, color } => println!("fallback {letter} {color}"),
        }
    }
    Ok(())
}

async fn warm(config: &Config, file: &Path, concurrency: usize) -> Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let export = BookmarkExport::from_json(&contents)
        .with_context(|| format!("parsing {}", file.display()))?;
    if let Some(version) = export.version() {
        info!("Bookmark export version {}", version);
    }
    let bookmarks: Vec<_> = export
        .into_bookmarks()
        .into_iter()
        .filter(|b| !b.url().is_empty())
        .collect();

    let service = FaviconService::from_config(config).await?;
    info!("Warming icons for {} bookmarks", bookmarks.len());

    let outcomes: Vec<ResolutionOutcome> = stream::iter(bookmarks)
        .map(|bookmark| {
            let resolver = service.resolver();
            async move {
                let outcome = resolver
                    .resolve(bookmark.url(), bookmark.display_title())
                    .await;
                resolver.flush().await;
                outcome
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let (mut resolved, mut fallback) = (0usize, 0usize);
    for outcome in &outcomes {
        match outcome.state() {
            Some(DisplayState::Resolved(_)) => resolved += 1,
            Some(DisplayState::Fallback(_)) => fallback += 1,
            other => warn!("Unexpected warm outcome: {:?}", other),
        }
    }

    println!("resolved: {resolved}");
    println!("fallback: {fallback}");
    Ok(())
}
