use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use media_enricher::apis::factory::create_adapter;
use media_enricher::app::ports::PageFetcher;
use media_enricher::config::Config;
use media_enricher::infra::{JsonFileCatalog, ReqwestFetcher};
use media_enricher::logging;
use media_enricher::{EnrichedCatalog, Enricher, MediaService, Platform, ResponseCache};

#[derive(Parser)]
#[command(name = "media_enricher")]
#[command(about = "Attach external ratings and reviews to a media catalog")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file (defaults apply when it is missing)
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich every entry of a catalog file and print the result as JSON
    Enrich {
        /// Catalog JSON: { "<category>": [entry, ...] }
        #[arg(long)]
        catalog: PathBuf,
        /// Write the enriched catalog here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Run a single platform adapter against one URL
    Scrape {
        /// aggregator, filmdb or reviews
        #[arg(long)]
        platform: Platform,
        #[arg(long)]
        url: String,
    },
    /// Print the effective configuration
    CheckConfig,
}

fn log_failures(catalog: &EnrichedCatalog) {
    let mut failed = 0;
    for (category, entries) in catalog {
        for entry in entries {
            for (platform, meta) in &entry.remote {
                if let Some(error) = meta.error() {
                    failed += 1;
                    warn!(category = %category, id = %entry.entry.id, platform = %platform, error, "No rating data");
                }
            }
        }
    }
    info!(failed, "Enrichment finished");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let _log_guard = logging::init_logging(&config.logging);

    let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestFetcher::new(&config.fetcher)?);

    match cli.command {
        Commands::Enrich {
            catalog,
            output,
            pretty,
        } => {
            let cache = Arc::new(ResponseCache::new(Duration::from_millis(config.cache.ttl_ms)));
            let service = MediaService::new(
                Arc::new(JsonFileCatalog::new(catalog)),
                Enricher::with_fetcher(fetcher, cache),
            );

            let enriched = service.get_all_media().await?;
            log_failures(&enriched);

            let json = if pretty {
                serde_json::to_string_pretty(&enriched)?
            } else {
                serde_json::to_string(&enriched)?
            };
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "Enriched catalog written");
                }
                None => println!("{json}"),
            }
        }
        Commands::Scrape { platform, url } => {
            let adapter = create_adapter(platform, fetcher);
            let meta = adapter.scrape(&url).await;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Commands::CheckConfig => {
            println!("{:#?}", config);
        }
    }

    Ok(())
}
