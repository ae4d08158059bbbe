//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::llm::OllamaClient;
use crate::models::{PlaceDetails, StaticPlaceDirectory};
use crate::repository::MenuRepository;
use crate::scrapers::{BrowserConfig, BrowserFetcher, HttpClient};
use crate::services::AcquisitionService;

#[derive(Parser)]
#[command(name = "menuac", version, about = "Restaurant menu acquisition pipeline")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "MENUACQUIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Acquire (or re-acquire) the menu for a place
    Acquire {
        /// Opaque place identifier
        place_id: String,

        /// Skip the cache read and force a fresh scrape
        #[arg(long)]
        no_cache: bool,

        /// The place's website, when known
        #[arg(long)]
        website: Option<String>,

        /// An explicitly known menu URL (skips discovery probing)
        #[arg(long)]
        menu_url: Option<String>,
    },

    /// Print the stored menu record for a place
    Show {
        place_id: String,
    },
}

/// Check verbosity before clap parses, so logging can be initialized first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    config.ensure_data_dir()?;
    let repo = Arc::new(MenuRepository::new(&config.db_path)?);

    match cli.command {
        Command::Acquire {
            place_id,
            no_cache,
            website,
            menu_url,
        } => {
            let mut places = StaticPlaceDirectory::new();
            places.insert(
                place_id.as_str(),
                PlaceDetails {
                    website,
                    menu_link: menu_url,
                },
            );

            let browser_config = BrowserConfig {
                headless: config.headless,
                ..BrowserConfig::default()
            };
            let service = AcquisitionService::new(
                repo,
                Arc::new(places),
                Arc::new(HttpClient::new()),
                Arc::new(BrowserFetcher::new(browser_config)),
                Arc::new(OllamaClient::new(config.llm.clone())),
            );

            let response = service.acquire(&place_id, !no_cache).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Show { place_id } => match repo.get(&place_id)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => println!(
                "{}",
                serde_json::json!({
                    "status": "cache_miss",
                    "message": "No cached menu found"
                })
            ),
        },
    }

    Ok(())
}
