//! Transit catalog CLI application
//!
//! Command-line browser for the Mobility Database transit catalog. Looks up
//! feeds of every data type, walks dataset histories, searches the catalog,
//! and previews per-dataset supporting files.

use std::process;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use transit_catalog::app::CatalogClient;
use transit_catalog::auth::load_token;
use transit_catalog::cli::{
    Cli, Commands, handle_auth, handle_datasets, handle_feed, handle_feeds, handle_search,
};
use transit_catalog::config::AppConfig;
use transit_catalog::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(&cli);

    info!("Transit catalog v{} starting", env!("CARGO_PKG_VERSION"));

    // Assemble configuration, the shared client, and the API token
    let config = AppConfig::load(cli.global.config.clone()).await?;
    let client = Arc::new(CatalogClient::with_config(
        &config.api.base_url,
        &config.api.files_base_url,
        config.client_config(),
    )?);
    let token = load_token();

    // Execute the appropriate command
    match cli.command {
        Commands::Feed(args) => {
            info!("Executing feed command");
            handle_feed(args, client, token.as_deref()).await
        }
        Commands::Feeds(args) => {
            info!("Executing feeds command");
            handle_feeds(args, client, token.as_deref()).await
        }
        Commands::Datasets(args) => {
            info!("Executing datasets command");
            handle_datasets(args, client, token.as_deref()).await
        }
        Commands::Search(args) => {
            info!("Executing search command");
            handle_search(args, client, token.as_deref()).await
        }
        Commands::Auth(args) => {
            info!("Executing auth command");
            handle_auth(args, client).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    // Create environment filter
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("transit_catalog={}", log_level).parse().unwrap());

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
