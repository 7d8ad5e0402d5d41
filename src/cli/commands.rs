//! Command handlers for the transit catalog CLI
//!
//! This module implements the main command handlers that coordinate between
//! CLI arguments and the core application functionality.

use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::datasets::{fetch_dataset_history, merge_dataset_pages, page_completeness};
use crate::app::models::DataType;
use crate::app::supporting::FeedSession;
use crate::app::CatalogClient;
use crate::auth::{
    check_token, clear_token, load_token, setup_token, show_auth_status, verify_token,
};
use crate::cli::display;
use crate::cli::{AuthAction, AuthArgs, DatasetsArgs, FeedArgs, FeedsArgs, SearchArgs};
use crate::errors::{AuthError, CatalogError, Result};

/// Create a spinner for an in-flight fetch
///
/// Hidden when stderr is not a terminal so piped output stays clean.
fn fetch_spinner(message: &str) -> ProgressBar {
    if !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Handle the feed command
///
/// Fetches the feed, shows its common fields, then dispatches on the data
/// type for the typed detail. GTFS feeds additionally get their latest
/// dataset and its supporting files.
pub async fn handle_feed(
    args: FeedArgs,
    client: Arc<CatalogClient>,
    token: Option<&str>,
) -> Result<()> {
    let start_time = Instant::now();
    args.validate().map_err(CatalogError::generic)?;

    info!("Fetching feed {}", args.feed_id);

    let spinner = fetch_spinner(&format!("Fetching feed {}...", args.feed_id));
    let feed = client.get_feed(&args.feed_id, token).await?;
    spinner.finish_and_clear();

    println!("📦 Feed {}", feed.id);
    println!("{}", "=".repeat(feed.id.chars().count() + 8));
    display::render_feed_summary(&feed);

    match feed.data_type {
        Some(DataType::Gtfs) => show_gtfs_detail(&args, client, token).await?,
        Some(DataType::GtfsRt) => show_gtfs_rt_detail(&args, &client, token).await?,
        Some(DataType::Gbfs) => show_gbfs_detail(&args, &client, token).await?,
        Some(DataType::Unknown) | None => {
            println!();
            println!("Data type not recognized by this client; showing common fields only.");
        }
    }

    debug!("Feed command completed in {:?}", start_time.elapsed());
    Ok(())
}

/// Show the GTFS schedule detail: latest dataset plus supporting files
async fn show_gtfs_detail(
    args: &FeedArgs,
    client: Arc<CatalogClient>,
    token: Option<&str>,
) -> Result<()> {
    let spinner = fetch_spinner("Fetching GTFS detail...");
    let gtfs = client.get_gtfs_feed(&args.feed_id, token).await?;
    spinner.finish_and_clear();

    let Some(dataset) = gtfs.latest_dataset else {
        println!();
        println!("No dataset has been ingested for this feed yet.");
        return Ok(());
    };

    println!();
    println!("📅 Latest dataset");
    println!("=================");
    display::render_dataset_summary(&dataset);

    if args.no_supporting_files {
        return Ok(());
    }

    let spinner = fetch_spinner("Loading supporting files...");
    let session = FeedSession::new(client);
    session.apply_feed(&gtfs.feed).await;
    session.apply_latest_dataset(&dataset).await;
    spinner.finish_and_clear();

    println!();
    println!("🗺️  Supporting files");
    println!("===================");
    let snapshot = session.snapshot().await;
    display::render_supporting_files(&snapshot, args.routes_limit);

    Ok(())
}

/// Show the realtime detail: entity types and schedule references
async fn show_gtfs_rt_detail(
    args: &FeedArgs,
    client: &CatalogClient,
    token: Option<&str>,
) -> Result<()> {
    let spinner = fetch_spinner("Fetching realtime detail...");
    let feed = client.get_gtfs_rt_feed(&args.feed_id, token).await?;
    spinner.finish_and_clear();

    if feed.entity_types.is_empty() && feed.feed_references.is_empty() {
        return Ok(());
    }

    println!();
    if !feed.entity_types.is_empty() {
        println!("Entities:   {}", feed.entity_types.join(", "));
    }
    if !feed.feed_references.is_empty() {
        println!("Schedules:  {}", feed.feed_references.join(", "));
    }
    Ok(())
}

/// Show the GBFS detail: published versions with validation summaries
async fn show_gbfs_detail(
    args: &FeedArgs,
    client: &CatalogClient,
    token: Option<&str>,
) -> Result<()> {
    let spinner = fetch_spinner("Fetching GBFS detail...");
    let feed = client.get_gbfs_feed(&args.feed_id, token).await?;
    spinner.finish_and_clear();

    if feed.versions.is_empty() {
        return Ok(());
    }

    println!();
    println!("🚲 Published versions");
    println!("=====================");
    for version in &feed.versions {
        println!(
            "  {:<6} {}",
            version.version.as_deref().unwrap_or("-"),
            version.auto_discovery_url.as_deref().unwrap_or("-")
        );
        if let Some(report) = &version.latest_validation_report {
            println!(
                "         {} validation errors ({})",
                display::format_count(report.total_errors_count),
                display::format_date(report.validated_at)
            );
        }
    }
    Ok(())
}

/// Handle the feeds listing command
pub async fn handle_feeds(
    args: FeedsArgs,
    client: Arc<CatalogClient>,
    token: Option<&str>,
) -> Result<()> {
    info!(
        "Listing feeds (limit: {:?}, offset: {:?})",
        args.limit, args.offset
    );

    let spinner = fetch_spinner("Listing feeds...");
    let feeds = client.list_feeds(args.limit, args.offset, token).await?;
    spinner.finish_and_clear();

    display::render_feeds_table(&feeds);

    let completeness = page_completeness(feeds.len(), args.limit, args.offset);
    println!();
    println!(
        "{} feeds shown ({})",
        feeds.len(),
        display::completeness_label(completeness)
    );

    Ok(())
}

/// Handle the datasets command
///
/// Lists one page by default; `--all` walks the feed's entire history
/// page by page before rendering.
pub async fn handle_datasets(
    args: DatasetsArgs,
    client: Arc<CatalogClient>,
    token: Option<&str>,
) -> Result<()> {
    args.validate().map_err(CatalogError::generic)?;

    info!("Listing datasets for feed {}", args.feed_id);

    if args.all {
        let spinner = fetch_spinner(&format!("Walking dataset history for {}...", args.feed_id));
        let history = fetch_dataset_history(&client, &args.feed_id, token).await?;
        spinner.finish_and_clear();

        display::render_dataset_table(&history);
        println!();
        println!("{} datasets, newest first (complete)", history.len());
        return Ok(());
    }

    let spinner = fetch_spinner(&format!("Fetching datasets for {}...", args.feed_id));
    let page = client
        .list_gtfs_datasets(&args.feed_id, args.limit, args.offset, token)
        .await?;
    spinner.finish_and_clear();

    // Completeness is judged on the raw page size, before deduplication
    let completeness = page_completeness(page.len(), args.limit, args.offset);
    let datasets = merge_dataset_pages(&page, None);

    display::render_dataset_table(&datasets);
    println!();
    println!(
        "{} datasets shown ({})",
        datasets.len(),
        display::completeness_label(completeness)
    );

    Ok(())
}

/// Handle the search command
pub async fn handle_search(
    args: SearchArgs,
    client: Arc<CatalogClient>,
    token: Option<&str>,
) -> Result<()> {
    args.validate().map_err(CatalogError::generic)?;

    info!("Searching catalog for '{}'", args.query);

    let spinner = fetch_spinner(&format!("Searching for '{}'...", args.query));
    let results = client
        .search(
            &args.query,
            args.limit,
            args.offset,
            args.parsed_data_type(),
            token,
        )
        .await?;
    spinner.finish_and_clear();

    println!("🔎 Search results for '{}'", args.query);
    println!("{}", "=".repeat(args.query.chars().count() + 21));
    display::render_search_results(&results);

    Ok(())
}

/// Handle authentication commands
pub async fn handle_auth(args: AuthArgs, client: Arc<CatalogClient>) -> Result<()> {
    match args.action {
        AuthAction::Setup { force } => {
            if force || !check_token() {
                setup_token(&client).await?;
            } else {
                println!("✅ Token already configured. Use --force to update.");
            }
        }
        AuthAction::Verify => {
            let token = load_token().ok_or(AuthError::MissingToken)?;
            let is_valid = verify_token(&client, &token).await?;
            if is_valid {
                println!("✅ Token verified successfully");
            } else {
                println!("❌ The catalog API rejected the token");
            }
        }
        AuthAction::Status => {
            show_auth_status(&client).await?;
        }
        AuthAction::Clear => {
            clear_token()?;
        }
    }

    Ok(())
}
