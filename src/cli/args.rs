//! Command-line argument parsing for the transit catalog browser
//!
//! This module defines the CLI structure using clap derive macros,
//! providing a user-friendly interface for feed lookup, dataset history,
//! catalog search, and authentication management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::models::DataType;

/// Transit Catalog - browse the Mobility Database
#[derive(Parser, Debug)]
#[command(
    name = "transit-catalog",
    version,
    about = "Browse transit feeds and datasets from the Mobility Database catalog",
    long_about = "A command-line browser for the Mobility Database transit catalog.
Looks up feeds of every data type, walks dataset histories, searches the catalog,
and previews per-dataset supporting files such as route extracts and coverage geometry."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one feed in detail
    Feed(FeedArgs),

    /// List catalog feeds
    Feeds(FeedsArgs),

    /// List a feed's dataset history
    Datasets(DatasetsArgs),

    /// Search the catalog
    Search(SearchArgs),

    /// Manage authentication credentials
    Auth(AuthArgs),
}

/// Arguments for the feed command
#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// Catalog feed identifier (e.g., "mdb-503")
    pub feed_id: String,

    /// Skip supporting files (route extract, coverage geometry)
    #[arg(long)]
    pub no_supporting_files: bool,

    /// Maximum number of routes to print from the route extract
    #[arg(long, default_value = "10", value_name = "N")]
    pub routes_limit: usize,
}

/// Arguments for the feeds listing command
#[derive(Args, Debug, Clone)]
pub struct FeedsArgs {
    /// Page size (server default when omitted)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Zero-based offset into the collection
    #[arg(short, long)]
    pub offset: Option<usize>,
}

/// Arguments for the datasets command
#[derive(Args, Debug, Clone)]
pub struct DatasetsArgs {
    /// Catalog feed identifier (e.g., "mdb-503")
    pub feed_id: String,

    /// Page size (server default when omitted)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Zero-based offset into the history
    #[arg(short, long)]
    pub offset: Option<usize>,

    /// Walk the entire history instead of a single page
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the search command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Page size (server default when omitted)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Zero-based offset into the result set
    #[arg(short, long)]
    pub offset: Option<usize>,

    /// Restrict hits to one data type (gtfs, gtfs_rt, gbfs)
    #[arg(short = 't', long, value_name = "TYPE")]
    pub data_type: Option<String>,
}

/// Arguments for authentication management
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Authentication actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Set up the catalog API token
    Setup {
        /// Force setup even if a token already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Verify the current token against the catalog API
    Verify,

    /// Show authentication status
    Status,

    /// Remove the stored token
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl FeedArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.routes_limit == 0 {
            return Err("Routes limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl DatasetsArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.all && (self.limit.is_some() || self.offset.is_some()) {
            return Err("Cannot combine --all with --limit or --offset".to_string());
        }
        Ok(())
    }
}

impl SearchArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("Search query cannot be empty".to_string());
        }
        if let Some(tag) = &self.data_type {
            if DataType::from_api_value(tag).is_none() {
                return Err(format!(
                    "Unknown data type '{}'. Valid values: gtfs, gtfs_rt, gbfs",
                    tag
                ));
            }
        }
        Ok(())
    }

    /// The requested data type filter, when one was given
    pub fn parsed_data_type(&self) -> Option<DataType> {
        self.data_type.as_deref().and_then(DataType::from_api_value)
    }
}
