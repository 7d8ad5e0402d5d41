//! Command-line interface components
//!
//! This module contains CLI-specific code for the transit catalog browser,
//! including argument parsing, command handlers, and terminal rendering.

pub mod args;
pub mod commands;
pub mod display;

pub use args::{
    AuthAction, AuthArgs, Cli, Commands, DatasetsArgs, FeedArgs, FeedsArgs, GlobalArgs, SearchArgs,
};
pub use commands::{handle_auth, handle_datasets, handle_feed, handle_feeds, handle_search};
