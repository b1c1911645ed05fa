//! CLI module - Command-line interface for Shiori
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Shiori - anime catalog and tracking
/// Searches several metadata providers and keeps one identity per title
#[derive(Parser)]
#[command(name = "shiori")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search all configured providers
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
        /// Results requested from each provider
        #[arg(long)]
        limit: Option<usize>,
        /// Display language (en, ru, uk)
        #[arg(long)]
        lang: Option<String>,
        /// Comma-separated providers, e.g. jikan,shikimori
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,
        /// Also store the results in the catalog
        #[arg(long)]
        save: bool,
    },

    /// Show a stored catalog item
    #[command(alias = "i")]
    Show {
        uid: String,
        #[arg(long)]
        lang: Option<String>,
    },

    /// Print the canonical uid for any known uid
    Resolve { uid: String },

    /// Add a title to one of a user's lists
    #[command(alias = "a")]
    Track {
        /// watched, planned or favorite
        list: String,
        uid: String,
        #[arg(long)]
        user: String,
    },

    /// Remove a title from one of a user's lists
    #[command(alias = "rm")]
    Untrack {
        list: String,
        uid: String,
        #[arg(long)]
        user: String,
    },

    /// Show a user's list
    #[command(alias = "ls")]
    List {
        list: String,
        #[arg(long)]
        user: String,
    },

    /// Manage watch provider bindings
    WatchMap {
        #[command(subcommand)]
        command: WatchMapCommands,
    },

    /// Manage watch progress
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// Create default config file
    Init,
}

#[derive(Subcommand)]
pub enum WatchMapCommands {
    /// Bind a catalog title to a watch provider page
    Set {
        uid: String,
        source: String,
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Show the binding for a title
    Get { uid: String },
    /// Remove the binding for a title
    #[command(alias = "rm")]
    Clear { uid: String },
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Record that a user started an episode
    Start {
        uid: String,
        /// Episode label as shown to the user
        episode: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        number: Option<f64>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        quality: Option<String>,
        /// webapp_quality or bot_source
        #[arg(long, default_value = "bot_source")]
        via: String,
    },
    /// Forget a user's progress on a title
    #[command(alias = "rm")]
    Delete {
        uid: String,
        #[arg(long)]
        user: String,
    },
    /// Show what a user watched last
    Recent {
        #[arg(long)]
        user: String,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        lang: Option<String>,
    },
}

pub use commands::*;
