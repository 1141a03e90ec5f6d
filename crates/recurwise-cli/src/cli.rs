//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use recurwise_core::export::ExportFormat;
use recurwise_core::models::{Category, Frequency};

/// Recurwise - Keep track of what your subscriptions really cost
#[derive(Parser)]
#[command(name = "recurwise")]
#[command(about = "Self-hosted subscription tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "recurwise.db", global = true)]
    pub db: PathBuf,

    /// Owner whose subscriptions the command reads and writes
    #[arg(long, default_value = "local", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set RECURWISE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Add a subscription
    Add {
        /// Name shown in lists (1-100 characters)
        #[arg(short, long)]
        title: String,

        /// Category (see `recurwise categories`)
        #[arg(short, long)]
        category: Category,

        /// Amount charged per billing period
        #[arg(short, long)]
        amount: f64,

        /// Billing frequency: weekly, monthly, yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: Frequency,

        /// First billing date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Remember that you want a reminder before renewal
        #[arg(long)]
        notify: bool,
    },

    /// Edit a subscription (only the given fields change)
    Edit {
        /// Subscription ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        category: Option<Category>,

        #[arg(short, long)]
        amount: Option<f64>,

        #[arg(short, long)]
        frequency: Option<Frequency>,

        /// First billing date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Reminder preference (true/false)
        #[arg(long)]
        notify: Option<bool>,
    },

    /// Delete a subscription
    Delete {
        /// Subscription ID
        id: String,
    },

    /// List subscriptions with their next renewal, soonest first
    List {
        /// Reference date (YYYY-MM-DD or RFC 3339, defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Show monthly/yearly spend and the category breakdown
    Summary {
        /// Reference date (YYYY-MM-DD or RFC 3339, defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List the available categories
    Categories,

    /// Export subscriptions (CSV or JSON backup)
    Export {
        /// Output format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON backup (existing ids are skipped)
    ImportBackup {
        /// JSON backup file to import
        file: PathBuf,
    },

    /// Show the API audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show database status
    Status,

    /// Clear all subscriptions and the audit log
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, every request needs a bearer JWT, an API key, or must
        /// come from a trusted network.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
