//! Recurwise CLI - Self-hosted subscription tracker
//!
//! Usage:
//!   recurwise init                                     Initialize database
//!   recurwise add -t Netflix -c streaming -a 15.49     Track a subscription
//!   recurwise list --as-of 2024-06-01                  Upcoming renewals
//!   recurwise serve --port 3000                        Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Add {
            title,
            category,
            amount,
            frequency,
            start,
            notify,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let new = commands::SubscriptionInput {
                title,
                category,
                amount,
                frequency,
                start_date: start,
                notify_before_renewal: notify,
            };
            commands::cmd_add(&db, &cli.user, new)
        }
        Commands::Edit {
            id,
            title,
            category,
            amount,
            frequency,
            start,
            notify,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let edit = commands::SubscriptionEdit {
                title,
                category,
                amount,
                frequency,
                start_date: start,
                notify_before_renewal: notify,
            };
            commands::cmd_edit(&db, &cli.user, &id, &edit)
        }
        Commands::Delete { id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_delete(&db, &cli.user, &id)
        }
        Commands::List { as_of } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_list(&db, &cli.user, as_of.as_deref())
        }
        Commands::Summary { as_of } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, &cli.user, as_of.as_deref())
        }
        Commands::Categories => commands::cmd_categories(),
        Commands::Export { format, output } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(&db, &cli.user, format, output.as_deref())
        }
        Commands::ImportBackup { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import_backup(&db, &cli.user, &file)
        }
        Commands::Audit { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit)
        }
        Commands::Status => commands::cmd_status(&cli.db, &cli.user, cli.no_encrypt),
        Commands::Reset { yes } => commands::cmd_reset(&cli.db, yes, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
