//! Export and backup import commands

use std::path::Path;

use anyhow::{Context, Result};
use recurwise_core::db::Database;
use recurwise_core::export::{ExportFormat, SubscriptionBackup};
use tracing::info;

/// Render the owner's subscriptions in the requested format
pub fn render_export(db: &Database, owner: &str, format: ExportFormat) -> Result<String> {
    let output = match format {
        ExportFormat::Csv => db.export_subscriptions_csv(owner)?,
        ExportFormat::Json => {
            let backup = db.export_backup(owner)?;
            serde_json::to_string_pretty(&backup).context("Failed to serialize backup")?
        }
    };
    Ok(output)
}

pub fn cmd_export(
    db: &Database,
    owner: &str,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = render_export(db, owner, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let count = db.count_subscriptions(Some(owner))?;
            eprintln!("✅ Exported {} subscriptions to {}", count, path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

pub fn cmd_import_backup(db: &Database, owner: &str, file: &Path) -> Result<()> {
    println!("📥 Importing backup from {}...", file.display());

    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let backup = SubscriptionBackup::from_json(&json).context("Invalid backup file")?;

    let stats = db.import_backup(owner, &backup)?;
    info!(
        owner,
        imported = stats.imported,
        skipped = stats.skipped,
        "Imported backup"
    );

    println!("✅ Import complete");
    println!("   Imported: {}", stats.imported);
    if stats.skipped > 0 {
        println!("   Skipped (already present): {}", stats.skipped);
    }

    Ok(())
}
