//! Status-related command implementations (status, audit, reset)

use std::path::Path;

use anyhow::Result;
use recurwise_core::db::Database;

use super::{open_db, truncate};

pub fn cmd_status(db_path: &Path, owner: &str, no_encrypt: bool) -> Result<()> {
    use recurwise_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Recurwise Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                if let (Ok(total), Ok(mine)) = (
                    db.count_subscriptions(None),
                    db.count_subscriptions(Some(owner)),
                ) {
                    println!();
                    println!("   Subscriptions (all owners): {}", total);
                    println!("   Subscriptions ({}): {}", owner, mine);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_audit(db: &Database, limit: i64) -> Result<()> {
    // Local operator view: every owner's entries
    let entries = db.list_audit_log(None, limit.clamp(1, 1000))?;

    if entries.is_empty() {
        println!("No audit entries yet. API requests are recorded here.");
        return Ok(());
    }

    println!();
    println!("📜 Audit Log");
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in entries {
        let target = match (&entry.entity_type, &entry.entity_id) {
            (Some(kind), Some(id)) => format!("{} {}", kind, truncate(id, 12)),
            (Some(kind), None) => kind.clone(),
            _ => String::new(),
        };
        println!(
            "   {} │ {:16} │ {:8} │ {}",
            entry.timestamp,
            truncate(&entry.user_email, 16),
            entry.action,
            target
        );
        if let Some(details) = &entry.details {
            println!("      {}", details);
        }
    }

    Ok(())
}

/// Clear subscriptions and the audit log, keeping the schema
pub fn cmd_reset(db_path: &Path, yes: bool, no_encrypt: bool) -> Result<()> {
    use std::io::{self, Write};

    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    if !yes {
        print!("⚠️  This will delete all subscriptions (for every owner) and the audit log.\n\n");
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let db = open_db(db_path, no_encrypt)?;
    db.soft_reset()?;

    println!("✅ Database reset complete.");
    println!("   Cleared: subscriptions, audit log");

    Ok(())
}
