//! Export functionality for subscriptions
//!
//! Supports:
//! - Flat CSV export of one owner's subscriptions
//! - Versioned JSON backup export/import

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{restore_with, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Frequency, NewSubscription, Subscription};
use crate::store::SubscriptionStore;

/// Current JSON backup format version
pub const BACKUP_VERSION: u32 = 1;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (valid: csv, json)", s)),
        }
    }
}

/// One CSV line; field order is the column order
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    title: &'a str,
    category: Category,
    amount: f64,
    frequency: Frequency,
    notify_before_renewal: bool,
    start_date: NaiveDate,
}

impl<'a> From<&'a Subscription> for CsvRow<'a> {
    fn from(sub: &'a Subscription) -> Self {
        Self {
            id: &sub.id,
            title: &sub.title,
            category: sub.category,
            amount: sub.amount,
            frequency: sub.frequency,
            notify_before_renewal: sub.notify_before_renewal,
            start_date: sub.start_date,
        }
    }
}

/// JSON backup of one owner's subscriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionBackup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub subscriptions: Vec<Subscription>,
}

impl SubscriptionBackup {
    /// Parse a backup document, rejecting unknown versions
    pub fn from_json(json: &str) -> Result<Self> {
        let backup: Self = serde_json::from_str(json)?;
        backup.check_version()?;
        Ok(backup)
    }

    fn check_version(&self) -> Result<()> {
        if self.version != BACKUP_VERSION {
            return Err(Error::Backup(format!(
                "Unsupported backup version {} (expected {})",
                self.version, BACKUP_VERSION
            )));
        }
        Ok(())
    }
}

/// Import statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub imported: usize,
    /// Records whose id already existed
    pub skipped: usize,
}

impl Database {
    /// Export the owner's subscriptions as CSV (with header row)
    pub fn export_subscriptions_csv(&self, owner: &str) -> Result<String> {
        let subscriptions = self.list_subscriptions(owner)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        if subscriptions.is_empty() {
            // serialize() only writes the header alongside the first record
            writer.write_record([
                "id",
                "title",
                "category",
                "amount",
                "frequency",
                "notify_before_renewal",
                "start_date",
            ])?;
        }
        for sub in &subscriptions {
            writer.serialize(CsvRow::from(sub))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// Build a JSON backup of the owner's subscriptions
    pub fn export_backup(&self, owner: &str) -> Result<SubscriptionBackup> {
        Ok(SubscriptionBackup {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            subscriptions: self.list_subscriptions(owner)?,
        })
    }

    /// Import a backup into the owner's records.
    ///
    /// Every record is validated before anything is written; existing ids are
    /// left untouched and counted as skipped.
    pub fn import_backup(&self, owner: &str, backup: &SubscriptionBackup) -> Result<ImportStats> {
        backup.check_version()?;

        for (index, sub) in backup.subscriptions.iter().enumerate() {
            if sub.id.trim().is_empty() {
                return Err(Error::InvalidData(format!(
                    "Backup record {} has an empty id",
                    index + 1
                )));
            }
            NewSubscription::from(sub).normalized().map_err(|e| {
                Error::InvalidData(format!("Backup record {} ({}): {}", index + 1, sub.id, e))
            })?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut stats = ImportStats::default();
        for sub in &backup.subscriptions {
            if restore_with(&tx, owner, sub)? {
                stats.imported += 1;
            } else {
                stats.skipped += 1;
            }
        }

        tx.commit()?;

        info!(
            owner,
            imported = stats.imported,
            skipped = stats.skipped,
            "Imported subscription backup"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::new_subscription;

    #[test]
    fn test_csv_export() {
        let db = Database::in_memory().unwrap();
        let mut new = new_subscription("Acme, Inc. \"Pro\"", Category::Software, 9.5, Frequency::Monthly);
        new.notify_before_renewal = true;
        let created = db.insert_subscription("alice", &new).unwrap();
        db.insert_subscription("bob", &new).unwrap();

        let csv = db.export_subscriptions_csv("alice").unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,title,category,amount,frequency,notify_before_renewal,start_date"
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            format!(
                "{},\"Acme, Inc. \"\"Pro\"\"\",software,9.5,monthly,true,2024-01-01",
                created.id
            )
        );
    }

    #[test]
    fn test_csv_export_empty_has_header() {
        let db = Database::in_memory().unwrap();
        let csv = db.export_subscriptions_csv("alice").unwrap();
        assert_eq!(
            csv.trim_end(),
            "id,title,category,amount,frequency,notify_before_renewal,start_date"
        );
    }

    #[test]
    fn test_backup_roundtrip_into_other_owner() {
        let db = Database::in_memory().unwrap();
        db.insert_subscription(
            "alice",
            &new_subscription("Netflix", Category::Streaming, 15.49, Frequency::Monthly),
        )
        .unwrap();
        db.insert_subscription(
            "alice",
            &new_subscription("Gym", Category::Fitness, 8.0, Frequency::Weekly),
        )
        .unwrap();

        let backup = db.export_backup("alice").unwrap();
        assert_eq!(backup.version, BACKUP_VERSION);
        assert_eq!(backup.subscriptions.len(), 2);

        let json = serde_json::to_string(&backup).unwrap();
        let parsed = SubscriptionBackup::from_json(&json).unwrap();

        let other = Database::in_memory().unwrap();
        let stats = other.import_backup("carol", &parsed).unwrap();
        assert_eq!(stats, ImportStats { imported: 2, skipped: 0 });
        assert_eq!(other.list_subscriptions("carol").unwrap().len(), 2);

        // Second import skips everything
        let stats = other.import_backup("carol", &parsed).unwrap();
        assert_eq!(stats, ImportStats { imported: 0, skipped: 2 });
    }

    #[test]
    fn test_import_rejects_invalid_record() {
        let db = Database::in_memory().unwrap();
        let mut good = crate::test_utils::subscription("Good", Category::Music, 5.0, Frequency::Monthly);
        good.id = "good".to_string();
        let mut bad = good.clone();
        bad.id = "bad".to_string();
        bad.amount = -3.0;

        let backup = SubscriptionBackup {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            subscriptions: vec![good, bad],
        };

        let result = db.import_backup("alice", &backup);
        assert!(matches!(result, Err(Error::InvalidData(_))));
        // Nothing written
        assert!(db.list_subscriptions("alice").unwrap().is_empty());
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let db = Database::in_memory().unwrap();
        db.conn()
            .unwrap()
            .execute_batch(
                r#"
                CREATE TRIGGER reject_boom BEFORE INSERT ON subscriptions
                WHEN NEW.title = 'Boom'
                BEGIN
                    SELECT RAISE(ABORT, 'boom');
                END;
                "#,
            )
            .unwrap();

        let mut first = crate::test_utils::subscription("Good", Category::Music, 5.0, Frequency::Monthly);
        first.id = "first".to_string();
        let mut second = first.clone();
        second.id = "second".to_string();
        second.title = "Boom".to_string();

        let backup = SubscriptionBackup {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            subscriptions: vec![first, second],
        };

        assert!(matches!(
            db.import_backup("alice", &backup),
            Err(Error::Database(_))
        ));
        // The first record was rolled back with the failed one
        assert_eq!(db.count_subscriptions(Some("alice")).unwrap(), 0);
    }

    #[test]
    fn test_backup_version_checked() {
        let json = r#"{"version": 2, "exported_at": "2024-06-01T00:00:00Z", "subscriptions": []}"#;
        assert!(matches!(
            SubscriptionBackup::from_json(json),
            Err(Error::Backup(_))
        ));
    }

    #[test]
    fn test_backup_rejects_unknown_frequency() {
        let json = r#"{
            "version": 1,
            "exported_at": "2024-06-01T00:00:00Z",
            "subscriptions": [{
                "id": "x", "title": "T", "category": "music", "amount": 1.0,
                "frequency": "daily", "notify_before_renewal": false,
                "start_date": "2024-01-01",
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
            }]
        }"#;
        assert!(matches!(SubscriptionBackup::from_json(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
