//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{NaiveDate, Utc};
use clap::Parser;
use recurwise_core::db::Database;
use recurwise_core::export::ExportFormat;
use recurwise_core::models::{Category, Frequency, NewSubscription, Subscription};
use recurwise_core::{SubscriptionBackup, SubscriptionStore};

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate, SubscriptionEdit, SubscriptionInput};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn add_netflix(db: &Database, owner: &str) -> Subscription {
    db.insert_subscription(
        owner,
        &NewSubscription {
            title: "Netflix".to_string(),
            category: Category::Streaming,
            amount: 15.49,
            frequency: Frequency::Monthly,
            notify_before_renewal: false,
            start_date: date(2024, 1, 15),
        },
    )
    .unwrap()
}

fn input(title: &str, start: Option<NaiveDate>) -> SubscriptionInput {
    SubscriptionInput {
        title: title.to_string(),
        category: Category::Music,
        amount: 9.99,
        frequency: Frequency::Monthly,
        start_date: start,
        notify_before_renewal: true,
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_add_command() {
    let cli = Cli::try_parse_from([
        "recurwise", "add", "-t", "Netflix", "-c", "streaming", "-a", "15.49", "--start",
        "2024-01-15",
    ])
    .unwrap();

    assert_eq!(cli.user, "local");
    match cli.command {
        Commands::Add {
            title,
            category,
            amount,
            frequency,
            start,
            notify,
        } => {
            assert_eq!(title, "Netflix");
            assert_eq!(category, Category::Streaming);
            assert_eq!(amount, 15.49);
            assert_eq!(frequency, Frequency::Monthly);
            assert_eq!(start, Some(date(2024, 1, 15)));
            assert!(!notify);
        }
        _ => panic!("expected add command"),
    }
}

#[test]
fn test_parse_rejects_unknown_category() {
    let result = Cli::try_parse_from([
        "recurwise", "add", "-t", "Netflix", "-c", "movies", "-a", "15.49",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_global_user_and_export_format() {
    let cli =
        Cli::try_parse_from(["recurwise", "export", "--format", "json", "--user", "alice"]).unwrap();
    assert_eq!(cli.user, "alice");
    match cli.command {
        Commands::Export { format, output } => {
            assert_eq!(format, ExportFormat::Json);
            assert!(output.is_none());
        }
        _ => panic!("expected export command"),
    }
}

// ========== Subscription Command Tests ==========

#[test]
fn test_cmd_add() {
    let db = setup_test_db();
    commands::cmd_add(&db, "local", input("Spotify", Some(date(2024, 3, 1)))).unwrap();

    let subs = db.list_subscriptions("local").unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].title, "Spotify");
    assert_eq!(subs[0].start_date, date(2024, 3, 1));
    assert!(subs[0].notify_before_renewal);
}

#[test]
fn test_cmd_add_defaults_start_to_today() {
    let db = setup_test_db();
    let before = Utc::now().date_naive();
    commands::cmd_add(&db, "local", input("Spotify", None)).unwrap();
    let after = Utc::now().date_naive();

    let start = db.list_subscriptions("local").unwrap()[0].start_date;
    assert!(start == before || start == after);
}

#[test]
fn test_cmd_add_rejects_invalid_amount() {
    let db = setup_test_db();
    let mut bad = input("Spotify", Some(date(2024, 3, 1)));
    bad.amount = -1.0;

    assert!(commands::cmd_add(&db, "local", bad).is_err());
    assert_eq!(db.count_subscriptions(None).unwrap(), 0);
}

#[test]
fn test_subscription_edit_apply_keeps_unset_fields() {
    let db = setup_test_db();
    let existing = add_netflix(&db, "local");

    let edit = SubscriptionEdit {
        amount: Some(17.99),
        notify_before_renewal: Some(true),
        ..Default::default()
    };
    let merged = edit.apply(&existing);

    assert_eq!(merged.title, "Netflix");
    assert_eq!(merged.category, Category::Streaming);
    assert_eq!(merged.amount, 17.99);
    assert_eq!(merged.start_date, date(2024, 1, 15));
    assert!(merged.notify_before_renewal);
}

#[test]
fn test_cmd_edit() {
    let db = setup_test_db();
    let existing = add_netflix(&db, "local");

    let edit = SubscriptionEdit {
        frequency: Some(Frequency::Yearly),
        amount: Some(150.0),
        ..Default::default()
    };
    commands::cmd_edit(&db, "local", &existing.id, &edit).unwrap();

    let updated = db.get_subscription("local", &existing.id).unwrap().unwrap();
    assert_eq!(updated.frequency, Frequency::Yearly);
    assert_eq!(updated.amount, 150.0);
    assert_eq!(updated.title, "Netflix");
}

#[test]
fn test_cmd_edit_requires_a_field() {
    let db = setup_test_db();
    let existing = add_netflix(&db, "local");

    let result = commands::cmd_edit(&db, "local", &existing.id, &SubscriptionEdit::default());
    assert!(result.is_err());
}

#[test]
fn test_cmd_edit_other_owner_not_found() {
    let db = setup_test_db();
    let existing = add_netflix(&db, "alice");

    let edit = SubscriptionEdit {
        amount: Some(1.0),
        ..Default::default()
    };
    let err = commands::cmd_edit(&db, "bob", &existing.id, &edit).unwrap_err();
    assert!(err.to_string().contains("not found"));

    let untouched = db.get_subscription("alice", &existing.id).unwrap().unwrap();
    assert_eq!(untouched.amount, 15.49);
}

#[test]
fn test_cmd_delete() {
    let db = setup_test_db();
    let existing = add_netflix(&db, "local");

    commands::cmd_delete(&db, "local", &existing.id).unwrap();
    assert!(db.list_subscriptions("local").unwrap().is_empty());

    // Second delete reports the missing record
    assert!(commands::cmd_delete(&db, "local", &existing.id).is_err());
}

#[test]
fn test_cmd_list() {
    let db = setup_test_db();
    add_netflix(&db, "local");

    assert!(commands::cmd_list(&db, "local", Some("2024-06-01")).is_ok());
    assert!(commands::cmd_list(&db, "local", None).is_ok());
}

#[test]
fn test_cmd_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_list(&db, "local", None).is_ok());
}

#[test]
fn test_cmd_list_invalid_as_of() {
    let db = setup_test_db();
    assert!(commands::cmd_list(&db, "local", Some("next tuesday")).is_err());
}

// ========== Summary Command Tests ==========

#[test]
fn test_cmd_summary() {
    let db = setup_test_db();
    add_netflix(&db, "local");

    assert!(commands::cmd_summary(&db, "local", Some("2024-06-01")).is_ok());
    assert!(commands::cmd_summary(&db, "nobody", None).is_ok());
    assert!(commands::cmd_summary(&db, "local", Some("2024-13-01")).is_err());
}

#[test]
fn test_cmd_categories() {
    assert!(commands::cmd_categories().is_ok());
}

// ========== Export/Import Command Tests ==========

#[test]
fn test_render_export_csv() {
    let db = setup_test_db();
    let sub = add_netflix(&db, "local");

    let csv = commands::render_export(&db, "local", ExportFormat::Csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,title,category,amount,frequency,notify_before_renewal,start_date"
    );
    assert_eq!(
        lines.next().unwrap(),
        format!("{},Netflix,streaming,15.49,monthly,false,2024-01-15", sub.id)
    );
    assert!(lines.next().is_none());
}

#[test]
fn test_render_export_json() {
    let db = setup_test_db();
    add_netflix(&db, "local");

    let json = commands::render_export(&db, "local", ExportFormat::Json).unwrap();
    let backup = SubscriptionBackup::from_json(&json).unwrap();
    assert_eq!(backup.version, 1);
    assert_eq!(backup.subscriptions.len(), 1);
    assert_eq!(backup.subscriptions[0].title, "Netflix");
}

#[test]
fn test_cmd_export_then_import_backup() {
    let source = setup_test_db();
    let original = add_netflix(&source, "alice");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");
    commands::cmd_export(&source, "alice", ExportFormat::Json, Some(&path)).unwrap();
    assert!(path.exists());

    let target = setup_test_db();
    commands::cmd_import_backup(&target, "alice", &path).unwrap();
    let restored = target.get_subscription("alice", &original.id).unwrap().unwrap();
    assert_eq!(restored, original);

    // Re-importing skips existing ids
    commands::cmd_import_backup(&target, "alice", &path).unwrap();
    assert_eq!(target.count_subscriptions(Some("alice")).unwrap(), 1);
}

#[test]
fn test_cmd_import_backup_rejects_bad_file() {
    let db = setup_test_db();
    let dir = tempfile::tempdir().unwrap();

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();
    assert!(commands::cmd_import_backup(&db, "local", &garbage).is_err());

    let missing = dir.path().join("missing.json");
    assert!(commands::cmd_import_backup(&db, "local", &missing).is_err());
}

// ========== Status/Audit/Reset Command Tests ==========

#[test]
fn test_cmd_audit() {
    let db = setup_test_db();
    assert!(commands::cmd_audit(&db, 20).is_ok());

    db.log_audit("local", "create", Some("subscription"), Some("abc"), Some("title=Netflix"))
        .unwrap();
    db.log_audit("local", "list", Some("subscription"), None, None)
        .unwrap();
    assert!(commands::cmd_audit(&db, 20).is_ok());
    assert!(commands::cmd_audit(&db, 0).is_ok());
}

#[test]
fn test_cmd_init_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recurwise.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());
    assert!(commands::cmd_status(&path, "local", true).is_ok());
}

#[test]
fn test_cmd_status_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");

    assert!(commands::cmd_status(&path, "local", true).is_ok());
    assert!(!path.exists());
}

#[test]
fn test_cmd_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recurwise.db");

    {
        let db = commands::open_db(&path, true).unwrap();
        add_netflix(&db, "local");
        db.log_audit("local", "create", Some("subscription"), None, None)
            .unwrap();
    }

    commands::cmd_reset(&path, true, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.count_subscriptions(None).unwrap(), 0);
    let conn = db.conn().unwrap();
    let audit_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM audit_log WHERE user_email = ?1",
            rusqlite::params!["local"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(audit_rows, 0);
}

#[test]
fn test_cmd_reset_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    assert!(commands::cmd_reset(&path, true, true).is_err());
}

// ========== Serve Config Tests ==========

#[test]
fn test_parse_api_keys() {
    assert_eq!(
        commands::parse_api_keys(" key-one, ,key-two,"),
        vec!["key-one".to_string(), "key-two".to_string()]
    );
    assert!(commands::parse_api_keys("").is_empty());
}

#[test]
fn test_server_config_auth_flag() {
    assert!(!commands::server_config_from_env(true).require_auth);
    assert!(commands::server_config_from_env(false).require_auth);
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 20), "Netflix");
    assert_eq!(truncate("A very long subscription name", 10), "A very ...");
    assert_eq!(truncate("Crème brûlée club", 8), "Crème...");
}
