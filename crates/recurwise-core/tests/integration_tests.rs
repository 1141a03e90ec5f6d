//! Integration tests for recurwise-core
//!
//! These tests exercise the full store → project → aggregate workflow.

use chrono::{NaiveDate, TimeZone, Utc};
use recurwise_core::{
    build_dashboard,
    db::Database,
    models::{Category, Frequency, NewSubscription},
    renewal::{self, start_of_day},
    spend, SubscriptionBackup, SubscriptionStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_sub(
    title: &str,
    category: Category,
    amount: f64,
    frequency: Frequency,
    start: NaiveDate,
) -> NewSubscription {
    NewSubscription {
        title: title.to_string(),
        category,
        amount,
        frequency,
        notify_before_renewal: false,
        start_date: start,
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_yearly_subscription_scenario() {
    let db = Database::in_memory().expect("Failed to create database");
    db.insert_subscription(
        "local",
        &new_sub("Domain", Category::Internet, 120.0, Frequency::Yearly, date(2024, 1, 15)),
    )
    .expect("Failed to insert");

    let dashboard = build_dashboard(&db, "local", start_of_day(date(2024, 6, 1)))
        .expect("Failed to build dashboard");

    assert_eq!(dashboard.subscriptions.len(), 1);
    assert_eq!(dashboard.subscriptions[0].renewal.next_date, date(2025, 1, 15));
    assert!(!dashboard.subscriptions[0].renewal.urgent);
    assert!((dashboard.summary.monthly_total - 10.0).abs() < 1e-9);
}

#[test]
fn test_weekly_subscription_scenario() {
    let db = Database::in_memory().unwrap();
    db.insert_subscription(
        "local",
        &new_sub("Meal kit", Category::Meals, 10.0, Frequency::Weekly, date(2024, 1, 1)),
    )
    .unwrap();

    let subs = db.list_subscriptions("local").unwrap();
    assert_eq!(spend::format_amount(spend::total_monthly_spend(&subs)), "$43.33");
    assert!((spend::total_yearly_spend(&subs) - 520.0).abs() < 1e-9);
}

#[test]
fn test_start_equal_to_as_of_scenario() {
    let next = renewal::next_renewal_date(
        date(2024, 3, 1),
        Frequency::Monthly,
        start_of_day(date(2024, 3, 1)),
    )
    .unwrap();
    assert_eq!(next, date(2024, 4, 1));
}

#[test]
fn test_category_ranking_scenario() {
    let db = Database::in_memory().unwrap();
    db.insert_subscription(
        "local",
        &new_sub("Spotify", Category::Music, 5.0, Frequency::Monthly, date(2024, 1, 1)),
    )
    .unwrap();
    db.insert_subscription(
        "local",
        &new_sub("Tidal", Category::Music, 180.0, Frequency::Yearly, date(2024, 1, 1)),
    )
    .unwrap();
    db.insert_subscription(
        "local",
        &new_sub("Hulu", Category::Streaming, 12.0, Frequency::Monthly, date(2024, 1, 1)),
    )
    .unwrap();

    let subs = db.list_subscriptions("local").unwrap();
    let ranked = spend::rank_categories_by_spend(&subs);
    assert_eq!(ranked[0].category, Category::Music);
    assert!((ranked[0].monthly_total - 20.0).abs() < 1e-9);
    assert_eq!(spend::format_whole_amount(ranked[0].monthly_total), "$20");
}

#[test]
fn test_urgency_scenario() {
    let as_of = start_of_day(date(2024, 6, 1));
    assert!(renewal::is_urgent(date(2024, 6, 8), Frequency::Monthly, as_of).unwrap());
    assert!(!renewal::is_urgent(date(2024, 6, 9), Frequency::Monthly, as_of).unwrap());
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[test]
fn test_dashboard_reflects_edits() {
    let db = Database::in_memory().unwrap();
    let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

    let created = db
        .insert_subscription(
            "alice",
            &new_sub("Gym", Category::Fitness, 30.0, Frequency::Monthly, date(2024, 5, 20)),
        )
        .unwrap();

    let before = build_dashboard(&db, "alice", as_of).unwrap();
    assert_eq!(before.subscriptions[0].renewal.next_date, date(2024, 6, 20));
    assert_eq!(before.urgent_count, 0);

    // Move the billing day into the urgent window
    let mut edit = NewSubscription::from(&created);
    edit.start_date = date(2024, 5, 4);
    db.update_subscription("alice", &created.id, &edit).unwrap();

    let after = build_dashboard(&db, "alice", as_of).unwrap();
    assert_eq!(after.subscriptions[0].renewal.next_date, date(2024, 6, 4));
    assert_eq!(after.subscriptions[0].renewal.label, "in 3 days");
    assert_eq!(after.urgent_count, 1);

    db.delete_subscription("alice", &created.id).unwrap();
    let empty = build_dashboard(&db, "alice", as_of).unwrap();
    assert!(empty.subscriptions.is_empty());
    assert_eq!(empty.summary.monthly_total, 0.0);
}

#[test]
fn test_partition_law_over_stored_records() {
    let db = Database::in_memory().unwrap();
    let records = [
        ("Netflix", Category::Streaming, 15.49, Frequency::Monthly),
        ("Disney+", Category::Streaming, 139.99, Frequency::Yearly),
        ("Gym", Category::Fitness, 8.0, Frequency::Weekly),
        ("iCloud", Category::Cloud, 2.99, Frequency::Monthly),
    ];
    for (title, category, amount, frequency) in records {
        db.insert_subscription(
            "local",
            &new_sub(title, category, amount, frequency, date(2024, 2, 1)),
        )
        .unwrap();
    }

    let subs = db.list_subscriptions("local").unwrap();
    let by_category: f64 = spend::active_categories(&subs)
        .into_iter()
        .map(|c| spend::category_monthly_spend(&subs, c))
        .sum();
    assert!((by_category - spend::total_monthly_spend(&subs)).abs() < 1e-9);

    let summary = spend::summarize(&subs);
    let ranked_total: f64 = summary.categories.iter().map(|c| c.monthly_total).sum();
    assert!((ranked_total - summary.monthly_total).abs() < 1e-9);
}

#[test]
fn test_backup_restore_workflow() {
    let source = Database::in_memory().unwrap();
    source
        .insert_subscription(
            "alice",
            &new_sub("Netflix", Category::Streaming, 15.49, Frequency::Monthly, date(2024, 1, 15)),
        )
        .unwrap();

    let json = serde_json::to_string_pretty(&source.export_backup("alice").unwrap()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");
    std::fs::write(&path, &json).unwrap();

    let restored_json = std::fs::read_to_string(&path).unwrap();
    let backup = SubscriptionBackup::from_json(&restored_json).unwrap();

    let target = Database::in_memory().unwrap();
    let stats = target.import_backup("alice", &backup).unwrap();
    assert_eq!(stats.imported, 1);
    assert_eq!(
        target.list_subscriptions("alice").unwrap(),
        source.list_subscriptions("alice").unwrap()
    );
}
