//! Recurwise Core Library
//!
//! Shared functionality for the Recurwise subscription tracker:
//! - Subscription models and the category catalog
//! - Renewal projection and relative-time labels
//! - Spend aggregation (monthly/yearly equivalents, category ranking)
//! - Dashboard assembly over a pluggable record store
//! - Encrypted SQLite storage, audit log and backups

pub mod dashboard;
pub mod db;
pub mod error;
pub mod export;
pub mod humanize;
pub mod models;
pub mod renewal;
pub mod spend;
pub mod store;

/// Test utilities including an in-memory record store
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use dashboard::build_dashboard;
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use export::{ExportFormat, ImportStats, SubscriptionBackup};
pub use models::{
    category_catalog, Category, CategoryInfo, CategorySpend, Dashboard, Frequency,
    NewSubscription, Renewal, SpendSummary, Subscription, SubscriptionView,
};
pub use store::SubscriptionStore;
