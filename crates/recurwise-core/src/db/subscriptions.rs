//! Subscription operations

use chrono::{NaiveDate, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{
    validate_amount, validate_title, Category, Frequency, NewSubscription, Subscription,
};
use crate::store::SubscriptionStore;

const SUBSCRIPTION_COLUMNS: &str = "id, title, category, amount, frequency, \
    notify_before_renewal, start_date, created_at, updated_at";

/// Reject a stored value that no longer satisfies the model invariants
fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(message),
    )
}

/// Decode a `subscriptions` row selected with [`SUBSCRIPTION_COLUMNS`]
fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let title: String = row.get(1)?;
    let category_str: String = row.get(2)?;
    let amount: f64 = row.get(3)?;
    let frequency_str: String = row.get(4)?;
    let start_date_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;

    validate_title(&title).map_err(|e| conversion_error(1, e.to_string()))?;
    let category: Category = category_str.parse().map_err(|e| conversion_error(2, e))?;
    validate_amount(amount).map_err(|e| conversion_error(3, e.to_string()))?;
    let frequency: Frequency = frequency_str.parse().map_err(|e| conversion_error(4, e))?;
    let start_date = NaiveDate::parse_from_str(&start_date_str, "%Y-%m-%d").map_err(|e| {
        conversion_error(6, format!("Invalid start date '{}': {}", start_date_str, e))
    })?;
    let created_at = parse_datetime(&created_at_str).map_err(|e| {
        conversion_error(7, format!("Invalid created_at '{}': {}", created_at_str, e))
    })?;
    let updated_at = parse_datetime(&updated_at_str).map_err(|e| {
        conversion_error(8, format!("Invalid updated_at '{}': {}", updated_at_str, e))
    })?;

    Ok(Subscription {
        id: row.get(0)?,
        title,
        category,
        amount,
        frequency,
        notify_before_renewal: row.get(5)?,
        start_date,
        created_at,
        updated_at,
    })
}

/// Restore one record on an open connection (or transaction)
pub(crate) fn restore_with(conn: &Connection, owner: &str, sub: &Subscription) -> Result<bool> {
    let new = NewSubscription::from(sub).normalized()?;

    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO subscriptions
            (id, owner, title, category, amount, frequency, notify_before_renewal,
             start_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            sub.id,
            owner,
            new.title,
            new.category.as_str(),
            new.amount,
            new.frequency.as_str(),
            new.notify_before_renewal,
            new.start_date.to_string(),
            format_datetime(&sub.created_at),
            format_datetime(&sub.updated_at),
        ],
    )?;

    Ok(inserted > 0)
}

impl Database {
    /// Insert a subscription restored from a backup, keeping its id and timestamps.
    ///
    /// Returns `false` (and writes nothing) if the id is already taken.
    pub fn restore_subscription(&self, owner: &str, sub: &Subscription) -> Result<bool> {
        let conn = self.conn()?;
        restore_with(&conn, owner, sub)
    }

    /// Number of stored subscriptions, for one owner or across all of them
    pub fn count_subscriptions(&self, owner: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        let count = match owner {
            Some(owner) => conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE owner = ?",
                params![owner],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM subscriptions", [], |row| row.get(0))?,
        };
        Ok(count)
    }
}

impl SubscriptionStore for Database {
    fn list_subscriptions(&self, owner: &str) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM subscriptions WHERE owner = ? ORDER BY created_at, id",
            SUBSCRIPTION_COLUMNS
        ))?;

        let subscriptions = stmt
            .query_map(params![owner], row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }

    fn get_subscription(&self, owner: &str, id: &str) -> Result<Option<Subscription>> {
        let conn = self.conn()?;

        let subscription = conn
            .query_row(
                &format!(
                    "SELECT {} FROM subscriptions WHERE owner = ? AND id = ?",
                    SUBSCRIPTION_COLUMNS
                ),
                params![owner, id],
                row_to_subscription,
            )
            .optional()?;

        Ok(subscription)
    }

    fn insert_subscription(&self, owner: &str, new: &NewSubscription) -> Result<Subscription> {
        let new = new.normalized()?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().trunc_subsecs(0);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO subscriptions
                (id, owner, title, category, amount, frequency, notify_before_renewal,
                 start_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                owner,
                new.title,
                new.category.as_str(),
                new.amount,
                new.frequency.as_str(),
                new.notify_before_renewal,
                new.start_date.to_string(),
                format_datetime(&now),
                format_datetime(&now),
            ],
        )?;

        debug!(owner, id = %id, title = %new.title, "Inserted subscription");

        Ok(Subscription {
            id,
            title: new.title,
            category: new.category,
            amount: new.amount,
            frequency: new.frequency,
            notify_before_renewal: new.notify_before_renewal,
            start_date: new.start_date,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_subscription(
        &self,
        owner: &str,
        id: &str,
        new: &NewSubscription,
    ) -> Result<Subscription> {
        let new = new.normalized()?;
        let now = Utc::now().trunc_subsecs(0);

        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE subscriptions
            SET title = ?, category = ?, amount = ?, frequency = ?,
                notify_before_renewal = ?, start_date = ?, updated_at = ?
            WHERE owner = ? AND id = ?
            "#,
            params![
                new.title,
                new.category.as_str(),
                new.amount,
                new.frequency.as_str(),
                new.notify_before_renewal,
                new.start_date.to_string(),
                format_datetime(&now),
                owner,
                id,
            ],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("Subscription {}", id)));
        }

        debug!(owner, id, "Updated subscription");

        self.get_subscription(owner, id)?
            .ok_or_else(|| Error::NotFound(format!("Subscription {}", id)))
    }

    fn delete_subscription(&self, owner: &str, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM subscriptions WHERE owner = ? AND id = ?",
            params![owner, id],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("Subscription {}", id)));
        }

        debug!(owner, id, "Deleted subscription");
        Ok(())
    }
}
