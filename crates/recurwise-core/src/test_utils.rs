//! Test utilities for recurwise-core
//!
//! Fixture builders and an in-memory [`SubscriptionStore`] for unit tests
//! and for downstream crates that enable the `test-utils` feature.

use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::models::{Category, Frequency, NewSubscription, Subscription};
use crate::store::SubscriptionStore;

/// Start date used by fixtures unless a test sets its own
pub fn fixture_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid fixture date")
}

/// A new-subscription payload with sensible defaults
pub fn new_subscription(
    title: &str,
    category: Category,
    amount: f64,
    frequency: Frequency,
) -> NewSubscription {
    NewSubscription {
        title: title.to_string(),
        category,
        amount,
        frequency,
        notify_before_renewal: false,
        start_date: fixture_start_date(),
    }
}

/// A stored-looking subscription with a fresh id
pub fn subscription(title: &str, category: Category, amount: f64, frequency: Frequency) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        category,
        amount,
        frequency,
        notify_before_renewal: false,
        start_date: fixture_start_date(),
        created_at: now,
        updated_at: now,
    }
}

/// Vec-backed store keyed by (owner, id)
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<(String, Subscription)>>,
}

impl SubscriptionStore for MemoryStore {
    fn list_subscriptions(&self, owner: &str) -> Result<Vec<Subscription>> {
        let rows = self.rows.lock().expect("memory store lock");
        Ok(rows
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, s)| s.clone())
            .collect())
    }

    fn get_subscription(&self, owner: &str, id: &str) -> Result<Option<Subscription>> {
        let rows = self.rows.lock().expect("memory store lock");
        Ok(rows
            .iter()
            .find(|(o, s)| o == owner && s.id == id)
            .map(|(_, s)| s.clone()))
    }

    fn insert_subscription(&self, owner: &str, new: &NewSubscription) -> Result<Subscription> {
        let new = new.normalized()?;
        let now = Utc::now();
        let sub = Subscription {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            category: new.category,
            amount: new.amount,
            frequency: new.frequency,
            notify_before_renewal: new.notify_before_renewal,
            start_date: new.start_date,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .expect("memory store lock")
            .push((owner.to_string(), sub.clone()));
        Ok(sub)
    }

    fn update_subscription(
        &self,
        owner: &str,
        id: &str,
        new: &NewSubscription,
    ) -> Result<Subscription> {
        let new = new.normalized()?;
        let mut rows = self.rows.lock().expect("memory store lock");
        let (_, sub) = rows
            .iter_mut()
            .find(|(o, s)| o == owner && s.id == id)
            .ok_or_else(|| Error::NotFound(format!("Subscription {}", id)))?;

        sub.title = new.title;
        sub.category = new.category;
        sub.amount = new.amount;
        sub.frequency = new.frequency;
        sub.notify_before_renewal = new.notify_before_renewal;
        sub.start_date = new.start_date;
        sub.updated_at = Utc::now();
        Ok(sub.clone())
    }

    fn delete_subscription(&self, owner: &str, id: &str) -> Result<()> {
        let mut rows = self.rows.lock().expect("memory store lock");
        let before = rows.len();
        rows.retain(|(o, s)| !(o == owner && s.id == id));
        if rows.len() == before {
            return Err(Error::NotFound(format!("Subscription {}", id)));
        }
        Ok(())
    }
}
