//! Subscription command implementations

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use recurwise_core::db::Database;
use recurwise_core::models::{Category, Frequency, NewSubscription, Subscription};
use recurwise_core::renewal::parse_as_of;
use recurwise_core::{build_dashboard, spend, SubscriptionStore};

use super::truncate;

/// Fields collected by `recurwise add`
#[derive(Debug, Clone)]
pub struct SubscriptionInput {
    pub title: String,
    pub category: Category,
    pub amount: f64,
    pub frequency: Frequency,
    /// Defaults to today when omitted
    pub start_date: Option<NaiveDate>,
    pub notify_before_renewal: bool,
}

impl SubscriptionInput {
    fn into_new(self, today: NaiveDate) -> NewSubscription {
        NewSubscription {
            title: self.title,
            category: self.category,
            amount: self.amount,
            frequency: self.frequency,
            notify_before_renewal: self.notify_before_renewal,
            start_date: self.start_date.unwrap_or(today),
        }
    }
}

/// Field overrides collected by `recurwise edit`; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct SubscriptionEdit {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub notify_before_renewal: Option<bool>,
}

impl SubscriptionEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.frequency.is_none()
            && self.start_date.is_none()
            && self.notify_before_renewal.is_none()
    }

    /// Merge the overrides onto an existing record
    pub fn apply(&self, existing: &Subscription) -> NewSubscription {
        let mut new = NewSubscription::from(existing);
        if let Some(title) = &self.title {
            new.title = title.clone();
        }
        if let Some(category) = self.category {
            new.category = category;
        }
        if let Some(amount) = self.amount {
            new.amount = amount;
        }
        if let Some(frequency) = self.frequency {
            new.frequency = frequency;
        }
        if let Some(start_date) = self.start_date {
            new.start_date = start_date;
        }
        if let Some(notify) = self.notify_before_renewal {
            new.notify_before_renewal = notify;
        }
        new
    }
}

fn print_subscription(sub: &Subscription) {
    println!("   ID:        {}", sub.id);
    println!("   Title:     {}", sub.title);
    println!("   Category:  {} {}", sub.category.icon(), sub.category.label());
    println!(
        "   Amount:    {}{}",
        spend::format_amount(sub.amount),
        sub.frequency.suffix()
    );
    println!("   Starts:    {}", sub.start_date);
    if sub.notify_before_renewal {
        println!("   🔔 Reminder before renewal");
    }
}

pub fn cmd_add(db: &Database, owner: &str, input: SubscriptionInput) -> Result<()> {
    let new = input.into_new(Utc::now().date_naive());
    let created = db
        .insert_subscription(owner, &new)
        .context("Failed to add subscription")?;

    println!("✅ Added subscription");
    print_subscription(&created);

    Ok(())
}

pub fn cmd_edit(db: &Database, owner: &str, id: &str, edit: &SubscriptionEdit) -> Result<()> {
    if edit.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one field (e.g. --amount 9.99)");
    }

    let existing = db
        .get_subscription(owner, id)?
        .ok_or_else(|| anyhow::anyhow!("Subscription not found: {}", id))?;

    let updated = db
        .update_subscription(owner, id, &edit.apply(&existing))
        .context("Failed to update subscription")?;

    println!("✅ Updated subscription");
    print_subscription(&updated);

    Ok(())
}

pub fn cmd_delete(db: &Database, owner: &str, id: &str) -> Result<()> {
    db.delete_subscription(owner, id)
        .with_context(|| format!("Failed to delete subscription {}", id))?;

    println!("🗑️  Deleted subscription {}", id);

    Ok(())
}

pub fn cmd_list(db: &Database, owner: &str, as_of: Option<&str>) -> Result<()> {
    let as_of = parse_as_of(as_of, Utc::now())?;
    let dashboard = build_dashboard(db, owner, as_of)?;

    if dashboard.subscriptions.is_empty() {
        println!("No subscriptions yet. Add one with:");
        println!("  recurwise add -t Netflix -c streaming -a 15.49");
        return Ok(());
    }

    println!();
    println!("📋 Subscriptions (as of {})", as_of.format("%Y-%m-%d %H:%M UTC"));
    println!("   ─────────────────────────────────────────────────────────────────────────");

    for view in &dashboard.subscriptions {
        let sub = &view.subscription;
        let marker = if view.renewal.urgent { "⏰" } else { "  " };

        println!(
            "   {} {:20} │ {:>10}{:<3} │ {} {:16} │ {} ({})",
            marker,
            truncate(&sub.title, 20),
            spend::format_amount(sub.amount),
            sub.frequency.suffix(),
            sub.category.icon(),
            truncate(sub.category.label(), 16),
            view.renewal.next_date,
            view.renewal.label,
        );
    }

    println!();
    println!(
        "   {} subscriptions, {} renewing within a week",
        dashboard.subscriptions.len(),
        dashboard.urgent_count
    );

    Ok(())
}
