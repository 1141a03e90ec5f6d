//! Record store seam
//!
//! Subscriptions are always read and written on behalf of one owner (the
//! authenticated user). [`crate::db::Database`] is the production
//! implementation.

use crate::error::Result;
use crate::models::{NewSubscription, Subscription};

/// Owner-scoped storage for subscription records
pub trait SubscriptionStore {
    /// All of the owner's subscriptions
    fn list_subscriptions(&self, owner: &str) -> Result<Vec<Subscription>>;

    /// A single subscription, or `None` if the owner has no such id
    fn get_subscription(&self, owner: &str, id: &str) -> Result<Option<Subscription>>;

    /// Validate and store a new subscription under a freshly generated id
    fn insert_subscription(&self, owner: &str, new: &NewSubscription) -> Result<Subscription>;

    /// Replace every editable field of an existing subscription.
    ///
    /// Returns `Error::NotFound` if the owner has no such id.
    fn update_subscription(
        &self,
        owner: &str,
        id: &str,
        new: &NewSubscription,
    ) -> Result<Subscription>;

    /// Remove a subscription; `Error::NotFound` if the owner has no such id
    fn delete_subscription(&self, owner: &str, id: &str) -> Result<()>;
}
