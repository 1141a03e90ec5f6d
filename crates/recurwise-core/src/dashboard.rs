//! Dashboard assembly: projected renewals plus spend summary for one owner

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::models::{Dashboard, Subscription, SubscriptionView};
use crate::renewal;
use crate::spend;
use crate::store::SubscriptionStore;

/// Attach projected renewals and order soonest first (ties by title, then id)
pub fn project_views(
    subscriptions: Vec<Subscription>,
    as_of: DateTime<Utc>,
) -> Result<Vec<SubscriptionView>> {
    let mut views = subscriptions
        .into_iter()
        .map(|subscription| {
            let renewal =
                renewal::project(subscription.start_date, subscription.frequency, as_of)?;
            Ok(SubscriptionView {
                subscription,
                renewal,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    views.sort_by(|a, b| {
        a.renewal
            .next_date
            .cmp(&b.renewal.next_date)
            .then_with(|| a.subscription.title.cmp(&b.subscription.title))
            .then_with(|| a.subscription.id.cmp(&b.subscription.id))
    });

    Ok(views)
}

/// Build the dashboard for `owner` as seen at `as_of`
pub fn build_dashboard<S: SubscriptionStore + ?Sized>(
    store: &S,
    owner: &str,
    as_of: DateTime<Utc>,
) -> Result<Dashboard> {
    let subscriptions = store.list_subscriptions(owner)?;
    let summary = spend::summarize(&subscriptions);
    let views = project_views(subscriptions, as_of)?;
    let urgent_count = views.iter().filter(|v| v.renewal.urgent).count();

    debug!(
        owner,
        count = views.len(),
        urgent_count,
        monthly_total = summary.monthly_total,
        "Built dashboard"
    );

    Ok(Dashboard {
        as_of,
        subscriptions: views,
        urgent_count,
        summary,
    })
}
