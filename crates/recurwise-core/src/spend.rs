//! Spend aggregation
//!
//! Normalizes per-period amounts to monthly and yearly equivalents and sums
//! them in total or per category. Amounts are never rounded here; see
//! [`format_amount`] for display.

use crate::models::{Category, CategorySpend, Frequency, SpendSummary, Subscription};

const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Amount normalized to a month on a 12-month year basis
pub fn monthly_equivalent(amount: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => amount * WEEKS_PER_YEAR / MONTHS_PER_YEAR,
        Frequency::Monthly => amount,
        Frequency::Yearly => amount / MONTHS_PER_YEAR,
    }
}

/// Amount normalized to a full year
pub fn yearly_equivalent(amount: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => amount * WEEKS_PER_YEAR,
        Frequency::Monthly => amount * MONTHS_PER_YEAR,
        Frequency::Yearly => amount,
    }
}

pub fn total_monthly_spend(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .map(|s| monthly_equivalent(s.amount, s.frequency))
        .sum()
}

pub fn total_yearly_spend(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .map(|s| yearly_equivalent(s.amount, s.frequency))
        .sum()
}

/// Monthly spend for one category (0 when nothing matches)
pub fn category_monthly_spend(subscriptions: &[Subscription], category: Category) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.category == category)
        .map(|s| monthly_equivalent(s.amount, s.frequency))
        .sum()
}

/// Distinct categories present, in catalog order
pub fn active_categories(subscriptions: &[Subscription]) -> Vec<Category> {
    Category::ALL
        .iter()
        .copied()
        .filter(|c| subscriptions.iter().any(|s| s.category == *c))
        .collect()
}

/// Categories present with their spend, highest monthly total first.
///
/// Ties keep catalog order.
pub fn rank_categories_by_spend(subscriptions: &[Subscription]) -> Vec<CategorySpend> {
    let mut ranked: Vec<CategorySpend> = active_categories(subscriptions)
        .into_iter()
        .map(|category| {
            let members: Vec<&Subscription> = subscriptions
                .iter()
                .filter(|s| s.category == category)
                .collect();
            CategorySpend {
                category,
                label: category.label().to_string(),
                icon: category.icon().to_string(),
                subscription_count: members.len(),
                monthly_total: members
                    .iter()
                    .map(|s| monthly_equivalent(s.amount, s.frequency))
                    .sum(),
                yearly_total: members
                    .iter()
                    .map(|s| yearly_equivalent(s.amount, s.frequency))
                    .sum(),
            }
        })
        .collect();

    // sort_by is stable, so equal totals stay in catalog order
    ranked.sort_by(|a, b| b.monthly_total.total_cmp(&a.monthly_total));
    ranked
}

/// Totals plus the ranked category breakdown
pub fn summarize(subscriptions: &[Subscription]) -> SpendSummary {
    SpendSummary {
        subscription_count: subscriptions.len(),
        monthly_total: total_monthly_spend(subscriptions),
        yearly_total: total_yearly_spend(subscriptions),
        categories: rank_categories_by_spend(subscriptions),
    }
}

/// "$12.34"
pub fn format_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// "$12", as shown for per-category monthly totals
pub fn format_whole_amount(amount: f64) -> String {
    format!("${:.0}", amount)
}
