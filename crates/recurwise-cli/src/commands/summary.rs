//! Spend summary and category catalog commands

use anyhow::Result;
use chrono::Utc;
use recurwise_core::db::Database;
use recurwise_core::models::category_catalog;
use recurwise_core::renewal::parse_as_of;
use recurwise_core::{build_dashboard, spend};

pub fn cmd_summary(db: &Database, owner: &str, as_of: Option<&str>) -> Result<()> {
    let as_of = parse_as_of(as_of, Utc::now())?;
    let dashboard = build_dashboard(db, owner, as_of)?;
    let summary = &dashboard.summary;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💰 Recurwise Summary            │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Subscriptions:   {}", summary.subscription_count);
    println!("  Monthly spend:   {}", spend::format_amount(summary.monthly_total));
    println!("  Yearly spend:    {}", spend::format_amount(summary.yearly_total));
    if dashboard.urgent_count > 0 {
        println!("  ⏰ Renewing within a week: {}", dashboard.urgent_count);
    }

    if summary.categories.is_empty() {
        println!();
        return Ok(());
    }

    println!();
    println!("  By category (monthly)");
    println!("   ─────────────────────────────────────────");
    for category in &summary.categories {
        println!(
            "   {} {:16} │ {:>7} │ {} sub(s)",
            category.icon,
            category.label,
            spend::format_whole_amount(category.monthly_total),
            category.subscription_count,
        );
    }
    println!();

    Ok(())
}

pub fn cmd_categories() -> Result<()> {
    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");

    for info in category_catalog() {
        println!("   {} {:12} {}", info.icon, info.value.as_str(), info.label);
    }

    Ok(())
}
