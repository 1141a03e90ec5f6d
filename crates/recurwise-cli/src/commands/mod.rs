//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db)
//! - `export` - CSV/JSON export and backup import
//! - `serve` - Web server command
//! - `status` - Status/audit/reset commands
//! - `subscriptions` - Subscription add/edit/delete/list
//! - `summary` - Spend summary and category catalog

pub mod core;
pub mod export;
pub mod serve;
pub mod status;
pub mod subscriptions;
pub mod summary;

// Re-export command functions for main.rs
pub use core::*;
pub use export::*;
pub use serve::*;
pub use status::*;
pub use subscriptions::*;
pub use summary::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
