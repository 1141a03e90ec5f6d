//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod export;
pub mod subscriptions;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use categories::*;
pub use dashboard::*;
pub use export::*;
pub use subscriptions::*;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::AppError;

/// `?as_of=` accepted by the projected views
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// YYYY-MM-DD or RFC 3339; defaults to now
    pub as_of: Option<String>,
}

impl AsOfQuery {
    /// Reference instant for this request (reads the clock at most once)
    pub(crate) fn resolve(&self) -> Result<DateTime<Utc>, AppError> {
        Ok(recurwise_core::renewal::parse_as_of(
            self.as_of.as_deref(),
            Utc::now(),
        )?)
    }
}
