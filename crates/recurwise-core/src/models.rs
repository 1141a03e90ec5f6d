//! Domain models for Recurwise

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length of a subscription title (in characters)
pub const MAX_TITLE_LEN: usize = 100;

/// A tracked subscription, as stored for one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Opaque id assigned at creation (UUID v4)
    pub id: String,
    pub title: String,
    pub category: Category,
    /// Amount charged per billing period
    pub amount: f64,
    pub frequency: Frequency,
    /// Stored preference only; nothing schedules notifications from it
    pub notify_before_renewal: bool,
    /// First billing occurrence
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a subscription (used for both create and full replace)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub title: String,
    pub category: Category,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(default)]
    pub notify_before_renewal: bool,
    pub start_date: NaiveDate,
}

impl NewSubscription {
    /// Check the record invariants before it reaches the store.
    ///
    /// The title is expected to be trimmed already; see [`NewSubscription::normalized`].
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_amount(self.amount)?;
        Ok(())
    }

    /// Copy with the title trimmed, then validated
    pub fn normalized(&self) -> Result<Self> {
        let normalized = Self {
            title: self.title.trim().to_string(),
            ..self.clone()
        };
        normalized.validate()?;
        Ok(normalized)
    }
}

impl From<&Subscription> for NewSubscription {
    fn from(sub: &Subscription) -> Self {
        Self {
            title: sub.title.clone(),
            category: sub.category,
            amount: sub.amount,
            frequency: sub.frequency,
            notify_before_renewal: sub.notify_before_renewal,
            start_date: sub.start_date,
        }
    }
}

pub(crate) fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidData("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::InvalidData(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::InvalidData(format!(
            "Amount must be a finite number, got {}",
            amount
        )));
    }
    if amount < 0.0 {
        return Err(Error::InvalidData(format!(
            "Amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

/// Subscription billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Self::Weekly, Self::Monthly, Self::Yearly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Short per-period suffix for amounts ("$9.99/mo")
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Weekly => "/wk",
            Self::Monthly => "/mo",
            Self::Yearly => "/yr",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!(
                "Unknown frequency: {} (valid: weekly, monthly, yearly)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subscription category tag
///
/// Declaration order is the catalog order, which is also the tie-break order
/// when ranking categories by spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Streaming,
    Music,
    Cloud,
    Gaming,
    News,
    Fitness,
    Meals,
    Learning,
    Software,
    Fashion,
    Beauty,
    Pets,
    Health,
    Hobbies,
    Transit,
    Finance,
    Internet,
    Mobile,
}

impl Category {
    /// Every category, in catalog order
    pub const ALL: [Category; 18] = [
        Self::Streaming,
        Self::Music,
        Self::Cloud,
        Self::Gaming,
        Self::News,
        Self::Fitness,
        Self::Meals,
        Self::Learning,
        Self::Software,
        Self::Fashion,
        Self::Beauty,
        Self::Pets,
        Self::Health,
        Self::Hobbies,
        Self::Transit,
        Self::Finance,
        Self::Internet,
        Self::Mobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Music => "music",
            Self::Cloud => "cloud",
            Self::Gaming => "gaming",
            Self::News => "news",
            Self::Fitness => "fitness",
            Self::Meals => "meals",
            Self::Learning => "learning",
            Self::Software => "software",
            Self::Fashion => "fashion",
            Self::Beauty => "beauty",
            Self::Pets => "pets",
            Self::Health => "health",
            Self::Hobbies => "hobbies",
            Self::Transit => "transit",
            Self::Finance => "finance",
            Self::Internet => "internet",
            Self::Mobile => "mobile",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Streaming => "Streaming",
            Self::Music => "Music",
            Self::Cloud => "Cloud",
            Self::Gaming => "Gaming",
            Self::News => "News",
            Self::Fitness => "Fitness",
            Self::Meals => "Meals",
            Self::Learning => "Learning",
            Self::Software => "Software",
            Self::Fashion => "Fashion",
            Self::Beauty => "Beauty",
            Self::Pets => "Pets",
            Self::Health => "Health",
            Self::Hobbies => "Hobbies",
            Self::Transit => "Transit",
            Self::Finance => "Finance",
            Self::Internet => "Internet",
            Self::Mobile => "Mobile",
        }
    }

    /// Icon glyph shown next to the label
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Streaming => "📺",
            Self::Music => "🎵",
            Self::Cloud => "☁️",
            Self::Gaming => "🎮",
            Self::News => "📰",
            Self::Fitness => "🏋️",
            Self::Meals => "🍱",
            Self::Learning => "📚",
            Self::Software => "💻",
            Self::Fashion => "👗",
            Self::Beauty => "💄",
            Self::Pets => "🐾",
            Self::Health => "💊",
            Self::Hobbies => "🎨",
            Self::Transit => "🚗",
            Self::Finance => "🏦",
            Self::Internet => "🛜",
            Self::Mobile => "📱",
        }
    }

    /// Position in the catalog
    pub fn catalog_index(&self) -> usize {
        *self as usize
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog entry for display layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub value: Category,
    pub label: String,
    pub icon: String,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            value: category,
            label: category.label().to_string(),
            icon: category.icon().to_string(),
        }
    }
}

/// The full category catalog in display order
pub fn category_catalog() -> Vec<CategoryInfo> {
    Category::ALL.iter().copied().map(CategoryInfo::from).collect()
}

// ========== Projection & Summary Models ==========

/// Projected next renewal of a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renewal {
    pub next_date: NaiveDate,
    /// Relative label, e.g. "tomorrow" or "in 3 days"
    pub label: String,
    /// Renews within the next 7 days
    pub urgent: bool,
}

/// A subscription together with its projected renewal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub renewal: Renewal,
}

/// Monthly and yearly spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: Category,
    pub label: String,
    pub icon: String,
    pub subscription_count: usize,
    pub monthly_total: f64,
    pub yearly_total: f64,
}

/// Aggregate spend figures for a set of subscriptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendSummary {
    pub subscription_count: usize,
    pub monthly_total: f64,
    pub yearly_total: f64,
    /// Categories present, highest monthly spend first
    pub categories: Vec<CategorySpend>,
}

/// Everything the main screen needs for one owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub as_of: DateTime<Utc>,
    /// Ordered by next renewal date, soonest first
    pub subscriptions: Vec<SubscriptionView>,
    pub urgent_count: usize,
    pub summary: SpendSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sub(title: &str, amount: f64) -> NewSubscription {
        NewSubscription {
            title: title.to_string(),
            category: Category::Streaming,
            amount,
            frequency: Frequency::Monthly,
            notify_before_renewal: false,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("MONTHLY".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!(" yearly ".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!("daily".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_suffix() {
        assert_eq!(Frequency::Weekly.suffix(), "/wk");
        assert_eq!(Frequency::Monthly.suffix(), "/mo");
        assert_eq!(Frequency::Yearly.suffix(), "/yr");
    }

    #[test]
    fn test_category_roundtrip_strings() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_catalog_order() {
        let catalog = category_catalog();
        assert_eq!(catalog.len(), 18);
        assert_eq!(catalog[0].value, Category::Streaming);
        assert_eq!(catalog[0].label, "Streaming");
        assert_eq!(catalog[17].value, Category::Mobile);
        assert_eq!(catalog[17].icon, "📱");
        assert_eq!(Category::Music.catalog_index(), 1);
    }

    #[test]
    fn test_frequency_serde_rejects_unknown() {
        let parsed: std::result::Result<Frequency, _> = serde_json::from_str("\"daily\"");
        assert!(parsed.is_err());
        let parsed: Frequency = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(parsed, Frequency::Weekly);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(new_sub("Netflix", 15.49).validate().is_ok());
        assert!(new_sub("Free tier", 0.0).validate().is_ok());
        assert!(matches!(
            new_sub("", 10.0).validate(),
            Err(Error::InvalidData(_))
        ));
        assert!(new_sub("   ", 10.0).validate().is_err());
        assert!(new_sub("Netflix", -1.0).validate().is_err());
        assert!(new_sub("Netflix", f64::NAN).validate().is_err());
        assert!(new_sub("Netflix", f64::INFINITY).validate().is_err());
        assert!(new_sub(&"x".repeat(101), 1.0).validate().is_err());
    }

    #[test]
    fn test_normalized_trims_title() {
        let normalized = new_sub("  Spotify  ", 10.99).normalized().unwrap();
        assert_eq!(normalized.title, "Spotify");
    }

    #[test]
    fn test_new_subscription_notify_defaults_false() {
        let json = r#"{"title":"Hulu","category":"streaming","amount":17.99,"frequency":"monthly","start_date":"2024-02-01"}"#;
        let parsed: NewSubscription = serde_json::from_str(json).unwrap();
        assert!(!parsed.notify_before_renewal);
        assert_eq!(parsed.category, Category::Streaming);
    }
}
