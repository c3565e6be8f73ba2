use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the last refresh that covered a source. Disabled sources are
/// `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperStatus {
    #[default]
    Idle,
    Success,
    Error,
}

impl ScraperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A listings portal that feeds the property store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub last_scraped: Option<DateTime<Utc>>,
    pub property_count: usize,
    pub status: ScraperStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperStats {
    pub total_properties: usize,
    pub last_updated: DateTime<Utc>,
    pub active_sources: usize,
    pub total_sources: usize,
}
