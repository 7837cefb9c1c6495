use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

// ============================================================================
// Status
// ============================================================================

/// Editorial status of a news record.
///
/// The API does not filter server-side, so drafts and archived records arrive
/// alongside published ones. Only [`NewsStatus::Published`] is ever displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NewsStatus {
    Published,
    Draft,
    /// Any other value, kept verbatim for logging.
    Other(String),
    #[default]
    Unknown,
}

impl From<String> for NewsStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "published" => Self::Published,
            "draft" => Self::Draft,
            "" => Self::Unknown,
            _ => Self::Other(raw),
        }
    }
}

impl NewsStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

// ============================================================================
// Records
// ============================================================================

/// Summary form of a news record, as returned by `GET /news-feeds`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: NewsStatus,
    /// `None` means unscheduled or unknown; such items sort last.
    #[serde(
        default,
        alias = "publishedAt",
        deserialize_with = "deserialize_lenient_timestamp"
    )]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "isFeatured", deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default, alias = "viewsCount", deserialize_with = "null_as_default")]
    pub views_count: u64,
    #[serde(default, alias = "categoryName", deserialize_with = "null_as_empty")]
    pub category_name: String,
    #[serde(default, alias = "authorName", deserialize_with = "null_as_empty")]
    pub author_name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewsItem {
    /// Whether the list card shows the popularity badge.
    pub fn is_highlighted(&self) -> bool {
        self.is_featured || self.views_count > 0
    }
}

/// An `{ id, name }` pair used for the author and category of a detail record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

/// Full news record, as returned by `GET /news-feeds/{slug}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsDetail {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: NewsStatus,
    #[serde(
        default,
        alias = "publishedAt",
        deserialize_with = "deserialize_lenient_timestamp"
    )]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "isFeatured", deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default, alias = "viewsCount", deserialize_with = "null_as_default")]
    pub views_count: u64,
    #[serde(default, alias = "metaTitle")]
    pub meta_title: Option<String>,
    #[serde(default, alias = "metaDescription")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub author: Option<NamedRef>,
    #[serde(default)]
    pub category: Option<NamedRef>,
}

impl NewsDetail {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map_or("", |a| a.name.as_str())
    }

    pub fn category_name(&self) -> &str {
        self.category.as_ref().map_or("", |c| c.name.as_str())
    }

    pub fn is_highlighted(&self) -> bool {
        self.is_featured || self.views_count > 0
    }
}

// ============================================================================
// Timestamp parsing
// ============================================================================

/// Parse an "ISO-ish" timestamp from the API.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS[.f]` and
/// bare `YYYY-MM-DD`. Naive values are taken as UTC. Returns `None` for empty
/// or unrecognised input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<NewsStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(NewsStatus::from).unwrap_or_default())
}

fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|s| {
        let parsed = parse_timestamp(s);
        if parsed.is_none() && !s.trim().is_empty() {
            tracing::debug!(value = %s, "Unrecognised published_at, treating as unknown");
        }
        parsed
    }))
}
