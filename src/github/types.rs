// GitHub repository types.
// Raw API entries and the normalized summary shared by every fetch strategy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One repository as displayed on the portfolio.
///
/// Field names on the wire follow the REST API so cached snapshots stay
/// readable by anything that understands the provider's format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "html_url", default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(rename = "stargazers_count", default, deserialize_with = "null_as_default")]
    pub stars: u64,
    #[serde(rename = "forks_count", default, deserialize_with = "null_as_default")]
    pub forks: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pushed_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
}

impl RepoSummary {
    /// Parsed `pushed_at`, if it is a timestamp rather than provider prose.
    pub fn pushed_at_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.pushed_at)
    }
}

/// Repository entry from `GET /users/{user}/repos`.
///
/// Everything is optional: a partially populated entry still maps to a
/// summary, with zero counts and no topics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRepository {
    pub name: Option<String>,
    pub html_url: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub pushed_at: Option<String>,
    pub topics: Option<Vec<String>>,
}

impl ApiRepository {
    pub fn pushed_at_time(&self) -> Option<DateTime<Utc>> {
        self.pushed_at.as_deref().and_then(parse_timestamp)
    }
}

impl From<ApiRepository> for RepoSummary {
    fn from(repo: ApiRepository) -> Self {
        Self {
            name: repo.name.unwrap_or_default(),
            url: repo.html_url.unwrap_or_default(),
            description: repo.description.unwrap_or_default(),
            language: repo.language.unwrap_or_default(),
            stars: repo.stargazers_count.unwrap_or(0),
            forks: repo.forks_count.unwrap_or(0),
            pushed_at: repo.pushed_at.unwrap_or_default(),
            topics: repo.topics.unwrap_or_default(),
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
