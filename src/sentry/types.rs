use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Issue as returned by the project issues endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentryIssue {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Event count; Sentry sends it as a decimal string
    #[serde(default, deserialize_with = "count_from_string_or_number")]
    pub count: u64,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub metadata: IssueMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueMetadata {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl SentryIssue {
    /// Title, then metadata value, then empty
    pub fn message(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.metadata.value.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentryRelease {
    pub version: String,
}

/// One value of an issue tag, e.g. a user identifier
#[derive(Debug, Clone, Deserialize)]
pub struct TagValue {
    pub value: String,
}

fn count_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
