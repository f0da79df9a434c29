use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{SentryIssue, SentryRelease, TagValue};
use crate::config::SentryConfig;

static LINK_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("link attribute pattern is valid"));

#[derive(Debug, Error)]
pub enum SentryError {
    #[error("request to Sentry failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sentry returned HTTP {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("invalid Sentry URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Thin client over the Sentry web API
#[derive(Debug, Clone)]
pub struct SentryClient {
    http: reqwest::Client,
    base_url: Url,
    org: String,
    project: String,
    token: String,
}

impl SentryClient {
    pub fn new(config: &SentryConfig) -> Result<Self, SentryError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SentryError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            org: config.org.clone(),
            project: config.project.clone(),
            token: config.token.clone(),
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Versions of the `limit` most recent releases of the project
    pub async fn recent_releases(&self, limit: u32) -> Result<Vec<String>, SentryError> {
        let path = format!("/api/0/projects/{}/{}/releases/", self.org, self.project);
        let page: Page<SentryRelease> = self
            .get_page(&path, &[("per_page", limit.to_string())], None)
            .await?;

        Ok(page
            .items
            .into_iter()
            .take(limit as usize)
            .map(|release| release.version)
            .collect())
    }

    /// One page of project issues matching `query`
    pub async fn issues_page(
        &self,
        query: &str,
        cursor: Option<&str>,
    ) -> Result<Page<SentryIssue>, SentryError> {
        let path = format!("/api/0/projects/{}/{}/issues/", self.org, self.project);
        self.get_page(&path, &[("query", query.to_string())], cursor)
            .await
    }

    /// Every value of the `user` tag recorded on an issue
    pub async fn issue_users(&self, issue_id: &str) -> Result<BTreeSet<String>, SentryError> {
        let path = format!(
            "/api/0/organizations/{}/issues/{}/tags/user/values/",
            self.org, issue_id
        );

        let mut users = BTreeSet::new();
        let mut cursor: Option<String> = None;
        loop {
            let page: Page<TagValue> = self.get_page(&path, &[], cursor.as_deref()).await?;
            users.extend(page.items.into_iter().map(|tag| tag.value));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(users)
    }

    /// `path` appended to the base URL, keeping any prefix of a self-hosted install
    fn endpoint(&self, path: &str) -> Result<Url, SentryError> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| SentryError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        cursor: Option<&str>,
    ) -> Result<Page<T>, SentryError> {
        let mut url = self.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }

        debug!(url = %url, "Sentry GET");
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, url = %url, "Sentry request rejected");
            return Err(SentryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let next_cursor = link_next_cursor(response.headers());
        let items = response.json::<Vec<T>>().await?;
        Ok(Page { items, next_cursor })
    }
}

fn link_next_cursor(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LINK)
        .and_then(|value| value.to_str().ok())
        .and_then(next_cursor)
}

/// Cursor of the `rel="next"` entry of a Sentry `Link` header, if it has results.
///
/// Sentry always sends a next link; `results="false"` marks the end of the listing.
pub fn next_cursor(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let mut rel = None;
        let mut results = None;
        let mut cursor = None;
        for capture in LINK_ATTRIBUTE.captures_iter(entry) {
            let value = capture[2].to_string();
            match &capture[1] {
                "rel" => rel = Some(value),
                "results" => results = Some(value),
                "cursor" => cursor = Some(value),
                _ => {}
            }
        }
        match (rel.as_deref(), results.as_deref()) {
            (Some("next"), Some("true")) => cursor.filter(|c| !c.is_empty()),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://sentry.io/api/0/projects/acme/web/issues/";

    #[test]
    fn test_next_cursor_with_results() {
        let link = format!(
            "<{BASE}?&cursor=100:0:1>; rel=\"previous\"; results=\"false\"; cursor=\"100:0:1\", \
             <{BASE}?&cursor=100:100:0>; rel=\"next\"; results=\"true\"; cursor=\"100:100:0\""
        );
        assert_eq!(next_cursor(&link), Some("100:100:0".to_string()));
    }

    #[test]
    fn test_next_cursor_exhausted() {
        let link = format!(
            "<{BASE}?&cursor=100:0:1>; rel=\"previous\"; results=\"true\"; cursor=\"100:0:1\", \
             <{BASE}?&cursor=100:100:0>; rel=\"next\"; results=\"false\"; cursor=\"100:100:0\""
        );
        assert_eq!(next_cursor(&link), None);
    }

    #[test]
    fn test_next_cursor_garbage() {
        assert_eq!(next_cursor(""), None);
        assert_eq!(next_cursor("not a link header"), None);
    }

    fn config(base_url: &str) -> SentryConfig {
        SentryConfig {
            org: "acme".to_string(),
            project: "web".to_string(),
            token: "t".to_string(),
            query: "is:unresolved".to_string(),
            base_url: base_url.to_string(),
            release_count: 5,
        }
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        assert!(matches!(
            SentryClient::new(&config("::nope")),
            Err(SentryError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = SentryClient::new(&config("https://errors.example.com/sentry/")).unwrap();
        assert_eq!(
            client.endpoint("/api/0/projects/acme/web/issues/").unwrap().as_str(),
            "https://errors.example.com/sentry/api/0/projects/acme/web/issues/"
        );

        let client = SentryClient::new(&config("https://sentry.io")).unwrap();
        assert_eq!(
            client.endpoint("/api/0/projects/acme/web/issues/").unwrap().as_str(),
            "https://sentry.io/api/0/projects/acme/web/issues/"
        );
    }
}
