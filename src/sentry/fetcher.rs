use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::client::{SentryClient, SentryError};
use super::types::SentryIssue;
use crate::errors::ReportError;
use crate::pipeline::IssueSource;
use crate::report::{IssueRecord, VendorClassifier};
use crate::window::{DaySlice, ReportWindow};

/// Fetches the issues of a report window, one day at a time
#[derive(Debug, Clone)]
pub struct IssueFetcher {
    client: SentryClient,
    base_query: String,
    release_count: u32,
    classifier: VendorClassifier,
}

impl IssueFetcher {
    pub fn new(
        client: SentryClient,
        base_query: impl Into<String>,
        release_count: u32,
        classifier: VendorClassifier,
    ) -> Self {
        Self {
            client,
            base_query: base_query.into(),
            release_count,
            classifier,
        }
    }

    /// All issue sightings of the window. An issue seen on several days is
    /// returned once per day; aggregation collapses the copies.
    pub async fn fetch_window(&self, window: &ReportWindow) -> Result<Vec<IssueRecord>, SentryError> {
        let releases = self.client.recent_releases(self.release_count).await?;
        info!(
            org = %self.client.org(),
            project = %self.client.project(),
            releases = ?releases,
            "Fetching Sentry issues for report window"
        );

        let mut users_by_issue: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut records = Vec::new();

        for day in window.days() {
            let query = build_query(&self.base_query, &releases, &day);
            let mut cursor: Option<String> = None;
            let mut day_count = 0usize;

            loop {
                let page = self.client.issues_page(&query, cursor.as_deref()).await?;
                for issue in page.items {
                    let users = match users_by_issue.get(&issue.id) {
                        Some(users) => users.clone(),
                        None => {
                            let users = self.client.issue_users(&issue.id).await?;
                            users_by_issue.insert(issue.id.clone(), users.clone());
                            users
                        }
                    };
                    records.push(self.to_record(issue, users));
                    day_count += 1;
                }
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }

            debug!(day = %day.start_label(), issues = day_count, "Fetched day");
        }

        info!(
            sightings = records.len(),
            distinct_issues = users_by_issue.len(),
            "Finished fetching Sentry issues"
        );
        Ok(records)
    }

    fn to_record(&self, issue: SentryIssue, users: BTreeSet<String>) -> IssueRecord {
        let message = issue.message();
        let vendor = self
            .classifier
            .classify(issue.metadata.error_type.as_deref(), &message);
        IssueRecord {
            id: issue.id,
            message,
            vendor,
            events: issue.count,
            users,
            last_seen: issue.last_seen,
        }
    }
}

#[async_trait]
impl IssueSource for IssueFetcher {
    async fn fetch_issues(&self, window: &ReportWindow) -> Result<Vec<IssueRecord>, ReportError> {
        Ok(self.fetch_window(window).await?)
    }
}

/// Search query for one day: base filter, release filter, `lastSeen` range
pub fn build_query(base: &str, releases: &[String], day: &DaySlice) -> String {
    let mut parts = vec![base.trim().to_string()];
    if !releases.is_empty() {
        parts.push(format!("release:[{}]", releases.join(",")));
    }
    parts.push(format!("lastSeen:>={}", day.start_label()));
    parts.push(format!("lastSeen:<{}", day.end_label()));
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}
