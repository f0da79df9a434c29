//! Slack-compatible webhook notification for a published report.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::ReportError;
use crate::pipeline::Notifier;
use crate::report::Report;

/// Vendors listed in the message body
const SUMMARY_LINES: usize = 5;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Posts report announcements to an incoming webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn send(&self, report: &Report, download_url: &str) -> Result<(), NotifyError> {
        let payload = Self::format_payload(report, download_url);
        debug!(channel = "webhook", title = %payload.attachments[0].title, "Sending notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            debug!(channel = "webhook", "Notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                channel = "webhook",
                status = %status,
                body = %body,
                "Webhook request failed"
            );
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Title, summary body and a link to the CSV
    pub fn format_payload(report: &Report, download_url: &str) -> WebhookPayload {
        let title = format!(
            "Sentry vendors report {} – {}",
            report.window.start_label(),
            report.window.end_label()
        );

        let attachment = WebhookAttachment {
            fallback: format!("{title}: {download_url}"),
            color: if report.is_empty() { "#2ecc71" } else { "#e67e22" }.to_string(),
            title: title.clone(),
            title_link: download_url.to_string(),
            text: Self::format_summary(report),
            footer: format!(
                "{} vendors | {} events",
                report.rows.len(),
                report.total_events()
            ),
        };

        WebhookPayload {
            text: format!("{title}\n<{download_url}|Download CSV>"),
            attachments: vec![attachment],
        }
    }

    fn format_summary(report: &Report) -> String {
        if report.is_empty() {
            return "No vendor errors in this window.".to_string();
        }

        let mut lines: Vec<String> = report
            .rows
            .iter()
            .take(SUMMARY_LINES)
            .map(|row| {
                format!(
                    "{}. *{}*: {} events, {} users",
                    row.rank,
                    row.vendor.name(),
                    row.events,
                    row.unique_users
                )
            })
            .collect();
        if report.rows.len() > SUMMARY_LINES {
            lines.push(format!("…and {} more", report.rows.len() - SUMMARY_LINES));
        }
        lines.join("\n")
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, report: &Report, download_url: &str) -> Result<(), ReportError> {
        Ok(self.send(report, download_url).await?)
    }
}

// =============================================================================
// Webhook payload types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub text: String,
    pub attachments: Vec<WebhookAttachment>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAttachment {
    pub fallback: String,
    pub color: String,
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub footer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportRow, Vendor};
    use crate::window::ReportWindow;
    use chrono::{TimeZone, Utc};

    fn row(rank: usize, vendor: &str, events: u64) -> ReportRow {
        ReportRow {
            rank,
            vendor: Vendor::Named(vendor.to_string()),
            events,
            unique_users: 2,
            unique_messages: 1,
            sample_messages: vec![],
        }
    }

    fn window() -> ReportWindow {
        ReportWindow::ending_at(Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_payload_links_to_asset() {
        let report = Report {
            window: window(),
            rows: vec![row(1, "Shopify", 10), row(2, "Amazon", 8)],
        };
        let payload = WebhookNotifier::format_payload(&report, "https://example.com/r.csv");
        let attachment = &payload.attachments[0];

        assert_eq!(attachment.title, "Sentry vendors report 2024-03-04 – 2024-03-10");
        assert_eq!(attachment.title_link, "https://example.com/r.csv");
        assert_eq!(
            attachment.text,
            "1. *Shopify*: 10 events, 2 users\n2. *Amazon*: 8 events, 2 users"
        );
        assert_eq!(attachment.footer, "2 vendors | 18 events");
        assert!(payload.text.contains("<https://example.com/r.csv|Download CSV>"));
    }

    #[test]
    fn test_summary_truncates_long_reports() {
        let rows = (1..=7).map(|i| row(i, &format!("V{i}"), 10 - i as u64)).collect();
        let report = Report { window: window(), rows };
        let payload = WebhookNotifier::format_payload(&report, "u");
        let text = &payload.attachments[0].text;
        assert_eq!(text.lines().count(), 6);
        assert!(text.ends_with("…and 2 more"));
    }

    #[test]
    fn test_empty_report_message() {
        let report = Report { window: window(), rows: vec![] };
        let payload = WebhookNotifier::format_payload(&report, "u");
        assert_eq!(payload.attachments[0].text, "No vendor errors in this window.");
    }
}
