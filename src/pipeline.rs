use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, Instrument};

use crate::config::ReportConfig;
use crate::errors::ReportError;
use crate::github::ReleasePublisher;
use crate::notify::WebhookNotifier;
use crate::report::{Aggregator, IssueRecord, Report, ReportWriter, VendorClassifier};
use crate::sentry::{IssueFetcher, SentryClient};
use crate::telemetry::{create_run_span, generate_correlation_id};
use crate::window::ReportWindow;

/// Source of issue records for a report window
#[async_trait]
pub trait IssueSource {
    async fn fetch_issues(&self, window: &ReportWindow) -> Result<Vec<IssueRecord>, ReportError>;
}

/// Publishes a report file and returns its download URL
#[async_trait]
pub trait AssetPublisher {
    async fn publish(&self, file: &Path, window: &ReportWindow) -> Result<String, ReportError>;
}

/// Announces a published report
#[async_trait]
pub trait Notifier {
    async fn notify(&self, report: &Report, download_url: &str) -> Result<(), ReportError>;
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub download_url: String,
    pub vendors: usize,
    pub total_events: u64,
}

/// fetch → aggregate → write → publish → notify, one step after another
pub struct ReportPipeline<S, P, N> {
    source: S,
    aggregator: Aggregator,
    writer: ReportWriter,
    publisher: P,
    notifier: N,
}

impl ReportPipeline<IssueFetcher, ReleasePublisher, WebhookNotifier> {
    /// Wire the production components from a validated configuration
    pub fn from_config(config: &ReportConfig) -> Result<Self, ReportError> {
        let classifier = VendorClassifier::new(config.vendor_table()?);
        let client = SentryClient::new(&config.sentry)?;
        let fetcher = IssueFetcher::new(
            client,
            config.sentry.query.clone(),
            config.sentry.release_count,
            classifier,
        );

        Ok(Self::new(
            fetcher,
            Aggregator::new(config.report.sample_messages),
            ReportWriter::new(&config.report.output_dir),
            ReleasePublisher::new(&config.github)?,
            WebhookNotifier::new(config.webhook.url.clone()),
        ))
    }
}

impl<S, P, N> ReportPipeline<S, P, N>
where
    S: IssueSource + Send + Sync,
    P: AssetPublisher + Send + Sync,
    N: Notifier + Send + Sync,
{
    pub fn new(
        source: S,
        aggregator: Aggregator,
        writer: ReportWriter,
        publisher: P,
        notifier: N,
    ) -> Self {
        Self {
            source,
            aggregator,
            writer,
            publisher,
            notifier,
        }
    }

    pub async fn run(&self, window: &ReportWindow) -> Result<RunSummary, ReportError> {
        let correlation_id = generate_correlation_id();
        let span = create_run_span(&correlation_id, &window.start_label(), &window.end_label());
        self.run_steps(window).instrument(span).await
    }

    async fn run_steps(&self, window: &ReportWindow) -> Result<RunSummary, ReportError> {
        info!("Fetching issues");
        let records = self.source.fetch_issues(window).await?;

        let report = self.aggregator.build_report(*window, records);
        info!(
            vendors = report.rows.len(),
            total_events = report.total_events(),
            "Aggregated issues by vendor"
        );

        let report_path = self.writer.write(&report)?;
        let download_url = self.publisher.publish(&report_path, window).await?;
        self.notifier.notify(&report, &download_url).await?;
        info!(url = %download_url, "Report delivered");

        Ok(RunSummary {
            report_path,
            download_url,
            vendors: report.rows.len(),
            total_events: report.total_events(),
        })
    }
}
