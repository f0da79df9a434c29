// Vendor Report - weekly Sentry errors grouped by vendor
// This exposes the core components for testing and integration

pub mod config;
pub mod errors;
pub mod github;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod sentry;
pub mod telemetry;
pub mod window;

// Re-export key types for easy access
pub use config::{ConfigError, ReportConfig};
pub use errors::ReportError;
pub use github::{GitHubError, ReleasePublisher};
pub use notify::{NotifyError, WebhookNotifier};
pub use pipeline::{AssetPublisher, IssueSource, Notifier, ReportPipeline, RunSummary};
pub use report::{Aggregator, IssueRecord, Report, ReportRow, ReportWriter, Vendor, VendorClassifier};
pub use sentry::{IssueFetcher, SentryClient, SentryError};
pub use telemetry::{init_telemetry, shutdown_telemetry};
pub use window::ReportWindow;
