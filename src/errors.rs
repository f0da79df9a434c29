use thiserror::Error;

use crate::config::ConfigError;
use crate::github::GitHubError;
use crate::notify::NotifyError;
use crate::sentry::SentryError;

/// Anything that can end a report run
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sentry request failed: {0}")]
    Sentry(#[from] SentryError),

    #[error("{0}")]
    GitHub(#[from] GitHubError),

    #[error("webhook notification failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Csv(#[from] csv::Error),
}
