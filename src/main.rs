use anyhow::{Context, Result};
use clap::Parser;

use vendor_report::{init_telemetry, shutdown_telemetry, ReportConfig, ReportPipeline, ReportWindow};

#[derive(Parser)]
#[command(name = "vendor-report")]
#[command(version)]
#[command(about = "Weekly Sentry error report grouped by vendor")]
#[command(long_about = "Fetches the last seven days of Sentry issues for the most recent releases, \
                       groups them by vendor, writes a CSV, publishes it as a GitHub release asset \
                       and posts a webhook notification. All settings come from the environment \
                       (SENTRY_*, GITHUB_*, WEBHOOK_URL, REPORT_*) or vendor-report.toml.")]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();
    init_telemetry()?;

    let config = ReportConfig::load().context("Failed to load configuration")?;
    let pipeline = ReportPipeline::from_config(&config)?;
    let window = ReportWindow::current();

    let summary = match pipeline.run(&window).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Vendor report run failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        path = %summary.report_path.display(),
        url = %summary.download_url,
        vendors = summary.vendors,
        total_events = summary.total_events,
        "Vendor report complete"
    );
    shutdown_telemetry();
    Ok(())
}
