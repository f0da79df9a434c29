use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured JSON logging.
///
/// Verbosity comes from `RUST_LOG`, with `info` as the floor so a scheduled
/// run always leaves a trace of each stage in the job log.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init()?;

    tracing::info!("Vendor report telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID linking every event of one report run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create the span a whole report run executes in
pub fn create_run_span(
    correlation_id: &str,
    window_start: &str,
    window_end: &str,
) -> tracing::Span {
    tracing::info_span!(
        "vendor_report_run",
        correlation.id = correlation_id,
        window.start = window_start,
        window.end = window_end,
        otel.kind = "internal"
    )
}

pub fn shutdown_telemetry() {
    tracing::info!("Vendor report telemetry shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique_uuids() {
        let a = generate_correlation_id();
        let b = generate_correlation_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
