use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::types::{Report, ReportRow};
use crate::errors::ReportError;
use crate::window::ReportWindow;

const HEADERS: [&str; 6] = ["Rank", "Vendor", "Events", "Users", "Messages", "Sample Messages"];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    vendor: &'a str,
    events: u64,
    users: usize,
    messages: usize,
    sample_messages: String,
}

impl<'a> From<&'a ReportRow> for CsvRow<'a> {
    fn from(row: &'a ReportRow) -> Self {
        Self {
            rank: row.rank,
            vendor: row.vendor.name(),
            events: row.events,
            users: row.unique_users,
            messages: row.unique_messages,
            sample_messages: row.sample_messages.join("; "),
        }
    }
}

/// Writes reports as CSV files into an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file_name(window: &ReportWindow) -> String {
        format!(
            "sentry_report_{}_to_{}.csv",
            window.start_label(),
            window.end_label()
        )
    }

    /// Write `report` and return the path of the file. The header row is
    /// written even when there are no rows.
    pub fn write(&self, report: &Report) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(Self::file_name(&report.window));

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(HEADERS)?;
        for row in &report.rows {
            writer.serialize(CsvRow::from(row))?;
        }
        writer.flush()?;

        info!(
            path = %path.display(),
            rows = report.rows.len(),
            "Report written"
        );
        Ok(path)
    }
}
