use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

use crate::window::ReportWindow;

/// Name the unmatched bucket is reported under
pub const UNKNOWN_VENDOR: &str = "unknown";

/// Grouping key of the report
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vendor {
    Named(String),
    Unknown,
}

impl Vendor {
    pub fn name(&self) -> &str {
        match self {
            Vendor::Named(name) => name,
            Vendor::Unknown => UNKNOWN_VENDOR,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One issue as fetched for the report window
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub id: String,
    pub message: String,
    pub vendor: Vendor,
    pub events: u64,
    pub users: BTreeSet<String>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// 1-based position after ordering
    pub rank: usize,
    pub vendor: Vendor,
    pub events: u64,
    pub unique_users: usize,
    pub unique_messages: usize,
    pub sample_messages: Vec<String>,
}

/// Ordered rows for one window
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub window: ReportWindow,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn total_events(&self) -> u64 {
        self.rows.iter().map(|row| row.events).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
