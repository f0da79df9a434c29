use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::{IssueRecord, Report, ReportRow, Vendor};
use crate::window::ReportWindow;

/// Running totals for one vendor during a single aggregation pass
#[derive(Debug)]
struct VendorBucket {
    vendor: Vendor,
    events: u64,
    users: BTreeSet<String>,
    messages: BTreeSet<String>,
}

impl VendorBucket {
    fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            events: 0,
            users: BTreeSet::new(),
            messages: BTreeSet::new(),
        }
    }

    fn absorb(&mut self, record: IssueRecord) {
        self.events = self.events.saturating_add(record.events);
        self.users.extend(record.users);
        self.messages.insert(record.message);
    }

    fn into_row(self, sample_limit: usize) -> ReportRow {
        ReportRow {
            rank: 0,
            unique_users: self.users.len(),
            unique_messages: self.messages.len(),
            sample_messages: self.messages.into_iter().take(sample_limit).collect(),
            vendor: self.vendor,
            events: self.events,
        }
    }
}

/// Groups issue records into ranked per-vendor report rows
#[derive(Debug, Clone)]
pub struct Aggregator {
    sample_limit: usize,
}

impl Aggregator {
    pub fn new(sample_limit: usize) -> Self {
        Self { sample_limit }
    }

    /// Build the report for `window` from everything fetched for it
    pub fn build_report<I>(&self, window: ReportWindow, records: I) -> Report
    where
        I: IntoIterator<Item = IssueRecord>,
    {
        Report {
            window,
            rows: self.aggregate(records),
        }
    }

    /// One row per vendor, most events first, vendor name ascending on ties.
    ///
    /// Records are deduplicated by issue id before anything is counted.
    pub fn aggregate<I>(&self, records: I) -> Vec<ReportRow>
    where
        I: IntoIterator<Item = IssueRecord>,
    {
        let mut buckets: HashMap<Vendor, VendorBucket> = HashMap::new();
        for record in dedup_by_id(records).into_values() {
            buckets
                .entry(record.vendor.clone())
                .or_insert_with(|| VendorBucket::new(record.vendor.clone()))
                .absorb(record);
        }

        let mut rows: Vec<ReportRow> = buckets
            .into_values()
            .map(|bucket| bucket.into_row(self.sample_limit))
            .collect();

        rows.sort_by(|a, b| {
            b.events
                .cmp(&a.events)
                .then_with(|| a.vendor.name().cmp(b.vendor.name()))
                .then_with(|| a.vendor.cmp(&b.vendor))
        });
        for (index, row) in rows.iter_mut().enumerate() {
            row.rank = index + 1;
        }
        rows
    }
}

/// Collapse records sharing an issue id.
///
/// The same issue shows up once per day it was seen; the most recently seen
/// copy wins, and the first one wins when timestamps are equal.
pub fn dedup_by_id<I>(records: I) -> BTreeMap<String, IssueRecord>
where
    I: IntoIterator<Item = IssueRecord>,
{
    let mut unique = BTreeMap::new();
    for record in records {
        match unique.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.last_seen > slot.get().last_seen {
                    slot.insert(record);
                }
            }
        }
    }
    unique
}
