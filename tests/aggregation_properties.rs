//! Property tests for vendor aggregation
//!
//! Generates arbitrary issue sightings and checks the invariants every report
//! must satisfy: event conservation, idempotent deduplication and ordering.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use vendor_report::report::dedup_by_id;
use vendor_report::{Aggregator, IssueRecord, Vendor};

fn vendor_strategy() -> impl Strategy<Value = Vendor> {
    prop_oneof![
        4 => prop::sample::select(vec!["Amazon", "Shopify", "Adyen", "Klarna"])
            .prop_map(|name| Vendor::Named(name.to_string())),
        1 => Just(Vendor::Unknown),
    ]
}

fn record_strategy() -> impl Strategy<Value = IssueRecord> {
    (
        0u32..40,
        vendor_strategy(),
        0u64..10_000,
        prop::collection::btree_set("u[0-9]{1,2}", 0..5),
        prop::sample::select(vec!["timeout", "bad token", "cart failed", "widget crashed"]),
        0i64..7 * 24 * 3600,
    )
        .prop_map(|(id, vendor, events, users, message, offset)| IssueRecord {
            id: format!("issue-{id}"),
            message: message.to_string(),
            vendor,
            events,
            users,
            last_seen: Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
                + chrono::Duration::seconds(offset),
        })
}

proptest! {
    #[test]
    fn prop_events_are_conserved_per_vendor(records in prop::collection::vec(record_strategy(), 0..60)) {
        let unique = dedup_by_id(records.clone());
        let mut expected: HashMap<Vendor, u64> = HashMap::new();
        for record in unique.values() {
            *expected.entry(record.vendor.clone()).or_default() += record.events;
        }

        let rows = Aggregator::new(3).aggregate(records);
        prop_assert_eq!(rows.len(), expected.len());
        for row in &rows {
            prop_assert_eq!(Some(&row.events), expected.get(&row.vendor));
        }
    }

    #[test]
    fn prop_unique_users_are_union_sizes(records in prop::collection::vec(record_strategy(), 0..60)) {
        let unique = dedup_by_id(records.clone());
        let rows = Aggregator::new(3).aggregate(records);
        for row in &rows {
            let users: BTreeSet<&String> = unique
                .values()
                .filter(|r| r.vendor == row.vendor)
                .flat_map(|r| r.users.iter())
                .collect();
            prop_assert_eq!(row.unique_users, users.len());
        }
    }

    #[test]
    fn prop_feeding_records_twice_changes_nothing(records in prop::collection::vec(record_strategy(), 0..40)) {
        let aggregator = Aggregator::new(3);
        let once = aggregator.aggregate(records.clone());
        let doubled: Vec<IssueRecord> = records.iter().chain(records.iter()).cloned().collect();
        prop_assert_eq!(once, aggregator.aggregate(doubled));
    }

    #[test]
    fn prop_rows_are_ordered_and_ranked(records in prop::collection::vec(record_strategy(), 0..60)) {
        let rows = Aggregator::new(3).aggregate(records);
        for (index, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.rank, index + 1);
        }
        for pair in rows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.events > b.events || (a.events == b.events && a.vendor.name() <= b.vendor.name())
            );
        }
    }
}

fn sighting(id: &str, vendor: &str, events: u64, users: &[&str]) -> IssueRecord {
    IssueRecord {
        id: id.to_string(),
        message: format!("{vendor} failure"),
        vendor: Vendor::Named(vendor.to_string()),
        events,
        users: users.iter().map(|u| u.to_string()).collect(),
        last_seen: Utc.with_ymd_and_hms(2024, 3, 6, 9, 30, 0).unwrap(),
    }
}

#[test]
fn test_reference_example() {
    let rows = Aggregator::new(3).aggregate(vec![
        sighting("a1", "Amazon", 5, &["u1", "u2"]),
        sighting("a2", "Amazon", 3, &["u2", "u3"]),
        sighting("s1", "Shopify", 10, &["u4"]),
    ]);

    let summary: Vec<(&str, u64, usize)> = rows
        .iter()
        .map(|r| (r.vendor.name(), r.events, r.unique_users))
        .collect();
    assert_eq!(summary, vec![("Shopify", 10, 1), ("Amazon", 8, 3)]);
}

#[test]
fn test_issue_seen_on_two_days_contributes_once() {
    let monday = sighting("issue-42", "Amazon", 12, &["u1"]);
    let tuesday = IssueRecord {
        last_seen: monday.last_seen + chrono::Duration::days(1),
        ..monday.clone()
    };

    let rows = Aggregator::new(3).aggregate(vec![monday, tuesday]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].events, 12);
    assert_eq!(rows[0].unique_messages, 1);
}

#[test]
fn test_empty_window_is_not_an_error() {
    assert!(Aggregator::new(3).aggregate(Vec::new()).is_empty());
}
