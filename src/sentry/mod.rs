pub mod client;
pub mod fetcher;
pub mod types;

pub use client::{next_cursor, Page, SentryClient, SentryError};
pub use fetcher::{build_query, IssueFetcher};
pub use types::{SentryIssue, SentryRelease};
