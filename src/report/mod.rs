// Vendor report model, classification, aggregation and CSV output

pub mod aggregator;
pub mod types;
pub mod vendor;
pub mod writer;

pub use aggregator::{dedup_by_id, Aggregator};
pub use types::*;
pub use vendor::{VendorClassifier, VendorEntry};
pub use writer::ReportWriter;
