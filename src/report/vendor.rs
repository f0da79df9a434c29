use thiserror::Error;

use super::types::Vendor;

/// Error type names Sentry reports for issues that say nothing about a vendor
const GENERIC_ERROR_TYPES: &[&str] = &[
    "unknown",
    "typeerror",
    "securityerror",
    "error",
    "syntaxerror",
    "notallowederror",
    "referenceerror",
    "aborterror",
    "monorailrequesterror",
    "runtimeerror",
    "rpcerror",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VendorTableError {
    #[error("empty vendor name in entry `{0}`")]
    EmptyName(String),

    #[error("empty match pattern for vendor `{0}`")]
    EmptyPattern(String),
}

/// A known vendor and the lower-cased substring that identifies it in a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorEntry {
    pub name: String,
    pattern: String,
}

impl VendorEntry {
    pub fn new(name: impl Into<String>, pattern: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.as_ref().to_lowercase(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Parse `Name` / `Name=pattern` entries separated by commas.
///
/// A bare `Name` matches on its own lower-cased form. Blank entries are skipped.
pub fn parse_vendor_table(table: &str) -> Result<Vec<VendorEntry>, VendorTableError> {
    let mut entries = Vec::new();
    for raw in table.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, pattern) = match raw.split_once('=') {
            Some((name, pattern)) => (name.trim(), pattern.trim()),
            None => (raw, raw),
        };
        if name.is_empty() {
            return Err(VendorTableError::EmptyName(raw.to_string()));
        }
        if pattern.is_empty() {
            return Err(VendorTableError::EmptyPattern(name.to_string()));
        }
        entries.push(VendorEntry::new(name, pattern));
    }
    Ok(entries)
}

/// Maps an issue onto a vendor.
///
/// The issue's error type tag wins unless it is one of the generic JavaScript
/// error names; otherwise the first table entry whose pattern occurs in the
/// message decides. Everything else lands in [`Vendor::Unknown`].
#[derive(Debug, Clone, Default)]
pub struct VendorClassifier {
    entries: Vec<VendorEntry>,
}

impl VendorClassifier {
    pub fn new(entries: Vec<VendorEntry>) -> Self {
        Self { entries }
    }

    pub fn classify(&self, type_tag: Option<&str>, message: &str) -> Vendor {
        if let Some(tag) = type_tag.map(str::trim).filter(|t| !t.is_empty()) {
            if !is_generic_error_type(tag) {
                return Vendor::Named(tag.to_string());
            }
        }

        let message = message.to_lowercase();
        self.entries
            .iter()
            .find(|entry| message.contains(entry.pattern()))
            .map(|entry| Vendor::Named(entry.name.clone()))
            .unwrap_or(Vendor::Unknown)
    }
}

fn is_generic_error_type(tag: &str) -> bool {
    let tag = tag.to_lowercase();
    GENERIC_ERROR_TYPES.contains(&tag.as_str())
}
