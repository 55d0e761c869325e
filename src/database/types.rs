use std::collections::HashSet;
use std::sync::Arc;
use anyhow::{Result, Context};
use serde::{Serialize, Deserialize};
use chrono::{DateTime, NaiveDate, Utc};

use crate::scan::types::BarcodeFormat;
use crate::utils::hash_utils;

/// On-disk layout of a reference database file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDocument {
    /// Known barcodes
    pub barcodes: Vec<String>,
}

/// Read-only set of known barcodes used to classify new scans.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    codes: Arc<HashSet<String>>,
}

impl ReferenceSet {
    /// Build a set from any iterator of codes; blank entries are dropped
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes = codes.into_iter()
            .map(Into::into)
            .map(|code: String| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect::<HashSet<_>>();

        Self { codes: Arc::new(codes) }
    }

    /// Parse a `{"barcodes": [...]}` document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: ReferenceDocument = serde_json::from_str(content)
            .context("Failed to parse reference document")?;
        Ok(Self::from(document))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Order-independent SHA-256 digest of the codes
    pub fn fingerprint(&self) -> String {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_unstable();
        hash_utils::hash_string(&sorted.join("\n"))
    }

    /// Convert back into the serialized document layout, sorted
    pub fn to_document(&self) -> ReferenceDocument {
        let mut barcodes: Vec<String> = self.codes.iter().cloned().collect();
        barcodes.sort();
        ReferenceDocument { barcodes }
    }
}

impl From<ReferenceDocument> for ReferenceSet {
    fn from(document: ReferenceDocument) -> Self {
        Self::from_codes(document.barcodes)
    }
}

/// A product record in the local inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique record id
    pub id: u64,

    /// Scanned or synthesized barcode
    pub barcode: String,

    /// Optional 7-digit short code, unique across records
    pub shortcode: Option<String>,

    /// How the barcode was obtained
    pub format: BarcodeFormat,

    pub name: String,

    /// Unit price, never negative
    pub price: f64,

    /// Stock count, at least 1
    pub quantity: u32,

    /// Day the product was first recorded
    pub scan_date: NaiveDate,

    /// Day the product expires
    pub expire_date: NaiveDate,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

/// User-editable fields of a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub shortcode: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            shortcode: None,
        }
    }

    pub fn with_shortcode(mut self, shortcode: impl Into<String>) -> Self {
        self.shortcode = Some(shortcode.into());
        self
    }
}
