use chrono::{DateTime, Duration, Utc};
use log::{info, debug};

use crate::error::InventoryError;
use crate::scan::types::BarcodeFormat;
use super::types::{Product, ProductDraft};

/// Required length of a product shortcode
pub const SHORTCODE_LEN: usize = 7;

/// Days between a product's scan date and its expiry date
pub const SHELF_LIFE_DAYS: i64 = 30;

/// In-memory product inventory keyed by barcode, id and shortcode
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Products in insertion order
    products: Vec<Product>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records loaded by an external persistence layer
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Add a product for a scanned or typed barcode
    pub fn add(&mut self, barcode: &str, format: BarcodeFormat, draft: ProductDraft) -> Result<&Product, InventoryError> {
        self.add_at(barcode, format, draft, Utc::now())
    }

    /// Add a product with an explicit creation time
    pub fn add_at(
        &mut self,
        barcode: &str,
        format: BarcodeFormat,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<&Product, InventoryError> {
        let shortcode = self.validate(&draft, None)?;

        let scan_date = now.date_naive();
        let product = Product {
            id: self.next_id(now)?,
            barcode: barcode.to_string(),
            shortcode,
            format,
            name: draft.name.trim().to_string(),
            price: draft.price,
            quantity: draft.quantity,
            scan_date,
            expire_date: scan_date + Duration::days(SHELF_LIFE_DAYS),
            timestamp: now,
        };

        info!("Product added: {} ({})", product.name, product.barcode);
        self.products.push(product);
        Ok(&self.products[self.products.len() - 1])
    }

    /// Add a product that has no barcode, identified by its shortcode only
    pub fn add_by_shortcode(&mut self, shortcode: &str, name: &str) -> Result<&Product, InventoryError> {
        let shortcode = shortcode.trim();
        if shortcode.is_empty() {
            return Err(InventoryError::InvalidShortcode(shortcode.to_string(), "must be exactly 7 digits"));
        }

        let draft = ProductDraft::new(name, 0.0, 1).with_shortcode(shortcode);
        self.add(&format!("SHORTCODE_{}", shortcode), BarcodeFormat::Shortcode, draft)
    }

    /// Replace the editable fields of an existing product
    pub fn update(&mut self, id: u64, draft: ProductDraft) -> Result<&Product, InventoryError> {
        let index = self.index_of(id).ok_or(InventoryError::NotFound(id))?;
        let shortcode = self.validate(&draft, Some(id))?;

        let product = &mut self.products[index];
        product.name = draft.name.trim().to_string();
        product.price = draft.price;
        product.quantity = draft.quantity;
        product.shortcode = shortcode;

        info!("Product saved: {}", product.name);
        Ok(product)
    }

    pub fn remove(&mut self, id: u64) -> Result<Product, InventoryError> {
        let index = self.index_of(id).ok_or(InventoryError::NotFound(id))?;
        let product = self.products.remove(index);
        info!("Product deleted: {}", product.name);
        Ok(product)
    }

    pub fn get(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.barcode == barcode)
    }

    pub fn find_by_shortcode(&self, shortcode: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.shortcode.as_deref() == Some(shortcode))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    /// Millisecond timestamp, bumped past any id already in use
    fn next_id(&self, now: DateTime<Utc>) -> Result<u64, InventoryError> {
        let candidate = now.timestamp_millis().max(0) as u64;
        match self.products.iter().map(|p| p.id).max() {
            Some(max) if max >= candidate => max.checked_add(1).ok_or(InventoryError::IdsExhausted),
            _ => Ok(candidate),
        }
    }

    /// Check a draft and return its normalized shortcode
    fn validate(&self, draft: &ProductDraft, editing: Option<u64>) -> Result<Option<String>, InventoryError> {
        if draft.name.trim().is_empty() {
            return Err(InventoryError::EmptyName);
        }
        if !draft.price.is_finite() || draft.price < 0.0 {
            return Err(InventoryError::InvalidPrice(draft.price));
        }
        if draft.quantity < 1 {
            return Err(InventoryError::InvalidQuantity(draft.quantity));
        }

        let shortcode = match draft.shortcode.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(code) => code,
        };

        if !shortcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(InventoryError::InvalidShortcode(shortcode.to_string(), "only digits are allowed"));
        }
        if shortcode.len() != SHORTCODE_LEN {
            return Err(InventoryError::InvalidShortcode(shortcode.to_string(), "must be exactly 7 digits"));
        }

        let taken = self.products.iter()
            .any(|p| p.shortcode.as_deref() == Some(shortcode) && Some(p.id) != editing);
        if taken {
            debug!("Shortcode {} already in use", shortcode);
            return Err(InventoryError::DuplicateShortcode(shortcode.to_string()));
        }

        Ok(Some(shortcode.to_string()))
    }
}
