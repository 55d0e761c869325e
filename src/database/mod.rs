pub mod types;
pub mod storage;
pub mod inventory;

// Re-export main types and functions for easier access
pub use types::{ReferenceSet, ReferenceDocument, Product, ProductDraft};
pub use storage::ReferenceStorage;
pub use inventory::Inventory;
