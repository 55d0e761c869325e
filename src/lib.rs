pub mod config;
pub mod database;
pub mod error;
pub mod scan;
pub mod utils;

// Re-export main types and functions for easier access
pub use scan::types::{BarcodeFormat, Classification, DecodeAttempt, ScanOptions, ScanStats, REQUIRED_FRAMES};
pub use scan::engine::ScanConfirmationEngine;
pub use scan::reactions::{InventoryAction, Reaction, ReactionPolicy};
pub use scan::session::{ScanSession, SessionHandle};
pub use scan::replay::{BatchReplayer, FrameReplayer, ReplayReport, ScanEvent};

pub use database::{Inventory, Product, ProductDraft, ReferenceSet, ReferenceStorage};
pub use config::ScannerConfig;
pub use error::{FrameParseError, InventoryError};

// Re-export utility functions
pub use utils::file_utils;
