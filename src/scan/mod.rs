pub mod types;
pub mod window;
pub mod engine;
pub mod reactions;
pub mod session;
pub mod replay;

// Re-export the main API for easier access
pub use types::{BarcodeFormat, Classification, DecodeAttempt, Detection, ScanOptions, ScanStats, REQUIRED_FRAMES};
pub use window::ConfirmationWindow;
pub use engine::ScanConfirmationEngine;
pub use reactions::{InventoryAction, Reaction, ReactionPolicy};
pub use session::{ScanSession, SessionHandle};
