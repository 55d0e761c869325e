//! Typed errors for frame log parsing and inventory validation.

use thiserror::Error;

/// Errors raised while parsing a frame log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameParseError {
    /// Format tag is not one of the supported symbologies.
    #[error("unknown barcode format: {0}")]
    UnknownFormat(String),

    /// Line is not `<format>:<code>`.
    #[error("expected `<format>:<code>`, got `{0}`")]
    MissingSeparator(String),

    /// Wraps another error with the 1-based line it occurred on.
    #[error("line {line}: {source}")]
    AtLine {
        /// Line number in the frame log.
        line: usize,
        /// Underlying parse failure.
        #[source]
        source: Box<FrameParseError>,
    },
}

impl FrameParseError {
    /// Attaches a line number to this error.
    pub fn at_line(self, line: usize) -> Self {
        FrameParseError::AtLine {
            line,
            source: Box::new(self),
        }
    }
}

/// Errors raised by inventory operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("product name must not be empty")]
    EmptyName,

    #[error("invalid price {0}: must be a finite value of at least 0")]
    InvalidPrice(f64),

    #[error("invalid quantity {0}: must be at least 1")]
    InvalidQuantity(u32),

    /// Shortcode contains non-digits or has the wrong length.
    #[error("invalid shortcode `{0}`: {1}")]
    InvalidShortcode(String, &'static str),

    #[error("shortcode {0} is already used by another product")]
    DuplicateShortcode(String),

    #[error("product {0} not found")]
    NotFound(u64),

    /// An existing record already holds the largest possible id.
    #[error("no product ids left to assign")]
    IdsExhausted,
}
