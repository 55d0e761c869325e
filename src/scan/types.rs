use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::error::FrameParseError;

/// Number of agreeing frames needed before a code is accepted
pub const REQUIRED_FRAMES: usize = 3;

/// Barcode symbologies understood by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[serde(rename = "code_128")]
    Code128,
    #[serde(rename = "code_39")]
    Code39,
    #[serde(rename = "code_93")]
    Code93,
    #[serde(rename = "ean_13")]
    Ean13,
    #[serde(rename = "ean_8")]
    Ean8,
    #[serde(rename = "upc_a")]
    UpcA,
    #[serde(rename = "upc_e")]
    UpcE,
    #[serde(rename = "codabar")]
    Codabar,
    #[serde(rename = "i2of5")]
    Interleaved2Of5,
    #[serde(rename = "2of5")]
    Standard2Of5,
    /// Typed in by hand, never decoded from a frame
    #[serde(rename = "manual")]
    Manual,
    /// Inventory record created from a 7-digit shortcode
    #[serde(rename = "shortcode")]
    Shortcode,
}

impl BarcodeFormat {
    /// Formats a frame decoder may report
    pub const DECODABLE: [BarcodeFormat; 10] = [
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
        BarcodeFormat::Codabar,
        BarcodeFormat::Interleaved2Of5,
        BarcodeFormat::Standard2Of5,
    ];

    /// Tag used in frame logs and serialized records
    pub fn tag(&self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "code_128",
            BarcodeFormat::Code39 => "code_39",
            BarcodeFormat::Code93 => "code_93",
            BarcodeFormat::Ean13 => "ean_13",
            BarcodeFormat::Ean8 => "ean_8",
            BarcodeFormat::UpcA => "upc_a",
            BarcodeFormat::UpcE => "upc_e",
            BarcodeFormat::Codabar => "codabar",
            BarcodeFormat::Interleaved2Of5 => "i2of5",
            BarcodeFormat::Standard2Of5 => "2of5",
            BarcodeFormat::Manual => "manual",
            BarcodeFormat::Shortcode => "shortcode",
        }
    }

    /// Whether a camera decoder can produce this format
    pub fn is_decodable(&self) -> bool {
        Self::DECODABLE.contains(self)
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for BarcodeFormat {
    type Err = FrameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::DECODABLE.iter()
            .chain([BarcodeFormat::Manual, BarcodeFormat::Shortcode].iter())
            .find(|format| format.tag() == tag)
            .copied()
            .ok_or_else(|| FrameParseError::UnknownFormat(s.trim().to_string()))
    }
}

/// A code read from a single frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Decoded value
    pub code: String,

    /// Symbology the decoder reported
    pub format: BarcodeFormat,
}

/// One frame's observation from the barcode detector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeAttempt {
    detection: Option<Detection>,
}

impl DecodeAttempt {
    /// A frame in which nothing was decoded
    pub fn none() -> Self {
        Self { detection: None }
    }

    /// A frame that decoded `code`.
    ///
    /// Surrounding whitespace is stripped; a blank code counts as no detection.
    pub fn detected(code: impl Into<String>, format: BarcodeFormat) -> Self {
        let code = code.into();
        let code = code.trim();
        if code.is_empty() {
            return Self::none();
        }

        Self {
            detection: Some(Detection {
                code: code.to_string(),
                format,
            }),
        }
    }

    pub fn is_present(&self) -> bool {
        self.detection.is_some()
    }

    pub fn code(&self) -> Option<&str> {
        self.detection.as_ref().map(|d| d.code.as_str())
    }

    pub fn format(&self) -> Option<BarcodeFormat> {
        self.detection.as_ref().map(|d| d.format)
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }
}

/// Outcome of feeding one frame to the confirmation engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum Classification {
    /// Not yet confirmed
    Pending,

    /// Confirmed again after being accepted earlier in the session
    AlreadyScanned(String),

    /// Newly accepted and listed in the reference set
    FoundInReference(String),

    /// Newly accepted and absent from the reference set
    NotInReference(String),
}

impl Classification {
    /// The confirmed code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Classification::Pending => None,
            Classification::AlreadyScanned(code)
            | Classification::FoundInReference(code)
            | Classification::NotInReference(code) => Some(code.as_str()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Classification::Pending)
    }

    /// True for the first confirmation of a code in the session
    pub fn is_new(&self) -> bool {
        matches!(self, Classification::FoundInReference(_) | Classification::NotInReference(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Classification::AlreadyScanned(_))
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Pending => write!(f, "pending"),
            Classification::AlreadyScanned(code) => write!(f, "{} already scanned", code),
            Classification::FoundInReference(code) => write!(f, "{} found in reference", code),
            Classification::NotInReference(code) => write!(f, "{} not in reference", code),
        }
    }
}

/// Configuration options for a scanning session
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Agreeing frames needed to confirm a code
    pub required_frames: usize,

    /// Maximum number of frames to read from a single frame log
    pub max_frames: Option<usize>,

    /// Treat malformed frame log lines as empty frames instead of failing the replay
    pub skip_malformed_frames: bool,

    /// Number of parallel threads to use for batch replays
    pub parallel_threads: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            required_frames: REQUIRED_FRAMES,
            max_frames: None,
            skip_malformed_frames: false,
            parallel_threads: None,
        }
    }
}

/// Statistics about a scanning session
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Total number of frames observed
    pub frames: usize,

    /// Frames in which nothing was decoded
    pub empty_frames: usize,

    /// Codes that reached the required number of agreeing frames
    pub confirmations: usize,

    /// Confirmations of codes accepted earlier in the session
    pub duplicates: usize,

    /// New codes present in the reference set
    pub found_in_reference: usize,

    /// New codes missing from the reference set
    pub not_in_reference: usize,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another stats instance into this one
    pub fn merge(&mut self, other: &Self) {
        self.frames += other.frames;
        self.empty_frames += other.empty_frames;
        self.confirmations += other.confirmations;
        self.duplicates += other.duplicates;
        self.found_in_reference += other.found_in_reference;
        self.not_in_reference += other.not_in_reference;
    }

    /// Number of codes accepted for the first time
    pub fn new_codes(&self) -> usize {
        self.found_in_reference + self.not_in_reference
    }

    /// Percentage of confirmations that were repeats
    pub fn duplicate_rate(&self) -> f64 {
        if self.confirmations == 0 {
            return 0.0;
        }

        (self.duplicates as f64 / self.confirmations as f64) * 100.0
    }

    /// Record the outcome of one observed frame
    pub(crate) fn record(&mut self, present: bool, classification: &Classification) {
        self.frames += 1;
        if !present {
            self.empty_frames += 1;
        }

        match classification {
            Classification::Pending => {}
            Classification::AlreadyScanned(_) => {
                self.confirmations += 1;
                self.duplicates += 1;
            }
            Classification::FoundInReference(_) => {
                self.confirmations += 1;
                self.found_in_reference += 1;
            }
            Classification::NotInReference(_) => {
                self.confirmations += 1;
                self.not_in_reference += 1;
            }
        }
    }
}
