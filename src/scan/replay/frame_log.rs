use std::path::Path;
use std::str::FromStr;
use anyhow::Result;
use log::{debug, warn};

use crate::error::FrameParseError;
use crate::scan::types::{BarcodeFormat, DecodeAttempt};
use crate::utils::file_utils;

/// Marker for a frame with no detection
const EMPTY_FRAME: &str = "-";

impl FromStr for DecodeAttempt {
    type Err = FrameParseError;

    /// Parse `<format>:<code>`; a blank line or `-` is an empty frame
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() || line == EMPTY_FRAME {
            return Ok(DecodeAttempt::none());
        }

        let (tag, code) = line.split_once(':')
            .ok_or_else(|| FrameParseError::MissingSeparator(line.to_string()))?;
        let format: BarcodeFormat = tag.parse()?;
        if !format.is_decodable() {
            return Err(FrameParseError::UnknownFormat(tag.trim().to_string()));
        }

        Ok(DecodeAttempt::detected(code, format))
    }
}

/// Parses recorded detector output, one frame per line
#[derive(Debug, Default, Clone)]
pub struct FrameLogParser {
    /// Treat malformed lines as empty frames instead of failing
    pub lenient: bool,

    /// Stop after this many frames
    pub max_frames: Option<usize>,
}

impl FrameLogParser {
    pub fn new(lenient: bool, max_frames: Option<usize>) -> Self {
        Self { lenient, max_frames }
    }

    /// Parse frame log text. Lines starting with `#` are comments.
    pub fn parse_str(&self, content: &str) -> Result<Vec<DecodeAttempt>, FrameParseError> {
        let mut frames = Vec::new();

        for (index, line) in content.lines().enumerate() {
            if self.max_frames.is_some_and(|max| frames.len() >= max) {
                debug!("Frame limit reached after {} frames", frames.len());
                break;
            }
            if line.trim_start().starts_with('#') {
                continue;
            }

            match line.parse::<DecodeAttempt>() {
                Ok(attempt) => frames.push(attempt),
                Err(e) if self.lenient => {
                    warn!("Line {}: {}, treating as empty frame", index + 1, e);
                    frames.push(DecodeAttempt::none());
                }
                Err(e) => return Err(e.at_line(index + 1)),
            }
        }

        Ok(frames)
    }

    /// Read and parse a frame log file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<DecodeAttempt>> {
        let path = path.as_ref();
        debug!("Parsing frame log: {}", path.display());

        let content = file_utils::read_file_to_string(path)?;
        self.parse_content(&content, path)
    }

    /// Parse frame log text already read from `path`
    pub fn parse_content(&self, content: &str, path: &Path) -> Result<Vec<DecodeAttempt>> {
        let frames = self.parse_str(content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

        debug!("Read {} frames from {}", frames.len(), path.display());
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_lines() {
        let log = "# recorded at checkout\nean_13:4006381333931\n\n-\nCODE_128: ABC-12 \n";
        let frames = FrameLogParser::default().parse_str(log).unwrap();

        assert_eq!(frames, vec![
            DecodeAttempt::detected("4006381333931", BarcodeFormat::Ean13),
            DecodeAttempt::none(),
            DecodeAttempt::none(),
            DecodeAttempt::detected("ABC-12", BarcodeFormat::Code128),
        ]);
    }

    #[test]
    fn test_code_may_contain_colons() {
        let attempt: DecodeAttempt = "codabar:A12:34B".parse().unwrap();
        assert_eq!(attempt.code(), Some("A12:34B"));
    }

    #[test]
    fn test_inventory_only_formats_are_rejected() {
        assert!("manual:123".parse::<DecodeAttempt>().is_err());
        assert!("shortcode:1234567".parse::<DecodeAttempt>().is_err());
    }

    #[test]
    fn test_blank_code_is_empty_frame() {
        let attempt: DecodeAttempt = "ean_8:   ".parse().unwrap();
        assert!(!attempt.is_present());
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = FrameLogParser::default().parse_str("ean_8:1\nqr:55\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2: unknown barcode format: qr");

        let err = FrameLogParser::default().parse_str("12345").unwrap_err();
        assert!(matches!(err, FrameParseError::AtLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_file_names_the_file_in_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lane.frames");
        std::fs::write(&path, "ean_8:1\nean_8 1\n").unwrap();

        let err = FrameLogParser::default().parse_file(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("lane.frames"), "{}", message);
        assert!(message.contains("line 2"), "{}", message);
    }

    #[test]
    fn test_lenient_and_limited() {
        let parser = FrameLogParser::new(true, Some(3));
        let frames = parser.parse_str("bogus\nean_8:1\nean_8:1\nean_8:1\n").unwrap();

        assert_eq!(frames.len(), 3);
        assert!(!frames[0].is_present());
    }
}
