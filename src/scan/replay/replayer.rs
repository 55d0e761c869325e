use std::path::{Path, PathBuf};
use anyhow::Result;
use log::info;
use serde::{Serialize, Deserialize};

use crate::database::{Inventory, ReferenceSet};
use crate::scan::engine::ScanConfirmationEngine;
use crate::scan::reactions::{InventoryAction, ReactionPolicy};
use crate::scan::types::{BarcodeFormat, Classification, DecodeAttempt, ScanOptions, ScanStats};
use crate::utils::{file_utils, hash_utils};
use super::frame_log::FrameLogParser;

/// A confirmed code and what the inventory layer was asked to do with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// 1-based index of the frame that completed the confirmation
    pub frame: usize,

    /// Format reported on that frame
    pub format: BarcodeFormat,

    pub classification: Classification,

    /// Requested inventory action, if any
    pub action: Option<InventoryAction>,
}

/// Result of replaying one frame log through a fresh session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Frame log the report came from
    pub source: Option<PathBuf>,

    /// SHA-256 of the frame log
    pub source_hash: Option<String>,

    /// Every non-pending classification in frame order
    pub events: Vec<ScanEvent>,

    /// Session counters after the last frame
    pub stats: ScanStats,
}

/// Drives a confirmation engine over recorded frames
#[derive(Debug, Clone, Default)]
pub struct FrameReplayer {
    /// Configuration options for each session
    options: ScanOptions,

    /// Reactions applied to confirmed codes
    policy: ReactionPolicy,
}

impl FrameReplayer {
    pub fn new(options: ScanOptions, policy: ReactionPolicy) -> Self {
        Self { options, policy }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn policy(&self) -> &ReactionPolicy {
        &self.policy
    }

    /// Replay a frame log file in a new session
    pub fn replay_file(
        &self,
        path: impl AsRef<Path>,
        reference: &ReferenceSet,
        inventory: &Inventory,
    ) -> Result<ReplayReport> {
        let path = path.as_ref();
        let parser = FrameLogParser::new(self.options.skip_malformed_frames, self.options.max_frames);

        // Hash the same content that gets replayed
        let content = file_utils::read_file_to_string(path)?;
        let frames = parser.parse_content(&content, path)?;

        let mut report = self.replay_frames(&frames, reference, inventory);
        report.source = Some(path.to_path_buf());
        report.source_hash = Some(hash_utils::hash_string(&content));

        info!(
            "Replayed {}: {} frames, {} confirmations ({} new)",
            path.display(),
            report.stats.frames,
            report.stats.confirmations,
            report.stats.new_codes()
        );
        Ok(report)
    }

    /// Replay frames in a new session
    pub fn replay_frames(
        &self,
        frames: &[DecodeAttempt],
        reference: &ReferenceSet,
        inventory: &Inventory,
    ) -> ReplayReport {
        let mut engine = ScanConfirmationEngine::with_reference(self.options.clone(), reference.clone());
        let events = self.replay_with(&mut engine, frames, inventory);

        ReplayReport {
            source: None,
            source_hash: None,
            events,
            stats: engine.stats().clone(),
        }
    }

    /// Feed frames to an existing engine, collecting confirmed events
    pub fn replay_with(
        &self,
        engine: &mut ScanConfirmationEngine,
        frames: &[DecodeAttempt],
        inventory: &Inventory,
    ) -> Vec<ScanEvent> {
        frames.iter()
            .enumerate()
            .filter_map(|(index, attempt)| {
                let classification = engine.observe(attempt);
                if classification.is_pending() {
                    return None;
                }

                // Non-pending results only come from present attempts
                let format = attempt.format()?;
                let action = self.policy.react(&classification, format, inventory);
                Some(ScanEvent {
                    frame: index + 1,
                    format,
                    classification,
                    action,
                })
            })
            .collect()
    }
}
