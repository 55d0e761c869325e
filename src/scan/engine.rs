use std::collections::HashSet;
use log::{debug, info, trace};

use crate::database::ReferenceSet;
use super::types::{Classification, DecodeAttempt, ScanOptions, ScanStats};
use super::window::ConfirmationWindow;

/// Turns per-frame decode attempts into confirmed, deduplicated scan results.
///
/// A code is confirmed once it fills the whole confirmation window. The
/// first confirmation of a code is classified against the reference set;
/// later confirmations report it as already scanned.
#[derive(Debug, Clone)]
pub struct ScanConfirmationEngine {
    /// Configuration options for the session
    options: ScanOptions,

    /// Most recent decoded codes
    window: ConfirmationWindow,

    /// Codes confirmed this session
    accepted: HashSet<String>,

    /// Externally loaded lookup set
    reference: ReferenceSet,

    /// Running counters for the session
    stats: ScanStats,
}

impl ScanConfirmationEngine {
    /// Create an engine with an empty reference set
    pub fn new(options: ScanOptions) -> Self {
        Self::with_reference(options, ReferenceSet::default())
    }

    /// Create an engine with default options
    pub fn with_defaults() -> Self {
        Self::new(ScanOptions::default())
    }

    /// Create an engine that classifies against `reference`
    pub fn with_reference(options: ScanOptions, reference: ReferenceSet) -> Self {
        let window = ConfirmationWindow::new(options.required_frames);
        Self {
            options,
            window,
            accepted: HashSet::new(),
            reference,
            stats: ScanStats::default(),
        }
    }

    /// Feed one frame's decode attempt to the engine
    pub fn observe(&mut self, attempt: &DecodeAttempt) -> Classification {
        let classification = match attempt.code() {
            Some(code) => self.observe_code(code),
            None => Classification::Pending,
        };

        self.stats.record(attempt.is_present(), &classification);
        classification
    }

    fn observe_code(&mut self, code: &str) -> Classification {
        self.window.push(code);

        let matches = self.window.count(code);
        if matches < self.window.capacity() {
            trace!("{} seen in {}/{} frames", code, matches, self.window.capacity());
            return Classification::Pending;
        }

        self.window.clear();

        if self.accepted.contains(code) {
            debug!("Confirmed {} again, already scanned", code);
            return Classification::AlreadyScanned(code.to_string());
        }

        self.accepted.insert(code.to_string());

        if self.reference.contains(code) {
            info!("Confirmed {}: found in reference", code);
            Classification::FoundInReference(code.to_string())
        } else {
            info!("Confirmed {}: not in reference", code);
            Classification::NotInReference(code.to_string())
        }
    }

    /// Install a freshly loaded reference set.
    ///
    /// Codes already accepted keep their earlier classification.
    pub fn set_reference(&mut self, reference: ReferenceSet) {
        info!("Installing reference set with {} codes", reference.len());
        self.reference = reference;
    }

    /// Start a new session, keeping the reference set
    pub fn reset(&mut self) {
        debug!("Resetting session ({} accepted codes dropped)", self.accepted.len());
        self.window.clear();
        self.accepted.clear();
        self.stats = ScanStats::default();
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn window(&self) -> &ConfirmationWindow {
        &self.window
    }

    pub fn accepted(&self) -> &HashSet<String> {
        &self.accepted
    }

    pub fn is_accepted(&self, code: &str) -> bool {
        self.accepted.contains(code)
    }

    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

impl Default for ScanConfirmationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
