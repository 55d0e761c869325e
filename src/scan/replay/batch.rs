use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::{debug, info, warn};
use serde::{Serialize, Deserialize};

use crate::database::{Inventory, ReferenceSet};
use crate::scan::types::ScanStats;
use crate::utils::file_utils;
use super::progress::ProgressTracker;
use super::replayer::{FrameReplayer, ReplayReport};

/// Extension of recorded frame logs
pub const FRAME_LOG_EXTENSION: &str = "frames";

/// A frame log that could not be replayed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedReplay {
    pub path: PathBuf,
    pub error: String,
}

/// Results of replaying every frame log in a directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One report per successfully replayed log, sorted by path
    pub reports: Vec<ReplayReport>,

    pub failed: Vec<FailedReplay>,

    /// Counters summed over all sessions
    pub stats: ScanStats,
}

/// Replays many frame logs, each in its own independent session
#[derive(Debug)]
pub struct BatchReplayer {
    replayer: FrameReplayer,
    progress_tracker: ProgressTracker,
}

impl BatchReplayer {
    pub fn new(replayer: FrameReplayer) -> Self {
        Self {
            replayer,
            progress_tracker: ProgressTracker::new(),
        }
    }

    /// Disable the progress bar
    pub fn quiet(mut self) -> Self {
        self.progress_tracker = ProgressTracker::hidden();
        self
    }

    /// Replay every `*.frames` file under `dir`
    pub fn replay_directory(
        &self,
        dir: impl AsRef<Path>,
        reference: &ReferenceSet,
        inventory: &Inventory,
    ) -> Result<BatchReport> {
        let dir = dir.as_ref();
        info!("Scanning directory for frame logs: {}", dir.display());

        let files = file_utils::get_files_with_extension(dir, FRAME_LOG_EXTENSION)?;
        info!("Found {} frame logs to replay", files.len());

        self.replay_files(&files, reference, inventory)
    }

    /// Replay the given frame logs in parallel
    pub fn replay_files(
        &self,
        files: &[PathBuf],
        reference: &ReferenceSet,
        inventory: &Inventory,
    ) -> Result<BatchReport> {
        let thread_count = self.replayer.options().parallel_threads.unwrap_or_else(|| {
            let available = num_cpus::get();
            let used = std::cmp::max(1, available.saturating_sub(1));
            debug!("Using {} threads for replay (available: {})", used, available);
            used
        });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .context("Failed to build replay thread pool")?;

        let results = pool.install(|| {
            self.progress_tracker.track_parallel_progress(files, |file| {
                (file.clone(), self.replayer.replay_file(file, reference, inventory))
            })
        });

        let mut batch = BatchReport::default();
        for (path, result) in results {
            match result {
                Ok(report) => {
                    batch.stats.merge(&report.stats);
                    batch.reports.push(report);
                }
                Err(e) => {
                    warn!("Failed to replay {}: {:#}", path.display(), e);
                    batch.failed.push(FailedReplay {
                        path,
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            "Replayed {} frame logs ({} failed): {} confirmations, {} new codes",
            batch.reports.len(),
            batch.failed.len(),
            batch.stats.confirmations,
            batch.stats.new_codes()
        );
        Ok(batch)
    }
}
