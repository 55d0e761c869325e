use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// Item count above which a progress bar is shown
const PROGRESS_THRESHOLD: usize = 10;

/// Progress tracker for displaying progress during batch replays
#[derive(Debug, Default)]
pub struct ProgressTracker {
    /// Never draw a progress bar
    hidden: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self { hidden: false }
    }

    pub fn hidden() -> Self {
        Self { hidden: true }
    }

    /// Run `operation` over `items` in parallel, keeping results in input order
    pub fn track_parallel_progress<T, F, R>(&self, items: &[T], operation: F) -> Vec<R>
    where
        T: Sync,
        F: Fn(&T) -> R + Sync + Send,
        R: Send,
    {
        let progress_bar = self.progress_bar(items.len());
        let processed_count = AtomicUsize::new(0);

        let results: Vec<R> = items.par_iter()
            .map(|item| {
                let result = operation(item);

                let current = processed_count.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(pb) = &progress_bar {
                    pb.set_position(current as u64);
                }

                result
            })
            .collect();

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Replay complete");
        }

        results
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if self.hidden || len <= PROGRESS_THRESHOLD {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frame logs ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}
