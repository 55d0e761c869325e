mod frame_log;
mod replayer;
mod batch;
mod progress;

// Re-export from submodules
pub use frame_log::FrameLogParser;
pub use replayer::{FrameReplayer, ReplayReport, ScanEvent};
pub use batch::{BatchReplayer, BatchReport, FailedReplay, FRAME_LOG_EXTENSION};
pub use progress::ProgressTracker;
