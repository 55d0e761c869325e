use std::path::Path;
use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<()> = OnceCell::new();

/// Install the global logger once per process.
///
/// A log4rs YAML file takes precedence; otherwise env_logger reads
/// `RUST_LOG`, defaulting to `info` (`debug` when `verbose`).
/// Later calls are no-ops.
pub fn init_logging(log_config: Option<&Path>, verbose: bool) -> Result<()> {
    LOGGER.get_or_try_init(|| match log_config {
        Some(path) => log4rs::init_file(path, Default::default())
            .map_err(|e| anyhow!("Failed to load log config {}: {}", path.display(), e)),
        None => {
            let default_level = if verbose { "debug" } else { "info" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
                .try_init()
                .map_err(|e| anyhow!("Failed to initialise logger: {}", e))
        }
    })?;

    Ok(())
}
