//! Scanner configuration loaded from TOML or YAML.

use std::path::{Path, PathBuf};
use anyhow::{Result, Context, bail};
use log::debug;
use serde::{Serialize, Deserialize};

use crate::scan::reactions::ReactionPolicy;
use crate::scan::types::{ScanOptions, REQUIRED_FRAMES};
use crate::utils::file_utils;

/// Settings for a scanning run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Agreeing frames needed to confirm a code
    pub required_frames: usize,

    /// Reference database (`{"barcodes": [...]}`)
    pub reference_path: Option<PathBuf>,

    /// log4rs YAML file; env_logger is used when unset
    pub log_config: Option<PathBuf>,

    /// Worker threads for batch replays
    pub parallel_threads: Option<usize>,

    /// Stop reading a frame log after this many frames
    pub max_frames: Option<usize>,

    /// Treat malformed frame log lines as empty frames
    pub skip_malformed_frames: bool,

    pub reactions: ReactionPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            required_frames: REQUIRED_FRAMES,
            reference_path: None,
            log_config: None,
            parallel_threads: None,
            max_frames: None,
            skip_malformed_frames: false,
            reactions: ReactionPolicy::default(),
        }
    }
}

impl ScannerConfig {
    /// Load a config file, choosing the parser by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());

        let content = file_utils::read_file_to_string(path)?;
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?,
            _ => bail!("Unsupported config format for {} (expected .toml, .yaml or .yml)", path.display()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.required_frames == 0 {
            bail!("required_frames must be at least 1");
        }
        if self.parallel_threads == Some(0) {
            bail!("parallel_threads must be at least 1");
        }
        Ok(())
    }

    /// Engine options derived from this config
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            required_frames: self.required_frames,
            max_frames: self.max_frames,
            skip_malformed_frames: self.skip_malformed_frames,
            parallel_threads: self.parallel_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::reactions::Reaction;
    use tempfile::tempdir;

    #[test]
    fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scanner.toml");
        std::fs::write(&path, r#"
required_frames = 5
reference_path = "bigdb.json"

[reactions]
on_new = "log"
"#).unwrap();

        let config = ScannerConfig::load(&path).unwrap();
        assert_eq!(config.required_frames, 5);
        assert_eq!(config.reference_path, Some(PathBuf::from("bigdb.json")));
        assert_eq!(config.reactions.on_new, Reaction::Log);
        assert_eq!(config.reactions.on_duplicate, Reaction::PromptEdit);
        assert_eq!(config.scan_options().required_frames, 5);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scanner.yml");
        std::fs::write(&path, "parallel_threads: 2\nskip_malformed_frames: true\n").unwrap();

        let config = ScannerConfig::load(&path).unwrap();
        assert_eq!(config.parallel_threads, Some(2));
        assert!(config.skip_malformed_frames);
        assert_eq!(config.required_frames, REQUIRED_FRAMES);
    }

    #[test]
    fn test_rejects_zero_frames_and_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scanner.toml");
        std::fs::write(&path, "required_frames = 0\n").unwrap();
        assert!(ScannerConfig::load(&path).is_err());

        let path = dir.path().join("scanner.ini");
        std::fs::write(&path, "").unwrap();
        assert!(ScannerConfig::load(&path).is_err());
    }
}
