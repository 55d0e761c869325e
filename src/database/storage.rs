use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Result, Context};
use log::{info, debug, warn};

use crate::utils::hash_utils;
use super::types::ReferenceSet;

/// Loads the reference barcode set from a JSON file
#[derive(Debug)]
pub struct ReferenceStorage {
    /// Path to the reference file
    path: PathBuf,

    /// Content hash of the last successful load
    last_hash: Option<String>,
}

impl ReferenceStorage {
    /// Create a new reference storage for the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_hash: None,
        }
    }

    /// Load the reference set from disk
    pub fn load(&mut self) -> Result<ReferenceSet> {
        let path = &self.path;
        debug!("Loading reference set from {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference file {}", path.display()))?;

        self.parse(&content)
    }

    /// Load the reference set, falling back to an empty set on any failure
    pub fn load_or_empty(&mut self) -> ReferenceSet {
        match self.load() {
            Ok(set) => set,
            Err(e) => {
                warn!("Reference set unavailable, classifying everything as unknown: {:#}", e);
                ReferenceSet::default()
            }
        }
    }

    /// Load the reference set without blocking the runtime
    pub async fn load_async(&mut self) -> Result<ReferenceSet> {
        debug!("Loading reference set from {}", self.path.display());

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read reference file {}", self.path.display()))?;

        self.parse(&content)
    }

    /// Asynchronous [`load_or_empty`](Self::load_or_empty)
    pub async fn load_or_empty_async(&mut self) -> ReferenceSet {
        match self.load_async().await {
            Ok(set) => set,
            Err(e) => {
                warn!("Reference set unavailable, classifying everything as unknown: {:#}", e);
                ReferenceSet::default()
            }
        }
    }

    /// Reload only if the file content changed since the last successful load
    pub fn reload_if_changed(&mut self) -> Result<Option<ReferenceSet>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read reference file {}", self.path.display()))?;

        let hash = hash_utils::hash_string(&content);
        if self.last_hash.as_deref() == Some(hash.as_str()) {
            debug!("Reference file {} unchanged", self.path.display());
            return Ok(None);
        }

        self.parse(&content).map(Some)
    }

    /// Save a reference set to disk
    pub fn save(&self, set: &ReferenceSet) -> Result<()> {
        let content = serde_json::to_string_pretty(&set.to_document())
            .context("Failed to serialize reference set")?;

        crate::utils::file_utils::write_string_to_file(&self.path, &content)?;
        info!("Saved reference set with {} codes", set.len());
        Ok(())
    }

    fn parse(&mut self, content: &str) -> Result<ReferenceSet> {
        let set = ReferenceSet::from_json_str(content)
            .with_context(|| format!("Failed to parse reference file {}", self.path.display()))?;

        self.last_hash = Some(hash_utils::hash_string(content));
        info!("Loaded reference set with {} codes", set.len());
        Ok(set)
    }

    /// Check if the reference file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Get the path to the reference file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
