//! Wholesale checkpoint persistence so an interrupted collection resumes
//! where it stopped instead of re-fetching everything.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slangshift_common::{Platform, Record};
use tracing::{debug, info};

/// Collection progress for one (keyword, platform) pair.
///
/// `seen_ids` holds every native id ever observed, accepted or not, so a
/// resumed run never re-evaluates a candidate.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CollectionState {
    pub results: Vec<Record>,
    pub seen_ids: HashSet<String>,
}

pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, keyword: &str, platform: Platform) -> PathBuf {
        self.dir.join(format!("{keyword}_{platform}.json"))
    }

    /// Load saved progress, or an empty state when no checkpoint exists.
    pub fn load(&self, keyword: &str, platform: Platform) -> Result<CollectionState> {
        let path = self.path(keyword, platform);
        if !path.exists() {
            return Ok(CollectionState::default());
        }

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read checkpoint {}", path.display()))?;
        let state: CollectionState = serde_json::from_str(&data)
            .with_context(|| format!("Corrupt checkpoint {}", path.display()))?;

        info!(
            keyword,
            platform = %platform,
            results = state.results.len(),
            seen = state.seen_ids.len(),
            "Restored checkpoint"
        );
        Ok(state)
    }

    /// Persist the full state, replacing any previous checkpoint.
    pub fn save(&self, keyword: &str, platform: Platform, state: &CollectionState) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path(keyword, platform);
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(keyword, platform = %platform, results = state.results.len(), "Saved checkpoint");
        Ok(())
    }

    /// Remove the checkpoint once a collection completes. Removing a
    /// checkpoint that was never written is not an error.
    pub fn remove(&self, keyword: &str, platform: Platform) -> Result<()> {
        let path = self.path(keyword, platform);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(keyword, platform = %platform, "Removed checkpoint");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove checkpoint {}", path.display()))
            }
        }
    }
}
