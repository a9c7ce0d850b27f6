use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use super::{StateFile, StoredDistribution, SyncSummary};
use crate::config::APP_DIR;
use crate::runtime::Runtime;

/// State kept in a single JSON file.
pub struct JsonStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> JsonStore<'a, R> {
    pub fn new(runtime: &'a R, path: PathBuf) -> Self {
        Self { runtime, path }
    }

    /// `<data_dir>/pkgmon/state.json`
    pub fn default_path(runtime: &R) -> Option<PathBuf> {
        runtime
            .data_dir()
            .map(|dir| dir.join(APP_DIR).join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state. A missing file is an empty state.
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> Result<StateFile> {
        if !self.runtime.exists(&self.path) {
            debug!("No state file yet");
            return Ok(StateFile::default());
        }

        let content = self
            .runtime
            .read_to_string(&self.path)
            .with_context(|| format!("Failed to read state from {:?}", self.path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt state file {:?}", self.path))
    }

    /// Write the state to a temporary file and move it into place, so a
    /// failure never leaves a partially written state file.
    #[tracing::instrument(skip(self, state), fields(path = ?self.path))]
    pub fn save(&self, state: &StateFile) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();
        self.runtime
            .write(&tmp, content.as_bytes())
            .with_context(|| format!("Failed to write state to {:?}", tmp))?;
        self.runtime
            .rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file {:?}", self.path))
    }

    /// Mirror `fresh` into the stored state.
    pub fn sync(&self, fresh: Vec<StoredDistribution>) -> Result<SyncSummary> {
        let mut state = self.load()?;
        let summary = state.mirror(fresh);
        self.save(&state)?;
        debug!(
            "Stored {} distributions, removed {}",
            summary.upserted, summary.removed
        );
        Ok(summary)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
