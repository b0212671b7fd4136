//! Shared build state and result publishing.
//!
//! Shared state is a key/value store scoped to one build, written by one
//! step and read by later steps. The premerge step reads each repository's
//! currently configured branch from it and, on success only, publishes the
//! normalized target branch and the per-repository resolved hashes.

use crate::error::{Error, Result};
use crate::orchestrator::PremergeOutcome;
use crate::refs::{TARGET_BRANCH_SHARED_PARAM, target_sha_param};
use crate::types::ResultStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Format version of the persisted state file.
const STATE_VERSION: u32 = 1;

/// Key/value state scoped to one build.
pub trait SharedBuildState: Send + Sync {
    /// Read one value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write one value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory shared state, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    values: BTreeMap<String, String>,
}

impl InMemoryState {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored values, in key order.
    pub const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl SharedBuildState for InMemoryState {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    updated_at: DateTime<Utc>,
    values: BTreeMap<String, String>,
}

/// Shared state persisted as a JSON file, so a later pipeline step running
/// in another process can read what this one published.
#[derive(Debug, Clone)]
pub struct FileState {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileState {
    /// Load shared state from `path`.
    ///
    /// A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }
        let content = fs::read_to_string(&path)?;
        let file: StateFile = serde_json::from_str(&content)
            .map_err(|e| Error::State(format!("{}: {e}", path.display())))?;
        if file.version != STATE_VERSION {
            return Err(Error::State(format!(
                "{}: unsupported state version {}",
                path.display(),
                file.version
            )));
        }
        Ok(Self {
            path,
            values: file.values,
        })
    }

    /// Persist the current values.
    pub fn save(&self) -> Result<()> {
        let file = StateFile {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            values: self.values.clone(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::State(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Where this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored values, in key order.
    pub const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl SharedBuildState for FileState {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Publish the outcome of a successful premerge run.
///
/// Writes the normalized target branch name and one key per merged
/// repository holding its resolved target-branch hash. Any status other
/// than `Success` publishes nothing; the step is reported as failed (or
/// silently skipped) by the caller instead.
pub fn publish_results(state: &mut dyn SharedBuildState, outcome: &PremergeOutcome) {
    if outcome.aggregate.status() != ResultStatus::Success {
        return;
    }
    state.set(TARGET_BRANCH_SHARED_PARAM, &outcome.target_branch);
    for (repository_id, hash) in outcome.aggregate.target_hashes() {
        state.set(&target_sha_param(repository_id), hash);
    }
}
