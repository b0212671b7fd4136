//! Mock VCS facade for testing.
//!
//! Manually implemented rather than generated so tests can track calls,
//! configure per-ref responses and inject errors per operation.

#![allow(dead_code)]

use async_trait::async_trait;
use premerge::types::AuthorIdent;
use premerge::vcs::{AuthSettings, GitVersion, VcsError, VcsFacade, VcsResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Call record for `fetch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub refspec: String,
    pub timeout: Duration,
    pub fetch_tags: bool,
    pub quiet: bool,
}

/// Call record for `merge`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub branch: String,
    pub author_name: String,
    pub quiet: bool,
}

fn injected_error(slot: &Mutex<Option<String>>) -> Option<VcsError> {
    slot.lock().unwrap().as_ref().map(|msg| VcsError::CommandFailed {
        status: 1,
        stderr: msg.clone(),
    })
}

/// Simple mock VCS facade for testing.
///
/// Features:
/// - Call tracking for verification
/// - Configurable ref resolution responses
/// - Error injection for failure path testing
pub struct MockVcsFacade {
    version: GitVersion,
    current_branch: Mutex<Option<String>>,
    resolve_responses: Mutex<HashMap<String, String>>,
    // Call tracking
    fetch_calls: Mutex<Vec<FetchCall>>,
    checkout_calls: Mutex<Vec<String>>,
    create_branch_calls: Mutex<Vec<String>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    merge_abort_calls: Mutex<usize>,
    set_config_calls: Mutex<Vec<(String, String)>>,
    resolve_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_fetch: Mutex<Option<String>>,
    error_on_checkout: Mutex<Option<String>>,
    error_on_create_branch: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
}

impl MockVcsFacade {
    /// Create a mock with a modern git version.
    pub fn new() -> Self {
        Self::with_version(GitVersion::new(2, 39, 2, 0))
    }

    /// Create a mock reporting the given git version.
    pub fn with_version(version: GitVersion) -> Self {
        Self {
            version,
            current_branch: Mutex::new(Some("work".to_string())),
            resolve_responses: Mutex::new(HashMap::new()),
            fetch_calls: Mutex::new(Vec::new()),
            checkout_calls: Mutex::new(Vec::new()),
            create_branch_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            merge_abort_calls: Mutex::new(0),
            set_config_calls: Mutex::new(Vec::new()),
            resolve_calls: Mutex::new(Vec::new()),
            error_on_fetch: Mutex::new(None),
            error_on_checkout: Mutex::new(None),
            error_on_create_branch: Mutex::new(None),
            error_on_merge: Mutex::new(None),
        }
    }

    // === Response configuration ===

    /// Set the branch reported by `current_branch`.
    pub fn set_current_branch(&self, branch: Option<&str>) {
        *self.current_branch.lock().unwrap() = branch.map(String::from);
    }

    /// Make `resolve_ref` resolve `name` to `hash`.
    pub fn set_resolve_response(&self, name: &str, hash: &str) {
        self.resolve_responses
            .lock()
            .unwrap()
            .insert(name.to_string(), hash.to_string());
    }

    // === Error injection ===

    /// Make `fetch` fail.
    pub fn fail_fetch(&self, msg: &str) {
        *self.error_on_fetch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `checkout` fail.
    pub fn fail_checkout(&self, msg: &str) {
        *self.error_on_checkout.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_branch` fail.
    pub fn fail_create_branch(&self, msg: &str) {
        *self.error_on_create_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge` fail.
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn fetch_calls(&self) -> Vec<FetchCall> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn checkout_calls(&self) -> Vec<String> {
        self.checkout_calls.lock().unwrap().clone()
    }

    pub fn create_branch_calls(&self) -> Vec<String> {
        self.create_branch_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn merge_abort_calls(&self) -> usize {
        *self.merge_abort_calls.lock().unwrap()
    }

    pub fn set_config_calls(&self) -> Vec<(String, String)> {
        self.set_config_calls.lock().unwrap().clone()
    }

    /// Whether any mutating operation was recorded at all.
    pub fn untouched(&self) -> bool {
        self.fetch_calls().is_empty()
            && self.checkout_calls().is_empty()
            && self.create_branch_calls().is_empty()
            && self.merge_calls().is_empty()
            && self.set_config_calls().is_empty()
    }
}

impl Default for MockVcsFacade {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VcsFacade for MockVcsFacade {
    async fn fetch(
        &self,
        refspec: &str,
        timeout: Duration,
        fetch_tags: bool,
        _auth: &AuthSettings,
        quiet: bool,
    ) -> VcsResult<()> {
        self.fetch_calls.lock().unwrap().push(FetchCall {
            refspec: refspec.to_string(),
            timeout,
            fetch_tags,
            quiet,
        });
        match injected_error(&self.error_on_fetch) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn checkout(
        &self,
        branch: &str,
        _timeout: Duration,
        _auth: &AuthSettings,
    ) -> VcsResult<()> {
        self.checkout_calls.lock().unwrap().push(branch.to_string());
        match injected_error(&self.error_on_checkout) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn create_branch(&self, name: &str) -> VcsResult<()> {
        self.create_branch_calls.lock().unwrap().push(name.to_string());
        match injected_error(&self.error_on_create_branch) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn merge(&self, branch: &str, author: &AuthorIdent, quiet: bool) -> VcsResult<()> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            branch: branch.to_string(),
            author_name: author.name.clone(),
            quiet,
        });
        match injected_error(&self.error_on_merge) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn merge_abort(&self) -> VcsResult<()> {
        *self.merge_abort_calls.lock().unwrap() += 1;
        Ok(())
    }

    async fn resolve_ref(&self, name: &str) -> VcsResult<Option<String>> {
        self.resolve_calls.lock().unwrap().push(name.to_string());
        Ok(self.resolve_responses.lock().unwrap().get(name).cloned())
    }

    async fn set_config(&self, key: &str, value: &str) -> VcsResult<()> {
        self.set_config_calls
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn current_branch(&self) -> VcsResult<Option<String>> {
        Ok(self.current_branch.lock().unwrap().clone())
    }

    async fn version(&self) -> VcsResult<GitVersion> {
        Ok(self.version)
    }
}
