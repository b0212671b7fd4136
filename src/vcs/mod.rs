//! VCS facade boundary.
//!
//! The merge session drives a repository through fetch, branch creation,
//! checkout and merge via this facade. The engine does not interpret
//! git-level error subtypes beyond "succeeded" vs "failed"; classification
//! into soft and hard failures happens one layer up, in the session.

mod git_cli;
pub mod version;

pub use git_cli::GitCliFacade;
pub use version::GitVersion;

use crate::types::AuthorIdent;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for facade operations.
pub type VcsResult<T> = std::result::Result<T, VcsError>;

/// Implementation-defined git-level failure.
#[derive(Debug, Error)]
pub enum VcsError {
    /// git exited with a non-zero status.
    #[error("git exited with status {status}: {stderr}")]
    CommandFailed {
        /// Exit status (or -1 when killed by a signal).
        status: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The operation exceeded its timeout.
    #[error("git {operation} timed out after {seconds}s")]
    Timeout {
        /// Operation name, for log output.
        operation: String,
        /// Timeout that was exceeded.
        seconds: u64,
    },

    /// The git process could not be spawned.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// git produced output the facade could not interpret.
    #[error("unexpected git output: {0}")]
    Output(String),
}

/// Authentication settings carried through to git operations.
///
/// Credential and known-hosts handling is owned by the host; the engine
/// only forwards the ssh-mode toggle.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthSettings {
    /// Use the system ssh client instead of a bundled one.
    pub use_native_ssh: bool,
}

/// Git-level operations on one repository's working copy.
///
/// Every method fails with an implementation-defined [`VcsError`] on any
/// git-level problem. Operations block until completion or timeout; a
/// timeout surfaces as an ordinary failure.
#[async_trait]
pub trait VcsFacade: Send + Sync {
    /// Fetch `refspec` from the default remote.
    async fn fetch(
        &self,
        refspec: &str,
        timeout: Duration,
        fetch_tags: bool,
        auth: &AuthSettings,
        quiet: bool,
    ) -> VcsResult<()>;

    /// Switch the working copy to `branch`.
    async fn checkout(
        &self,
        branch: &str,
        timeout: Duration,
        auth: &AuthSettings,
    ) -> VcsResult<()>;

    /// Create a new local branch at the current head.
    async fn create_branch(&self, name: &str) -> VcsResult<()>;

    /// Merge `branch` into the current branch, attributed to `author`.
    async fn merge(&self, branch: &str, author: &AuthorIdent, quiet: bool) -> VcsResult<()>;

    /// Abort an in-progress merge, restoring the pre-merge working tree.
    async fn merge_abort(&self) -> VcsResult<()>;

    /// Resolve a ref to a commit hash; `None` when it does not resolve.
    async fn resolve_ref(&self, name: &str) -> VcsResult<Option<String>>;

    /// Set a repository-local configuration value.
    async fn set_config(&self, key: &str, value: &str) -> VcsResult<()>;

    /// Name of the currently checked-out branch, `None` on detached head.
    async fn current_branch(&self) -> VcsResult<Option<String>>;

    /// Capability version of the git backing this working copy.
    async fn version(&self) -> VcsResult<GitVersion>;
}
