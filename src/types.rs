//! Core types for premerge.

use std::path::PathBuf;

/// One repository participating in the build.
///
/// Bindings come from the build's VCS configuration and are immutable for
/// the build's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryBinding {
    /// Stable external id, embedded in shared-state keys.
    pub id: String,
    /// Human-readable name used in log output.
    pub name: String,
    /// Working-copy path relative to the checkout directory.
    pub checkout_path: PathBuf,
}

impl RepositoryBinding {
    /// Create a binding whose display name equals its id.
    pub fn new(id: impl Into<String>, checkout_path: impl Into<PathBuf>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            checkout_path: checkout_path.into(),
        }
    }
}

/// Terminal status of one premerge step invocation.
///
/// `Failed` is sticky: once recorded it cannot be reverted by a later
/// repository's success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultStatus {
    /// No repository was merged and nothing failed (all skipped, or no
    /// bindings at all).
    #[default]
    Skipped,
    /// At least one repository was merged and no hard failure occurred.
    Success,
    /// A hard failure occurred somewhere in the run.
    Failed,
}

impl ResultStatus {
    /// Record a repository success. A no-op once `Failed`.
    pub const fn and_success(self) -> Self {
        match self {
            Self::Failed => Self::Failed,
            _ => Self::Success,
        }
    }

    /// Record a hard failure. Terminal.
    #[allow(clippy::unused_self)]
    pub const fn and_failed(self) -> Self {
        Self::Failed
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A rejected step property, reported by configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProperty {
    /// Property key.
    pub key: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl InvalidProperty {
    /// Create an invalid-property report.
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Synthetic identity used for premerge commits, distinguishing them from
/// human commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdent {
    /// Author/committer name.
    pub name: String,
    /// Author/committer email.
    pub email: String,
}

impl AuthorIdent {
    /// The fixed robot identity premerge commits are attributed to.
    pub fn premerge_robot() -> Self {
        Self {
            name: "Premerge Robot".to_string(),
            email: "premerge-robot@localhost".to_string(),
        }
    }
}
