//! Error types for premerge.

use crate::vcs::VcsError;
use thiserror::Error;

/// Result type for premerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the premerge step.
///
/// The session-level variants carry the repository external id and the
/// branch involved so log output can name the failing operation. Only
/// [`Error::FetchFailed`] is soft (tolerated per repository); everything
/// else aborts the whole step.
#[derive(Debug, Error)]
pub enum Error {
    /// Fetching the target branch failed for one repository (soft).
    #[error("fetching '{branch}' in repository '{repository}' failed: {source}")]
    FetchFailed {
        /// Repository external id.
        repository: String,
        /// Branch that was being fetched.
        branch: String,
        /// Underlying git-level error.
        #[source]
        source: VcsError,
    },

    /// Creating the premerge branch failed (hard).
    #[error("creating branch '{branch}' in repository '{repository}' failed: {source}")]
    BranchCreateFailed {
        /// Repository external id.
        repository: String,
        /// Branch that was being created.
        branch: String,
        /// Underlying git-level error.
        #[source]
        source: VcsError,
    },

    /// Checking out the premerge branch failed (hard).
    #[error("checkout to '{branch}' in repository '{repository}' failed: {source}")]
    CheckoutFailed {
        /// Repository external id.
        repository: String,
        /// Branch that was being checked out.
        branch: String,
        /// Underlying git-level error.
        #[source]
        source: VcsError,
    },

    /// Merging the target branch failed, conflicted or not (hard).
    #[error("merging '{branch}' in repository '{repository}' failed: {source}")]
    MergeFailed {
        /// Repository external id.
        repository: String,
        /// Branch that was being merged.
        branch: String,
        /// Underlying git-level error.
        #[source]
        source: VcsError,
    },

    /// The fetched target branch could not be resolved to a commit (hard).
    #[error("resolving '{branch}' in repository '{repository}' failed")]
    ResolveFailed {
        /// Repository external id.
        repository: String,
        /// Ref that could not be resolved.
        branch: String,
    },

    /// Every non-skipped repository failed at the fetch stage.
    #[error("fetching all target branches failed")]
    AllTargetFetchesFailed,

    /// Every repository was skipped, so no merge was performed.
    #[error("no repositories were merged")]
    NothingMerged,

    /// No provider is registered for the requested type key.
    #[error("'{0}' is an unsupported provider type")]
    UnsupportedProvider(String),

    /// Step parameters are missing or malformed.
    #[error("invalid step parameters: {0}")]
    Parameters(String),

    /// A git-level failure outside the classified protocol steps.
    #[error("git operation failed: {0}")]
    Vcs(#[from] VcsError),

    /// Shared build state could not be loaded or saved.
    #[error("shared build state error: {0}")]
    State(String),

    /// Step configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is tolerated per repository.
    ///
    /// Soft failures are counted and the orchestrator moves on to the next
    /// repository; hard failures stop the step immediately.
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }
}
