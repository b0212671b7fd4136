//! Premerge orchestration.
//!
//! Drives the merge session across every repository bound to the build as
//! an explicit fold: each repository's outcome is folded into an immutable
//! [`AggregateResult`] threaded through the loop, and the first hard
//! failure short-circuits the fold by returning the error. That makes the
//! monotonic-status invariant mechanical: once a hard failure occurs no
//! later repository is processed at all, so nothing can revert it.

use crate::error::{Error, Result};
use crate::progress::BuildLog;
use crate::provider::VcsRootProvider;
use crate::publish::SharedBuildState;
use crate::refs::{cut_refs_heads, premerge_branch_name};
use crate::session::{MergeSession, SessionConfigFactory};
use crate::types::{RepositoryBinding, ResultStatus};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Aggregated result of one premerge step invocation.
///
/// Updates consume the value and return a new one; status transitions are
/// monotonic toward `Failed`.
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    status: ResultStatus,
    soft_fetch_failures: usize,
    skipped: usize,
    target_hashes: BTreeMap<String, String>,
}

impl AggregateResult {
    /// Empty aggregate; status starts at `Skipped`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a repository skipped because it is already on the target
    /// branch. Skips are excluded from the all-fetches-failed accounting.
    pub fn with_skip(mut self) -> Self {
        self.skipped += 1;
        self
    }

    /// Record one repository's soft fetch failure.
    pub fn with_fetch_failure(mut self) -> Self {
        self.soft_fetch_failures += 1;
        self
    }

    /// Record one repository's merged target hash.
    pub fn with_merged(mut self, repository_id: &str, hash: String) -> Self {
        self.target_hashes.insert(repository_id.to_string(), hash);
        self.status = self.status.and_success();
        self
    }

    /// Record a hard failure. Terminal.
    pub fn with_failure(mut self) -> Self {
        self.status = self.status.and_failed();
        self
    }

    /// Current status.
    pub const fn status(&self) -> ResultStatus {
        self.status
    }

    /// Repositories that failed at the fetch stage.
    pub const fn soft_fetch_failures(&self) -> usize {
        self.soft_fetch_failures
    }

    /// Repositories skipped because they were already on the target branch.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Resolved target hash per merged repository, in id order.
    pub const fn target_hashes(&self) -> &BTreeMap<String, String> {
        &self.target_hashes
    }

    /// Repositories whose fetch was attempted (everything not skipped).
    pub fn attempted(&self) -> usize {
        self.soft_fetch_failures + self.target_hashes.len()
    }

    /// Whether every attempted repository failed at the fetch stage.
    ///
    /// Skips are excluded from the denominator, so an all-skipped run is
    /// not an all-failed run.
    pub fn all_fetches_failed(&self) -> bool {
        self.soft_fetch_failures > 0 && self.target_hashes.is_empty()
    }
}

/// What the premerge step hands to the result publisher.
#[derive(Debug, Clone)]
pub struct PremergeOutcome {
    /// Target branch, normalized.
    pub target_branch: String,
    /// Folded per-repository results.
    pub aggregate: AggregateResult,
}

/// Run the premerge protocol across every repository binding, in binding
/// order.
///
/// Fetch failures are tolerated per repository: a remote may be transiently
/// unreachable while others are fine, and the build should still exercise
/// the merge for the reachable ones. Branch-creation, checkout and merge
/// failures abort the whole step immediately via `Err` — a partially
/// merged working tree in one repository makes continuing to mutate the
/// others unsafe. If every attempted fetch failed, the step is a hard
/// failure too, because no repository produced any evidence of
/// mergeability.
pub async fn run_premerge(
    build_id: u64,
    raw_target_branch: &str,
    bindings: &[RepositoryBinding],
    provider: &dyn VcsRootProvider,
    configs: &dyn SessionConfigFactory,
    state: &dyn SharedBuildState,
    log: &dyn BuildLog,
) -> Result<PremergeOutcome> {
    let target_branch = cut_refs_heads(raw_target_branch).to_string();
    let premerge_branch = premerge_branch_name(build_id);

    log.message("Preliminary merge build step:");
    debug!(build_id, target_branch, premerge_branch, "starting premerge");

    let mut aggregate = AggregateResult::new();

    for binding in bindings {
        log.message(&format!("> {}", binding.name));

        let facade = provider.open_facade(binding)?;
        let config = configs.create(binding)?;
        let session = MergeSession::new(binding, &config, facade.as_ref(), log);

        if session.skip_check(state, &target_branch) {
            aggregate = aggregate.with_skip();
            continue;
        }

        if let Err(err) = session.fetch(&target_branch).await {
            warn!(repository = %binding.id, error = %err, "target branch fetch failed");
            aggregate = aggregate.with_fetch_failure();
            continue;
        }

        // Hard section: any failure below short-circuits the fold.
        session.create_branch(&premerge_branch).await?;
        session.checkout(&premerge_branch).await?;
        session.set_user().await?;
        session.merge(&target_branch).await?;
        let hash = session.resolve(&target_branch).await?;
        aggregate = aggregate.with_merged(&binding.id, hash);
    }

    if aggregate.all_fetches_failed() {
        log.error("Fetching all target branches error");
        return Err(Error::AllTargetFetchesFailed);
    }

    Ok(PremergeOutcome {
        target_branch,
        aggregate,
    })
}
