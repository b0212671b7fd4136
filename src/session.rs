//! Repository merge session.
//!
//! Executes the premerge protocol for exactly one repository: skip check,
//! fetch of the target branch, creation and checkout of the premerge
//! branch, the merge itself, and resolution of the merged target hash.
//! Fetch failures are soft; every later failure is hard and classified by
//! the error variant the caller receives.

use crate::error::{Error, Result};
use crate::progress::BuildLog;
use crate::publish::SharedBuildState;
use crate::refs::{cut_refs_heads, vcs_branch_param};
use crate::types::{AuthorIdent, RepositoryBinding};
use crate::vcs::version::MIN_TIMEOUT_SUPPORT;
use crate::vcs::{AuthSettings, GitVersion, VcsFacade};
use std::time::Duration;

/// Fallback fetch timeout for gits older than 1.7.1.0, which truncate or
/// ignore fine-grained timeout signalling.
const LEGACY_FETCH_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Ref git keeps while a merge is unresolved; used as the conflict probe.
const MERGE_HEAD: &str = "MERGE_HEAD";

/// Build-scoped configuration applied to one repository's session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle timeout for fetch operations.
    pub idle_timeout: Duration,
    /// Idle timeout for checkout operations.
    pub checkout_idle_timeout: Duration,
    /// Authentication settings forwarded to the facade.
    pub auth: AuthSettings,
    /// Whether fetches also transfer tags.
    pub fetch_tags: bool,
    /// Capability version of the repository's git.
    pub git_version: GitVersion,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(600),
            checkout_idle_timeout: Duration::from_secs(600),
            auth: AuthSettings::default(),
            fetch_tags: false,
            git_version: MIN_TIMEOUT_SUPPORT,
        }
    }
}

/// Creates session configurations per repository, the way the host's
/// plugin-config factory does for each VCS root.
pub trait SessionConfigFactory: Send + Sync {
    /// Configuration for one repository's session.
    fn create(&self, binding: &RepositoryBinding) -> Result<SessionConfig>;
}

/// Factory handing out the same configuration for every repository.
#[derive(Debug, Clone, Default)]
pub struct FixedSessionConfig(
    /// Configuration returned for every repository.
    pub SessionConfig,
);

impl SessionConfigFactory for FixedSessionConfig {
    fn create(&self, _binding: &RepositoryBinding) -> Result<SessionConfig> {
        Ok(self.0.clone())
    }
}

/// Stateful wrapper around one repository's facade for the duration of
/// its protocol. Owned exclusively by the orchestrator loop iteration
/// that created it; discarded when the protocol completes.
pub struct MergeSession<'a> {
    binding: &'a RepositoryBinding,
    config: &'a SessionConfig,
    facade: &'a dyn VcsFacade,
    log: &'a dyn BuildLog,
}

impl<'a> MergeSession<'a> {
    /// Open a session over one repository's facade.
    pub const fn new(
        binding: &'a RepositoryBinding,
        config: &'a SessionConfig,
        facade: &'a dyn VcsFacade,
        log: &'a dyn BuildLog,
    ) -> Self {
        Self {
            binding,
            config,
            facade,
            log,
        }
    }

    /// Timeout applied to the fetch of the target branch.
    pub fn fetch_timeout(&self) -> Duration {
        if self.config.git_version.is_less_than(MIN_TIMEOUT_SUPPORT) {
            LEGACY_FETCH_TIMEOUT
        } else {
            self.config.idle_timeout
        }
    }

    /// Whether this repository is already on the target branch.
    ///
    /// Reads the repository's currently configured branch from shared
    /// build state. A skipped repository contributes neither success nor
    /// failure to the aggregate.
    pub fn skip_check(&self, state: &dyn SharedBuildState, target_branch: &str) -> bool {
        let key = vcs_branch_param(&self.binding.id);
        match state.get(&key) {
            Some(current) if cut_refs_heads(&current) == target_branch => {
                self.log.warning(
                    "Current branch is the same as the target branch. Skipping repository.",
                );
                true
            }
            _ => false,
        }
    }

    /// Fetch the target branch to a same-named local ref.
    ///
    /// Failure here is soft: the caller records it and moves on to the
    /// next repository.
    pub async fn fetch(&self, branch: &str) -> Result<()> {
        let refspec = format!("+{branch}:{branch}");
        match self
            .facade
            .fetch(
                &refspec,
                self.fetch_timeout(),
                self.config.fetch_tags,
                &self.config.auth,
                true,
            )
            .await
        {
            Ok(()) => {
                self.log.message(&format!("'{branch}' fetched"));
                Ok(())
            }
            Err(source) => {
                self.log.warning(&format!("Fetching '{branch}' error"));
                Err(Error::FetchFailed {
                    repository: self.binding.id.clone(),
                    branch: branch.to_string(),
                    source,
                })
            }
        }
    }

    /// Create the premerge branch. Hard failure.
    pub async fn create_branch(&self, branch: &str) -> Result<()> {
        match self.facade.create_branch(branch).await {
            Ok(()) => {
                self.log.message(&format!("Created '{branch}'"));
                Ok(())
            }
            Err(source) => {
                self.log.error(&format!("Creating '{branch}' error"));
                Err(Error::BranchCreateFailed {
                    repository: self.binding.id.clone(),
                    branch: branch.to_string(),
                    source,
                })
            }
        }
    }

    /// Check out the premerge branch. Hard failure.
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        match self
            .facade
            .checkout(branch, self.config.checkout_idle_timeout, &self.config.auth)
            .await
        {
            Ok(()) => {
                self.log.message(&format!("Checkout to '{branch}'"));
                Ok(())
            }
            Err(source) => {
                self.log.error(&format!("Checkout to '{branch}' error"));
                Err(Error::CheckoutFailed {
                    repository: self.binding.id.clone(),
                    branch: branch.to_string(),
                    source,
                })
            }
        }
    }

    /// Configure the synthetic committer identity in the working copy.
    pub async fn set_user(&self) -> Result<()> {
        let ident = AuthorIdent::premerge_robot();
        self.facade.set_config("user.name", &ident.name).await?;
        self.facade.set_config("user.email", &ident.email).await?;
        Ok(())
    }

    /// Merge the fetched target branch into the current branch. Hard
    /// failure, conflicted or not.
    ///
    /// On failure the session probes whether a merge is stuck unresolved
    /// (`MERGE_HEAD` resolves); if so it aborts the in-progress merge to
    /// leave a clean working tree, then still propagates the original
    /// failure.
    pub async fn merge(&self, branch: &str) -> Result<()> {
        let author = AuthorIdent::premerge_robot();
        match self.facade.merge(branch, &author, true).await {
            Ok(()) => {
                self.log.message(&format!("'{branch}' was merged"));
                Ok(())
            }
            Err(source) => {
                if let Ok(Some(_)) = self.facade.resolve_ref(MERGE_HEAD).await {
                    self.log
                        .warning(&format!("Preliminary merge conflict with branch '{branch}'"));
                    if let Err(abort_err) = self.facade.merge_abort().await {
                        self.log.error("Merge abort error");
                        tracing::warn!(
                            repository = %self.binding.id,
                            error = %abort_err,
                            "merge abort failed"
                        );
                    }
                } else {
                    self.log.error(&format!("Merging '{branch}' error"));
                }
                Err(Error::MergeFailed {
                    repository: self.binding.id.clone(),
                    branch: branch.to_string(),
                    source,
                })
            }
        }
    }

    /// Resolve the merged target branch to its commit hash, this
    /// repository's contribution to the aggregate mapping.
    pub async fn resolve(&self, branch: &str) -> Result<String> {
        match self.facade.resolve_ref(branch).await {
            Ok(Some(hash)) => Ok(hash),
            Ok(None) => Err(Error::ResolveFailed {
                repository: self.binding.id.clone(),
                branch: branch.to_string(),
            }),
            Err(source) => Err(Error::Vcs(source)),
        }
    }
}
