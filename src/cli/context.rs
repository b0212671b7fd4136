//! Shared setup for the premerge commands.
//!
//! Loads the step configuration, selects the provider, opens the shared
//! state file, probes each repository's git version and seeds the
//! per-repository current-branch keys the skip check reads.

use premerge::error::{Error, Result};
use premerge::params::StepConfig;
use premerge::provider::{ProviderRegistry, VcsRootProvider};
use premerge::publish::{FileState, SharedBuildState};
use premerge::refs::vcs_branch_param;
use premerge::session::{SessionConfig, SessionConfigFactory};
use premerge::types::RepositoryBinding;
use premerge::vcs::AuthSettings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Session configurations probed per repository during setup.
#[derive(Debug, Clone, Default)]
pub struct PerRepoConfigs {
    configs: HashMap<String, SessionConfig>,
}

impl SessionConfigFactory for PerRepoConfigs {
    fn create(&self, binding: &RepositoryBinding) -> Result<SessionConfig> {
        self.configs.get(&binding.id).cloned().ok_or_else(|| {
            Error::Config(format!("no session config for repository '{}'", binding.id))
        })
    }
}

/// Everything a premerge command needs, assembled from the step
/// configuration file.
pub struct StepContext {
    /// Parsed step configuration.
    pub config: StepConfig,
    /// Bindings in configuration order.
    pub bindings: Vec<RepositoryBinding>,
    /// Selected VCS provider.
    pub provider: Arc<dyn VcsRootProvider>,
    /// Shared build state, seeded with current-branch keys.
    pub state: FileState,
    /// Per-repository session configurations.
    pub configs: PerRepoConfigs,
}

impl StepContext {
    /// Assemble the context for one step invocation.
    pub async fn new(config_path: &Path, state_path: &Path) -> Result<Self> {
        let config = StepConfig::load(config_path)?;
        config.ensure_valid()?;

        let checkout_dir = checkout_dir_for(config_path)?;
        let registry = ProviderRegistry::with_defaults();
        let provider = registry.create(&config.provider, &checkout_dir)?;

        let mut state = FileState::load(state_path)?;
        let bindings = config.bindings();
        let mut configs = HashMap::new();

        for binding in &bindings {
            let facade = provider.open_facade(binding)?;
            let git_version = facade.version().await?;
            if let Some(branch) = facade.current_branch().await? {
                state.set(&vcs_branch_param(&binding.id), &branch);
            }
            configs.insert(
                binding.id.clone(),
                SessionConfig {
                    idle_timeout: config.idle_timeout(),
                    checkout_idle_timeout: config.checkout_timeout(),
                    auth: AuthSettings {
                        use_native_ssh: config.native_ssh,
                    },
                    fetch_tags: config.fetch_tags,
                    git_version,
                },
            );
        }

        Ok(Self {
            config,
            bindings,
            provider,
            state,
            configs: PerRepoConfigs { configs },
        })
    }
}

/// Repository paths in the configuration are relative to the
/// configuration file's directory.
fn checkout_dir_for(config_path: &Path) -> Result<PathBuf> {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(std::env::current_dir()?),
    }
}
