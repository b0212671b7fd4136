//! Build-step parameters and validation.
//!
//! A step is configured by a TOML file naming the target branch, the
//! provider type, the repositories bound to the build, and the git timeout
//! knobs. Validation mirrors the server-side property processor of the
//! host pipeline: the target branch is required and must be non-empty.

use crate::error::{Error, Result};
use crate::types::{InvalidProperty, RepositoryBinding};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Property key for the configured target branch.
pub const TARGET_BRANCH_PARAM: &str = "target-branch";

/// Property key for the provider type.
pub const PROVIDER_TYPE_PARAM: &str = "provider";

/// Provider type registered by default.
pub const DEFAULT_PROVIDER: &str = "git";

const DEFAULT_IDLE_TIMEOUT_SECONDS: u64 = 600;
const DEFAULT_CHECKOUT_TIMEOUT_SECONDS: u64 = 600;

/// One `[[repository]]` entry in the step configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositoryEntry {
    /// Stable external id.
    pub id: String,
    /// Display name; defaults to the id.
    pub name: Option<String>,
    /// Working-copy path relative to the configuration file's directory.
    #[serde(default = "default_checkout_path")]
    pub path: PathBuf,
}

fn default_checkout_path() -> PathBuf {
    PathBuf::from(".")
}

impl RepositoryEntry {
    /// Convert into the binding handed to the orchestrator.
    pub fn to_binding(&self) -> RepositoryBinding {
        RepositoryBinding {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            checkout_path: self.path.clone(),
        }
    }
}

/// Parsed step configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StepConfig {
    /// Branch to merge into each repository. May carry a `refs/heads/`
    /// prefix; normalized once per invocation.
    #[serde(default)]
    pub target_branch: String,
    /// Provider type key selecting the VCS backend.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Whether fetches also transfer tags.
    #[serde(default)]
    pub fetch_tags: bool,
    /// Whether git should use the system ssh client.
    #[serde(default)]
    pub native_ssh: bool,
    /// Idle timeout for fetch operations, in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Idle timeout for checkout operations, in seconds.
    #[serde(default = "default_checkout_timeout")]
    pub checkout_timeout_seconds: u64,
    /// Repositories bound to the build, processed in order.
    #[serde(rename = "repository", default)]
    pub repositories: Vec<RepositoryEntry>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

const fn default_idle_timeout() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECONDS
}

const fn default_checkout_timeout() -> u64 {
    DEFAULT_CHECKOUT_TIMEOUT_SECONDS
}

impl StepConfig {
    /// Load a step configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Parse a step configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the configured properties.
    ///
    /// Returns the empty vec when everything is acceptable.
    pub fn validate(&self) -> Vec<InvalidProperty> {
        let mut invalid = Vec::new();
        if self.target_branch.trim().is_empty() {
            invalid.push(InvalidProperty::new(
                TARGET_BRANCH_PARAM,
                "Target branch must be specified",
            ));
        }
        if self.provider.trim().is_empty() {
            invalid.push(InvalidProperty::new(
                PROVIDER_TYPE_PARAM,
                "Provider type must be specified",
            ));
        }
        invalid
    }

    /// Validate and convert into an error on any invalid property.
    pub fn ensure_valid(&self) -> Result<()> {
        let invalid = self.validate();
        if invalid.is_empty() {
            return Ok(());
        }
        let summary = invalid
            .iter()
            .map(|p| format!("{}: {}", p.key, p.reason))
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::Parameters(summary))
    }

    /// One-line human description of the configured parameters.
    pub fn describe(&self) -> String {
        format!("Target branch: {}", self.target_branch)
    }

    /// Idle timeout as a [`Duration`].
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    /// Checkout idle timeout as a [`Duration`].
    pub const fn checkout_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout_seconds)
    }

    /// Bindings for every configured repository, in configuration order.
    pub fn bindings(&self) -> Vec<RepositoryBinding> {
        self.repositories.iter().map(RepositoryEntry::to_binding).collect()
    }
}
