//! Provider registry.
//!
//! The VCS backend used for a build is selected at runtime by a provider
//! type key from the step parameters. Providers are registered as factory
//! functions; selection of an unregistered key fails with a typed error
//! instead of falling through silently.

use crate::error::{Error, Result};
use crate::params::DEFAULT_PROVIDER;
use crate::types::RepositoryBinding;
use crate::vcs::{GitCliFacade, VcsFacade};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opens VCS facades for the repositories of one build.
pub trait VcsRootProvider: Send + Sync {
    /// The type key this provider is registered under.
    fn provider_type(&self) -> &str;

    /// Open a facade over one repository's working copy.
    fn open_facade(&self, binding: &RepositoryBinding) -> Result<Arc<dyn VcsFacade>>;
}

/// Provider for plain git working copies under a checkout directory.
#[derive(Debug, Clone)]
pub struct GitProvider {
    checkout_dir: PathBuf,
}

impl GitProvider {
    /// Create a provider rooted at the build's checkout directory.
    pub fn new(checkout_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkout_dir: checkout_dir.into(),
        }
    }
}

impl VcsRootProvider for GitProvider {
    fn provider_type(&self) -> &str {
        DEFAULT_PROVIDER
    }

    fn open_facade(&self, binding: &RepositoryBinding) -> Result<Arc<dyn VcsFacade>> {
        let work_dir = self.checkout_dir.join(&binding.checkout_path);
        if !work_dir.is_dir() {
            return Err(Error::Config(format!(
                "working copy for '{}' not found at {}",
                binding.id,
                work_dir.display()
            )));
        }
        Ok(Arc::new(GitCliFacade::new(work_dir)))
    }
}

/// Factory producing a provider for a given checkout directory.
pub type ProviderFactory = Box<dyn Fn(&Path) -> Arc<dyn VcsRootProvider> + Send + Sync>;

/// Registry mapping provider type keys to factories.
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in `git` provider registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_PROVIDER, |checkout_dir| {
            Arc::new(GitProvider::new(checkout_dir))
        });
        registry
    }

    /// Register a factory under a type key, replacing any previous one.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Path) -> Arc<dyn VcsRootProvider> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Box::new(factory));
    }

    /// Registered type keys, unordered.
    pub fn registered_types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Create the provider registered under `key`.
    pub fn create(&self, key: &str, checkout_dir: &Path) -> Result<Arc<dyn VcsRootProvider>> {
        self.factories
            .get(key)
            .map(|factory| factory(checkout_dir))
            .ok_or_else(|| Error::UnsupportedProvider(key.to_string()))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
