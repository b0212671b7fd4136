//! Shared test fixtures.

#![allow(dead_code, unused_imports)]

mod mock_vcs;

pub use mock_vcs::{FetchCall, MergeCall, MockVcsFacade};

use premerge::error::{Error, Result};
use premerge::progress::BuildLog;
use premerge::provider::VcsRootProvider;
use premerge::types::RepositoryBinding;
use premerge::vcs::VcsFacade;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Binding with checkout path equal to its id.
pub fn binding(id: &str) -> RepositoryBinding {
    RepositoryBinding::new(id, id)
}

/// Provider handing out pre-configured mock facades by repository id.
pub struct MockProvider {
    facades: HashMap<String, Arc<MockVcsFacade>>,
    opened: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            facades: HashMap::new(),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Register the facade used for a repository id.
    pub fn insert(&mut self, id: &str, facade: Arc<MockVcsFacade>) {
        self.facades.insert(id.to_string(), facade);
    }

    /// Repository ids whose facade was opened, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VcsRootProvider for MockProvider {
    fn provider_type(&self) -> &str {
        "mock"
    }

    fn open_facade(&self, binding: &RepositoryBinding) -> Result<Arc<dyn VcsFacade>> {
        self.opened.lock().unwrap().push(binding.id.clone());
        self.facades
            .get(&binding.id)
            .cloned()
            .map(|facade| facade as Arc<dyn VcsFacade>)
            .ok_or_else(|| Error::Config(format!("no mock facade for '{}'", binding.id)))
    }
}

/// Log sink recording every line for assertions.
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl BuildLog for RecordingLog {
    fn message(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }

    fn warning(&self, text: &str) {
        self.lines.lock().unwrap().push(format!("warning: {text}"));
    }

    fn error(&self, text: &str) {
        self.lines.lock().unwrap().push(format!("error: {text}"));
    }
}

/// Run a git command in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=test",
            "-c",
            "user.email=test@test.invalid",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Throwaway pair of real git repositories: an `origin` with a `feature`
/// branch ahead of `main`, and a `work` clone sitting on `main`.
pub struct TempGitRepo {
    pub dir: TempDir,
    pub origin: PathBuf,
    pub work: PathBuf,
}

impl TempGitRepo {
    /// Fixture whose feature branch merges cleanly into the clone.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Fixture whose feature branch conflicts with a local commit in the
    /// clone.
    pub fn with_conflict() -> Self {
        Self::build(true)
    }

    fn build(conflicting: bool) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let origin = dir.path().join("origin");
        fs::create_dir(&origin).expect("create origin");

        git(&origin, &["init", "-b", "main"]);
        fs::write(origin.join("a.txt"), "base\n").expect("write a.txt");
        git(&origin, &["add", "."]);
        git(&origin, &["commit", "-m", "initial"]);

        git(&origin, &["checkout", "-b", "feature"]);
        if conflicting {
            fs::write(origin.join("a.txt"), "remote change\n").expect("write a.txt");
        } else {
            fs::write(origin.join("b.txt"), "feature\n").expect("write b.txt");
        }
        git(&origin, &["add", "."]);
        git(&origin, &["commit", "-m", "feature change"]);
        git(&origin, &["checkout", "main"]);

        git(dir.path(), &["clone", "--quiet", "origin", "work"]);
        let work = dir.path().join("work");

        if conflicting {
            fs::write(work.join("a.txt"), "local change\n").expect("write a.txt");
            git(&work, &["commit", "-am", "local change"]);
        }

        Self { dir, origin, work }
    }

    /// Commit hash of the origin's feature branch tip.
    pub fn feature_sha(&self) -> String {
        git(&self.origin, &["rev-parse", "feature"])
    }
}
