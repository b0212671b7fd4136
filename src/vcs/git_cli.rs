//! VCS facade backed by the `git` binary.

use crate::types::AuthorIdent;
use crate::vcs::{AuthSettings, GitVersion, VcsError, VcsFacade, VcsResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Remote the target branch is fetched from.
const DEFAULT_REMOTE: &str = "origin";

/// [`VcsFacade`] implementation shelling out to `git` in one working copy.
///
/// The native-ssh flag is accepted but not acted on: the system git client
/// already uses the system ssh, and credential setup is the host's concern.
#[derive(Debug, Clone)]
pub struct GitCliFacade {
    work_dir: PathBuf,
}

impl GitCliFacade {
    /// Create a facade for the working copy at `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// The working copy this facade operates on.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn run_git(
        &self,
        operation: &str,
        args: &[&str],
        envs: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> VcsResult<std::process::Output> {
        debug!(operation, ?args, work_dir = %self.work_dir.display(), "running git");

        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out child must not keep mutating the working copy
            // after the orchestrator has moved on.
            .kill_on_drop(true);
        for (key, value) in envs {
            command.env(key, value);
        }

        let child = command.spawn()?;
        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| VcsError::Timeout {
                    operation: operation.to_string(),
                    seconds: limit.as_secs(),
                })??,
            None => child.wait_with_output().await?,
        };
        Ok(output)
    }

    async fn run_checked(
        &self,
        operation: &str,
        args: &[&str],
        envs: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> VcsResult<String> {
        let output = self.run_git(operation, args, envs, timeout).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(VcsError::CommandFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl VcsFacade for GitCliFacade {
    async fn fetch(
        &self,
        refspec: &str,
        timeout: Duration,
        fetch_tags: bool,
        _auth: &AuthSettings,
        quiet: bool,
    ) -> VcsResult<()> {
        let mut args = vec!["fetch"];
        if quiet {
            args.push("--quiet");
        }
        args.push(if fetch_tags { "--tags" } else { "--no-tags" });
        args.push(DEFAULT_REMOTE);
        args.push(refspec);
        self.run_checked("fetch", &args, &[], Some(timeout)).await?;
        Ok(())
    }

    async fn checkout(
        &self,
        branch: &str,
        timeout: Duration,
        _auth: &AuthSettings,
    ) -> VcsResult<()> {
        self.run_checked("checkout", &["checkout", branch], &[], Some(timeout))
            .await?;
        Ok(())
    }

    async fn create_branch(&self, name: &str) -> VcsResult<()> {
        self.run_checked("branch", &["branch", name], &[], None).await?;
        Ok(())
    }

    async fn merge(&self, branch: &str, author: &AuthorIdent, quiet: bool) -> VcsResult<()> {
        let mut args = vec!["merge"];
        if quiet {
            args.push("--quiet");
        }
        args.push(branch);
        let envs = [
            ("GIT_AUTHOR_NAME", author.name.clone()),
            ("GIT_AUTHOR_EMAIL", author.email.clone()),
            ("GIT_COMMITTER_NAME", author.name.clone()),
            ("GIT_COMMITTER_EMAIL", author.email.clone()),
        ];
        self.run_checked("merge", &args, &envs, None).await?;
        Ok(())
    }

    async fn merge_abort(&self) -> VcsResult<()> {
        self.run_checked("merge --abort", &["merge", "--abort"], &[], None)
            .await?;
        Ok(())
    }

    async fn resolve_ref(&self, name: &str) -> VcsResult<Option<String>> {
        // Non-zero exit means the ref does not resolve, not a facade error.
        let output = self
            .run_git(
                "rev-parse",
                &["rev-parse", "--verify", "--quiet", name],
                &[],
                None,
            )
            .await?;
        if output.status.success() {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok((!hash.is_empty()).then_some(hash))
        } else {
            Ok(None)
        }
    }

    async fn set_config(&self, key: &str, value: &str) -> VcsResult<()> {
        self.run_checked("config", &["config", key, value], &[], None)
            .await?;
        Ok(())
    }

    async fn current_branch(&self) -> VcsResult<Option<String>> {
        let output = self
            .run_git(
                "symbolic-ref",
                &["symbolic-ref", "--quiet", "--short", "HEAD"],
                &[],
                None,
            )
            .await?;
        if output.status.success() {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok((!branch.is_empty()).then_some(branch))
        } else {
            // Detached head.
            Ok(None)
        }
    }

    async fn version(&self) -> VcsResult<GitVersion> {
        let stdout = self.run_checked("version", &["version"], &[], None).await?;
        GitVersion::parse(&stdout)
            .ok_or_else(|| VcsError::Output(format!("unparseable git version: {stdout}")))
    }
}
