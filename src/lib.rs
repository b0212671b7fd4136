//! Preliminary-merge build step.
//!
//! Before a CI build runs, this crate speculatively merges a configured
//! target branch into every repository bound to the build, so the build
//! verifies the post-merge state rather than the raw change. The merged
//! state lives on a throwaway `premerge/<build id>` branch; on success the
//! resolved target-branch commit hashes are published to shared build state
//! for later pipeline steps.

pub mod error;
pub mod orchestrator;
pub mod params;
pub mod progress;
pub mod provider;
pub mod publish;
pub mod refs;
pub mod session;
pub mod types;
pub mod vcs;
