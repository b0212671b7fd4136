//! Branch-naming and ref utilities.
//!
//! Pure functions deriving the deterministic premerge branch name and
//! normalizing ref strings, plus the shared-state key constants consumed
//! by later pipeline steps.

/// Prefix stripped when normalizing a user-supplied branch ref.
pub const REFS_HEADS_PREFIX: &str = "refs/heads/";

/// Prefix of every premerge branch name.
pub const PREMERGE_BRANCH_PREFIX: &str = "premerge";

/// Shared-state key holding the normalized target branch name.
pub const TARGET_BRANCH_SHARED_PARAM: &str = "premerge.targetBranch";

/// Shared-state key prefix for per-repository resolved target hashes.
/// The repository external id is appended after a dot.
pub const TARGET_SHA_SHARED_PARAM: &str = "premerge.targetSha";

/// Shared-state key prefix under which the host records each repository's
/// currently configured branch. The repository external id is appended
/// after a dot.
pub const VCS_BRANCH_PARAM: &str = "vcs.branch";

/// Strip every leading `refs/heads/` segment.
///
/// Strips repeatedly so the result is a fixed point; any other input is
/// returned unchanged.
pub fn cut_refs_heads(mut reference: &str) -> &str {
    while let Some(rest) = reference.strip_prefix(REFS_HEADS_PREFIX) {
        reference = rest;
    }
    reference
}

/// Derive the premerge branch name for a build.
///
/// Pure function of the build id, so concurrent builds get distinct
/// branches and re-runs of the same build get the same one.
pub fn premerge_branch_name(build_id: u64) -> String {
    format!("{PREMERGE_BRANCH_PREFIX}/{build_id}")
}

/// Shared-state key for one repository's resolved target-branch hash.
pub fn target_sha_param(repository_id: &str) -> String {
    format!("{TARGET_SHA_SHARED_PARAM}.{repository_id}")
}

/// Shared-state key for one repository's currently configured branch.
pub fn vcs_branch_param(repository_id: &str) -> String {
    format!("{VCS_BRANCH_PARAM}.{repository_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_refs_heads_strips_prefix() {
        assert_eq!(cut_refs_heads("refs/heads/main"), "main");
        assert_eq!(cut_refs_heads("main"), "main");
        assert_eq!(cut_refs_heads("refs/heads/refs/heads/x"), "x");
    }

    #[test]
    fn cut_refs_heads_is_idempotent() {
        for input in ["refs/heads/main", "main", "refs/heads/refs/heads/x", ""] {
            let once = cut_refs_heads(input);
            assert_eq!(cut_refs_heads(once), once);
        }
    }

    #[test]
    fn cut_refs_heads_only_strips_leading_segment() {
        assert_eq!(cut_refs_heads("feature/refs/heads/main"), "feature/refs/heads/main");
    }

    #[test]
    fn premerge_branch_name_is_deterministic() {
        assert_eq!(premerge_branch_name(42), premerge_branch_name(42));
        assert_eq!(premerge_branch_name(42), "premerge/42");
        assert_ne!(premerge_branch_name(42), premerge_branch_name(43));
    }

    #[test]
    fn shared_param_keys_embed_repository_id() {
        assert_eq!(target_sha_param("app"), "premerge.targetSha.app");
        assert_eq!(vcs_branch_param("app"), "vcs.branch.app");
    }
}
