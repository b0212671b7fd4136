//! Git capability versions.

use regex::Regex;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version pattern is valid")
});

/// Oldest git that honors fine-grained timeout signalling. Older gits get
/// a 24-hour fallback fetch timeout instead.
pub const MIN_TIMEOUT_SUPPORT: GitVersion = GitVersion::new(1, 7, 1, 0);

/// A git version as major.minor.patch.build.
///
/// Field order gives derived `Ord` the expected lexicographic comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    major: u32,
    minor: u32,
    patch: u32,
    build: u32,
}

impl GitVersion {
    /// Construct a version from its four components.
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Whether this version predates `other`.
    pub fn is_less_than(self, other: Self) -> bool {
        self < other
    }

    /// Extract a version from `git version` output, e.g.
    /// `git version 2.39.2`. Missing trailing components default to zero.
    pub fn parse(output: &str) -> Option<Self> {
        let captures = VERSION_RE.captures(output)?;
        let part = |i: usize| {
            captures
                .get(i)
                .map_or(Some(0), |m| m.as_str().parse().ok())
        };
        Some(Self::new(part(1)?, part(2)?, part(3)?, part(4)?))
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}
