use crate::version;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A version tag, e.g. `v1.2.0-alpha.3`
///
/// Tags are owned by the repository; this is a read-only view of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    pub name: String,
    pub version: Version,
}

impl VersionTag {
    /// Parse a tag name, removing the configured tag prefix.
    ///
    /// Returns `None` when the remainder is not a semantic version.
    pub fn parse(name: &str, prefix: &str) -> Option<Self> {
        let version = version::parse_prefixed(name, prefix)?;
        Some(VersionTag {
            name: name.to_string(),
            version,
        })
    }

    /// `major.minor.patch` of this tag
    pub fn base(&self) -> Version {
        version::base_of(&self.version)
    }

    /// Channel segment, `None` for release tags
    pub fn channel(&self) -> Option<&str> {
        version::channel_of(&self.version)
    }

    /// Build counter, `None` for release tags
    pub fn build(&self) -> Option<u64> {
        version::build_of(&self.version)
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
