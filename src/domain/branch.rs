use crate::version;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A release branch, e.g. `release/v1.2.0-alpha`
///
/// The version part carries the base and, optionally, the channel as its
/// prerelease segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub name: String,
    pub version: Version,
}

impl ReleaseBranch {
    /// Parse a branch name, removing the release-branch and tag prefixes.
    pub fn parse(name: &str, release_prefix: &str, tag_prefix: &str) -> Option<Self> {
        let rest = name.strip_prefix(release_prefix)?;
        let version = version::parse_prefixed(rest, tag_prefix)?;
        Some(ReleaseBranch {
            name: name.to_string(),
            version,
        })
    }

    /// Name of the release branch for `base` and an optional channel.
    pub fn name_for(
        release_prefix: &str,
        tag_prefix: &str,
        base: &Version,
        channel: Option<&str>,
    ) -> String {
        match channel {
            Some(channel) => format!("{}{}{}-{}", release_prefix, tag_prefix, base, channel),
            None => format!("{}{}{}", release_prefix, tag_prefix, base),
        }
    }

    /// Base version of the release line
    pub fn base(&self) -> Version {
        version::base_of(&self.version)
    }

    /// Channel of the release line, `None` for a production line
    pub fn channel(&self) -> Option<&str> {
        version::channel_of(&self.version)
    }
}

impl Ord for ReleaseBranch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for ReleaseBranch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
