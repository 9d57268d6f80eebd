//! Version string helpers shared by the resolvers and the phase engine.
//!
//! Everything here is pure: strings in, strings or [`semver::Version`] out.

use crate::error::{FlowError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Projection applied to a resolved version before it is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PrintFormat {
    /// The canonical version, e.g. `1.2.0-alpha.3`
    #[default]
    Full,
    /// `major.minor.patch` only
    Base,
    /// The dot-joined prerelease identifiers, e.g. `alpha.3`
    Channel,
    /// The numeric build counter, e.g. `3`
    Build,
}

impl PrintFormat {
    /// Whether the projection is itself a version and takes the tag prefix.
    pub fn is_versioned(self) -> bool {
        matches!(self, PrintFormat::Full | PrintFormat::Base)
    }
}

impl fmt::Display for PrintFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintFormat::Full => write!(f, "full"),
            PrintFormat::Base => write!(f, "base"),
            PrintFormat::Channel => write!(f, "channel"),
            PrintFormat::Build => write!(f, "build"),
        }
    }
}

/// Component of the base version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
        }
    }
}

/// Extracts one component of a semantic version string.
///
/// Returns `None` when `version` does not parse, and when the requested
/// component is absent (`channel` or `build` of a release version).
///
/// # Example
/// ```
/// use release_flow::version::{extract_component, PrintFormat};
///
/// assert_eq!(extract_component("1.2.0-alpha.3", PrintFormat::Base).as_deref(), Some("1.2.0"));
/// assert_eq!(extract_component("1.2.0-alpha.3", PrintFormat::Build).as_deref(), Some("3"));
/// assert_eq!(extract_component("not-a-version", PrintFormat::Full), None);
/// ```
pub fn extract_component(version: &str, format: PrintFormat) -> Option<String> {
    let parsed = Version::parse(version).ok()?;
    match format {
        PrintFormat::Full => Some(parsed.to_string()),
        PrintFormat::Base => Some(base_of(&parsed).to_string()),
        PrintFormat::Channel if parsed.pre.is_empty() => None,
        PrintFormat::Channel => Some(parsed.pre.as_str().to_string()),
        PrintFormat::Build => parsed.pre.as_str().split('.').nth(1).map(str::to_string),
    }
}

/// Parses a tag or branch suffix, removing `prefix` when present.
pub fn parse_prefixed(text: &str, prefix: &str) -> Option<Version> {
    let clean = text.strip_prefix(prefix).unwrap_or(text);
    Version::parse(clean).ok()
}

/// Parses a caller-supplied base version such as `v1.1.0` or `1.1.0`.
///
/// A prerelease or build-metadata suffix is dropped; the result is always a
/// bare `major.minor.patch`.
pub fn parse_base_version(text: &str, prefix: &str) -> Result<Version> {
    let trimmed = text.trim();
    let clean = Some(prefix)
        .filter(|p| !p.is_empty())
        .and_then(|p| trimmed.strip_prefix(p))
        .or_else(|| trimmed.strip_prefix('v'))
        .unwrap_or(trimmed);

    Version::parse(clean)
        .map(|v| base_of(&v))
        .map_err(|e| FlowError::version(format!("'{}' is not a semantic version: {}", text, e)))
}

/// `major.minor.patch` of `version` without prerelease or build metadata.
pub fn base_of(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

/// First prerelease identifier, i.e. the channel name.
pub fn channel_of(version: &Version) -> Option<&str> {
    if version.pre.is_empty() {
        return None;
    }
    version.pre.as_str().split('.').next()
}

/// Numeric build counter (second prerelease identifier).
pub fn build_of(version: &Version) -> Option<u64> {
    version.pre.as_str().split('.').nth(1)?.parse().ok()
}

/// Checks that `channel` is a single prerelease identifier (`[0-9A-Za-z-]+`).
pub fn validate_channel(channel: &str) -> Result<()> {
    let well_formed = !channel.is_empty()
        && channel
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && Prerelease::new(channel).is_ok();

    if well_formed {
        Ok(())
    } else {
        Err(FlowError::version(format!(
            "'{}' is not a valid channel name (use letters, digits and '-')",
            channel
        )))
    }
}

/// Builds `{base}-{channel}.{build}`.
pub fn prerelease_version(base: &Version, channel: &str, build: u64) -> Result<Version> {
    let pre = Prerelease::new(&format!("{}.{}", channel, build)).map_err(|e| {
        FlowError::version(format!("'{}' is not a valid channel name: {}", channel, e))
    })?;

    let mut version = base_of(base);
    version.pre = pre;
    Ok(version)
}

/// Increments the build counter of a `{base}-{channel}.{build}` version.
///
/// Fails when the version carries no numeric build counter or the counter
/// is already at its maximum.
pub fn increment_build(version: &Version) -> Result<Version> {
    let (channel, build) = match (channel_of(version), build_of(version)) {
        (Some(channel), Some(build)) => (channel, build),
        _ => {
            return Err(FlowError::version(format!(
                "'{}' has no build number",
                version
            )))
        }
    };
    let next = build.checked_add(1).ok_or_else(|| {
        FlowError::version(format!("build number of '{}' cannot be incremented", version))
    })?;
    prerelease_version(version, channel, next)
}

/// Increments the requested component of the base, resetting lower ones.
pub fn bump(version: &Version, bump: VersionBump) -> Result<Version> {
    let overflow = || FlowError::version(format!("cannot bump the {} of '{}'", bump, version));
    let mut next = match bump {
        VersionBump::Minor => {
            Version::new(version.major, version.minor.checked_add(1).ok_or_else(overflow)?, 0)
        }
        VersionBump::Patch => Version::new(
            version.major,
            version.minor,
            version.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    next.build = BuildMetadata::EMPTY;
    Ok(next)
}

/// Projects `version` through `format` and re-applies the tag prefix.
///
/// Channel and build projections are not versions and are returned bare.
pub fn render(version: &Version, format: PrintFormat, prefix: &str) -> Option<String> {
    let component = extract_component(&version.to_string(), format)?;
    if format.is_versioned() {
        Some(format!("{}{}", prefix, component))
    } else {
        Some(component)
    }
}
