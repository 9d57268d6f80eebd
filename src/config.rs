use crate::domain::Phase;
use crate::error::{FlowError, Result};
use crate::version;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "flow.toml";

/// Represents the complete configuration for release-flow.
///
/// Read-only once loaded: [`load_config`] merges the file over the built-in
/// defaults and validates the result before handing it out.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default = "default_release_branch_prefix")]
    pub release_branch_prefix: String,

    #[serde(default = "default_base_version")]
    pub default_base_version: String,

    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    /// Release channel the dev line keeps one minor ahead of
    #[serde(default = "default_release_channel")]
    pub release_channel: String,

    /// Only consider tags reachable from the phase's branch
    #[serde(default)]
    pub strict_tag_branch_membership: bool,

    #[serde(default)]
    pub dev: DevConfig,

    #[serde(default = "default_qa")]
    pub qa: ChannelPhaseConfig,

    #[serde(default = "default_stage")]
    pub stage: ChannelPhaseConfig,

    #[serde(default)]
    pub prod: ProdConfig,
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_release_branch_prefix() -> String {
    "release/".to_string()
}

fn default_base_version() -> String {
    "1.0.0".to_string()
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_release_channel() -> String {
    "alpha".to_string()
}

fn default_start_build_number() -> u64 {
    1
}

/// Settings of the development phase.
///
/// Dev has a single channel, fixed here rather than chosen by the caller.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DevConfig {
    #[serde(default = "default_dev_channel")]
    pub channel: String,

    /// Branch dev tags are cut from
    #[serde(default = "default_dev_branch")]
    pub branch: String,

    #[serde(default = "default_start_build_number")]
    pub start_build_number: u64,
}

fn default_dev_channel() -> String {
    "dev".to_string()
}

fn default_dev_branch() -> String {
    "develop".to_string()
}

impl Default for DevConfig {
    fn default() -> Self {
        DevConfig {
            channel: default_dev_channel(),
            branch: default_dev_branch(),
            start_build_number: default_start_build_number(),
        }
    }
}

/// Settings of a phase whose channel is chosen by the caller (qa, stage).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChannelPhaseConfig {
    /// Start build number for channels without their own entry
    #[serde(default = "default_start_build_number")]
    pub start_build_number: u64,

    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
}

impl ChannelPhaseConfig {
    fn with_channels(names: &[&str]) -> Self {
        ChannelPhaseConfig {
            start_build_number: default_start_build_number(),
            channels: names
                .iter()
                .map(|name| (name.to_string(), ChannelConfig::default()))
                .collect(),
        }
    }

    /// First build number issued on a new line of `channel`
    pub fn start_build_number(&self, channel: &str) -> u64 {
        self.channels
            .get(channel)
            .map(|c| c.start_build_number)
            .unwrap_or(self.start_build_number)
    }
}

fn default_qa() -> ChannelPhaseConfig {
    ChannelPhaseConfig::with_channels(&["alpha"])
}

fn default_stage() -> ChannelPhaseConfig {
    ChannelPhaseConfig::with_channels(&["beta", "rc"])
}

/// Per-channel settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    #[serde(default = "default_start_build_number")]
    pub start_build_number: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            start_build_number: default_start_build_number(),
        }
    }
}

/// Settings of the production phase.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProdConfig {
    /// Branch production tags are checked against; defaults to the
    /// release branch of the base being resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_prefix: default_tag_prefix(),
            release_branch_prefix: default_release_branch_prefix(),
            default_base_version: default_base_version(),
            main_branch: default_main_branch(),
            release_channel: default_release_channel(),
            strict_tag_branch_membership: false,
            dev: DevConfig::default(),
            qa: default_qa(),
            stage: default_stage(),
            prod: ProdConfig::default(),
        }
    }
}

impl Config {
    /// Parses TOML text, merges it over the defaults and validates it.
    ///
    /// Channel tables merge entry by entry: declaring `[qa.channels.rc]`
    /// keeps the built-in `alpha` entry.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        let defaults = Config::default();

        for (phase, builtin) in [
            (&mut config.qa, &defaults.qa),
            (&mut config.stage, &defaults.stage),
        ] {
            for (name, channel) in &builtin.channels {
                phase
                    .channels
                    .entry(name.clone())
                    .or_insert_with(|| channel.clone());
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks every field that cannot be expressed in the types alone.
    pub fn validate(&self) -> Result<()> {
        check_prefix("tag_prefix", &self.tag_prefix, true)?;
        check_prefix("release_branch_prefix", &self.release_branch_prefix, false)?;
        check_prefix("main_branch", &self.main_branch, false)?;
        check_prefix("dev.branch", &self.dev.branch, false)?;
        if let Some(branch) = &self.prod.branch {
            check_prefix("prod.branch", branch, false)?;
        }

        self.default_base()?;

        check_channel("release_channel", &self.release_channel)?;
        check_channel("dev.channel", &self.dev.channel)?;
        for (phase, settings) in [("qa", &self.qa), ("stage", &self.stage)] {
            for name in settings.channels.keys() {
                check_channel(&format!("{}.channels", phase), name)?;
            }
        }

        Ok(())
    }

    /// The configured fallback base version
    pub fn default_base(&self) -> Result<Version> {
        let version = Version::parse(&self.default_base_version).map_err(|e| {
            FlowError::config(format!(
                "default_base_version '{}' is not a semantic version: {}",
                self.default_base_version, e
            ))
        })?;

        if !version.pre.is_empty() || !version.build.is_empty() {
            return Err(FlowError::config(format!(
                "default_base_version '{}' must be a bare major.minor.patch",
                self.default_base_version
            )));
        }

        Ok(version)
    }

    /// First build number for `channel` in `phase`
    pub fn start_build_number(&self, phase: Phase, channel: &str) -> u64 {
        match phase {
            Phase::Dev => self.dev.start_build_number,
            Phase::Qa => self.qa.start_build_number(channel),
            Phase::Stage => self.stage.start_build_number(channel),
            // Production tags carry no build number
            Phase::Prod => 0,
        }
    }
}

fn check_prefix(field: &str, value: &str, allow_empty: bool) -> Result<()> {
    if value.is_empty() && !allow_empty {
        return Err(FlowError::config(format!("{} must not be empty", field)));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(FlowError::config(format!(
            "{} '{}' must not contain whitespace",
            field, value
        )));
    }
    Ok(())
}

fn check_channel(field: &str, name: &str) -> Result<()> {
    version::validate_channel(name).map_err(|e| FlowError::config(format!("{}: {}", field, e)))
}

/// Where configuration is looked up when no explicit path is given.
pub fn default_config_paths(project_dir: &Path) -> Vec<PathBuf> {
    let mut paths = vec![project_dir.join(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("flow").join("config.toml"));
    }
    paths
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `flow.toml` in `project_dir`
/// 3. `flow/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, project_dir: &Path) -> Result<Config> {
    if let Some(path) = config_path {
        return load_from(path);
    }

    for path in default_config_paths(project_dir) {
        if path.exists() {
            return load_from(&path);
        }
    }

    tracing::debug!("no configuration file found, using defaults");
    Ok(Config::default())
}

fn load_from(path: &Path) -> Result<Config> {
    tracing::debug!(path = %path.display(), "loading configuration");
    let text = fs::read_to_string(path).map_err(|e| {
        FlowError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    Config::from_toml(&text)
}
