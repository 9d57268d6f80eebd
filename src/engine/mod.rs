//! Phase version engine
//!
//! Computes the version that should be tagged next for a phase of the
//! release pipeline. The engine never creates tags or branches; it reads the
//! repository through the resolvers and returns a [`Resolution`].
//!
//! Per phase:
//!
//! - [`dev`]: tracks the next unreleased line, one minor ahead of the most
//!   advanced release branch of the configured release channel
//! - [`channel`]: qa and stage, prerelease builds on a release line
//! - [`prod`]: bare release versions and the hotfix track

pub mod channel;
pub mod dev;
pub mod prod;

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::pattern::ChannelFilter;
use crate::domain::{Operation, Phase};
use crate::error::{FlowError, Result};
use crate::git::Repository;
use crate::resolver::{ReleaseBranchResolver, TagResolver};
use crate::version::{self, PrintFormat};
use semver::Version;

/// What the caller asks of a phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseRequest {
    /// Channel for qa and stage; ignored by dev and prod
    pub channel: Option<String>,
    /// Explicit base version, e.g. `v1.1.0`; derived when absent
    pub base_version: Option<String>,
    pub operation: Operation,
    pub print: PrintFormat,
}

impl PhaseRequest {
    pub fn new(operation: Operation) -> Self {
        PhaseRequest {
            operation,
            ..Self::default()
        }
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn base_version(mut self, base: impl Into<String>) -> Self {
        self.base_version = Some(base.into());
        self
    }

    pub fn print(mut self, print: PrintFormat) -> Self {
        self.print = print;
        self
    }
}

/// Outcome of a phase resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The raw resolved version, before projection
    pub version: Option<Version>,
    /// The print-formatted, prefixed text for the caller
    pub output: Option<String>,
    /// Discovery problems met along the way
    pub warnings: Vec<BoundaryWarning>,
}

impl Resolution {
    /// Whether any discovery step fell back to an empty result
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Resolves versions for the four release phases.
pub struct PhaseVersionEngine<'a, R: Repository> {
    config: &'a Config,
    tags: TagResolver<'a, R>,
    releases: ReleaseBranchResolver<'a, R>,
}

impl<'a, R: Repository> PhaseVersionEngine<'a, R> {
    /// Create an engine over `repo`
    pub fn new(repo: &'a R, config: &'a Config) -> Self {
        PhaseVersionEngine {
            config,
            tags: TagResolver::new(repo, config),
            releases: ReleaseBranchResolver::new(repo, config),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn tags(&self) -> &TagResolver<'a, R> {
        &self.tags
    }

    pub fn releases(&self) -> &ReleaseBranchResolver<'a, R> {
        &self.releases
    }

    /// Resolve `request` for `phase`.
    ///
    /// # Returns
    /// * `Ok(Resolution)` - Possibly without output, see [`Resolution`]
    /// * `Err` - If the operation is not supported by the phase, the explicit
    ///   base version does not parse, or the channel name is invalid
    pub fn resolve(&self, phase: Phase, request: &PhaseRequest) -> Result<Resolution> {
        if !phase.supports(request.operation) {
            return Err(FlowError::operation(format!(
                "{} is not available for the {} phase",
                request.operation, phase
            )));
        }

        let mut warnings = Vec::new();
        let version = match phase {
            Phase::Dev => self.resolve_dev(request, &mut warnings)?,
            Phase::Qa | Phase::Stage => self.resolve_channel(phase, request, &mut warnings)?,
            Phase::Prod => self.resolve_prod(request, &mut warnings)?,
        };

        let output = version
            .as_ref()
            .and_then(|v| version::render(v, request.print, &self.config.tag_prefix));

        match (&version, &output) {
            (Some(v), None) => tracing::error!(
                %phase,
                version = %v,
                print = %request.print,
                "resolved version has no such component"
            ),
            (None, _) => tracing::error!(
                %phase,
                operation = %request.operation,
                "no version could be resolved"
            ),
            _ => tracing::debug!(%phase, operation = %request.operation, output = ?output, "resolved"),
        }

        Ok(Resolution {
            version,
            output,
            warnings,
        })
    }

    pub fn dev(&self, request: &PhaseRequest) -> Result<Resolution> {
        self.resolve(Phase::Dev, request)
    }

    pub fn qa(&self, request: &PhaseRequest) -> Result<Resolution> {
        self.resolve(Phase::Qa, request)
    }

    pub fn stage(&self, request: &PhaseRequest) -> Result<Resolution> {
        self.resolve(Phase::Stage, request)
    }

    pub fn prod(&self, request: &PhaseRequest) -> Result<Resolution> {
        self.resolve(Phase::Prod, request)
    }

    fn explicit_base(&self, request: &PhaseRequest) -> Result<Option<Version>> {
        request
            .base_version
            .as_deref()
            .map(|text| version::parse_base_version(text, &self.config.tag_prefix))
            .transpose()
    }

    /// Explicit base, else the latest release branch for `filter`, else the
    /// configured default.
    fn acting_base(
        &self,
        request: &PhaseRequest,
        filter: &ChannelFilter,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Version> {
        if let Some(base) = self.explicit_base(request)? {
            return Ok(base);
        }

        match self.releases.latest_base_version(filter)?.take(warnings) {
            Some(base) => Ok(base),
            None => {
                tracing::debug!(%filter, "no release branch, using the default base version");
                self.config.default_base()
            }
        }
    }
}
