//! QA and stage phases.
//!
//! Both issue `{base}-{channel}.{build}` tags on a release line. They differ
//! only in their per-channel start build numbers.

use super::{PhaseRequest, PhaseVersionEngine};
use crate::boundary::BoundaryWarning;
use crate::domain::pattern::ChannelFilter;
use crate::domain::{Operation, Phase, ReleaseBranch};
use crate::error::{FlowError, Result};
use crate::git::Repository;
use crate::version::{self, VersionBump};
use semver::Version;

impl<'a, R: Repository> PhaseVersionEngine<'a, R> {
    pub(super) fn resolve_channel(
        &self,
        phase: Phase,
        request: &PhaseRequest,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Option<Version>> {
        let channel = request
            .channel
            .as_deref()
            .ok_or_else(|| FlowError::operation(format!("the {} phase needs a channel", phase)))?;
        version::validate_channel(channel)?;

        let filter = ChannelFilter::Named(channel.to_string());
        let base = self.acting_base(request, &filter, warnings)?;
        let start = self.config.start_build_number(phase, channel);
        let scope = ReleaseBranch::name_for(
            &self.config.release_branch_prefix,
            &self.config.tag_prefix,
            &base,
            Some(channel),
        );

        let latest = self
            .tags
            .latest_tag(&scope, &filter, Some(&base))?
            .take(warnings);

        let version = match (request.operation, latest) {
            (_, None) => {
                tracing::debug!(%phase, %base, channel, "no tag on this line yet, first build");
                version::prerelease_version(&base, channel, start)?
            }
            (Operation::Next, Some(tag)) => version::increment_build(&tag.version).map_err(|e| {
                FlowError::tag(format!("Cannot continue from tag '{}': {}", tag.name, e))
            })?,
            (Operation::NextRelease, Some(tag)) => {
                let next_base = version::bump(&base, VersionBump::Minor)?;
                tracing::debug!(%phase, latest = %tag, %next_base, "cutting the next release line");
                version::prerelease_version(&next_base, channel, start)?
            }
            (_, Some(tag)) => tag.version,
        };

        Ok(Some(version))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::domain::Operation;
    use crate::engine::{PhaseRequest, PhaseVersionEngine};
    use crate::error::FlowError;
    use crate::git::MockRepository;

    #[test]
    fn test_qa_requires_channel() {
        let repo = MockRepository::new();
        let config = Config::default();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let err = engine.qa(&PhaseRequest::new(Operation::Next)).unwrap_err();
        assert!(matches!(err, FlowError::Operation(_)));
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let repo = MockRepository::new();
        let config = Config::default();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let err = engine
            .stage(&PhaseRequest::new(Operation::Next).channel("beta.1"))
            .unwrap_err();
        assert!(matches!(err, FlowError::Version(_)));
    }

    #[test]
    fn test_next_release_without_tags_is_first_build() {
        let repo = MockRepository::new();
        let config = Config::default();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let resolution = engine
            .qa(&PhaseRequest::new(Operation::NextRelease)
                .channel("alpha")
                .base_version("v1.2.0"))
            .unwrap();
        assert_eq!(resolution.output.as_deref(), Some("v1.2.0-alpha.1"));
    }

    #[test]
    fn test_next_release_bumps_minor() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.2.0-alpha.6");
        let config = Config::default();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let resolution = engine
            .qa(&PhaseRequest::new(Operation::NextRelease)
                .channel("alpha")
                .base_version("v1.2.0"))
            .unwrap();
        assert_eq!(resolution.output.as_deref(), Some("v1.3.0-alpha.1"));
    }

    #[test]
    fn test_channel_start_build_number() {
        let config = Config::from_toml(
            r#"
            [stage.channels.rc]
            start_build_number = 0
            "#,
        )
        .unwrap();
        let repo = MockRepository::new();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let resolution = engine
            .stage(&PhaseRequest::new(Operation::Current).channel("rc"))
            .unwrap();
        assert_eq!(resolution.output.as_deref(), Some("v1.0.0-rc.0"));
    }
}
