//! Development phase.
//!
//! Dev tags track the next unreleased line. Whenever a release branch of the
//! configured release channel moves ahead of the latest dev tag, the next dev
//! tag re-bases onto `release.minor + 1` and restarts its build counter.

use super::{PhaseRequest, PhaseVersionEngine};
use crate::boundary::BoundaryWarning;
use crate::domain::pattern::ChannelFilter;
use crate::domain::{Operation, VersionTag};
use crate::error::{FlowError, Result};
use crate::git::Repository;
use crate::version::{self, VersionBump};
use semver::Version;

impl<'a, R: Repository> PhaseVersionEngine<'a, R> {
    pub(super) fn resolve_dev(
        &self,
        request: &PhaseRequest,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Option<Version>> {
        let dev = &self.config.dev;
        let filter = ChannelFilter::Named(dev.channel.clone());

        // An explicit base pins the dev line; nothing is derived
        if let Some(base) = self.explicit_base(request)? {
            let latest = self
                .tags
                .latest_tag(&dev.branch, &filter, Some(&base))?
                .take(warnings);
            let version = match (request.operation, latest) {
                (Operation::Next, Some(tag)) => next_build(&tag)?,
                (_, Some(tag)) => tag.version,
                (_, None) => version::prerelease_version(&base, &dev.channel, dev.start_build_number)?,
            };
            return Ok(Some(version));
        }

        let release_filter = ChannelFilter::Named(self.config.release_channel.clone());
        let release_base = self
            .releases
            .latest_base_version(&release_filter)?
            .take(warnings);
        let target = match &release_base {
            Some(base) => base.clone(),
            None => self.config.default_base()?,
        };

        // Highest first
        let tags = self.tags.list_tags(&dev.branch, &filter)?.take(warnings);

        let version = match request.operation {
            Operation::Current => match tags.into_iter().find(|tag| tag.base() == target) {
                Some(tag) => tag.version,
                None => version::prerelease_version(&target, &dev.channel, dev.start_build_number)?,
            },
            _ => match (release_base, tags.into_iter().next()) {
                (None, None) => {
                    tracing::debug!(base = %target, "first dev tag, no release line yet");
                    version::prerelease_version(&target, &dev.channel, dev.start_build_number)?
                }
                (None, Some(tag)) => next_build(&tag)?,
                (Some(release), Some(tag)) if release <= tag.version => next_build(&tag)?,
                (Some(release), latest) => {
                    let rebased = version::bump(&release, VersionBump::Minor)?;
                    tracing::debug!(
                        release = %release,
                        dev = ?latest.map(|t| t.name),
                        rebased = %rebased,
                        "release line is ahead of dev, starting a new dev line"
                    );
                    version::prerelease_version(&rebased, &dev.channel, dev.start_build_number)?
                }
            },
        };

        Ok(Some(version))
    }
}

fn next_build(tag: &VersionTag) -> Result<Version> {
    version::increment_build(&tag.version)
        .map_err(|e| FlowError::tag(format!("Cannot continue from tag '{}': {}", tag.name, e)))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::domain::Operation;
    use crate::engine::{PhaseRequest, PhaseVersionEngine};
    use crate::git::MockRepository;

    fn next(repo: &MockRepository, config: &Config) -> String {
        PhaseVersionEngine::new(repo, config)
            .dev(&PhaseRequest::new(Operation::Next))
            .unwrap()
            .output
            .unwrap()
    }

    #[test]
    fn test_first_dev_tag() {
        let repo = MockRepository::new();
        assert_eq!(next(&repo, &Config::default()), "v1.0.0-dev.1");
    }

    #[test]
    fn test_rebase_when_release_line_ahead() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0-dev.1");
        repo.add_branch("release/v1.0.0-alpha");
        assert_eq!(next(&repo, &Config::default()), "v1.1.0-dev.1");

        repo.add_tag("v1.1.0-dev.1");
        assert_eq!(next(&repo, &Config::default()), "v1.1.0-dev.2");
    }

    #[test]
    fn test_release_line_without_dev_tags() {
        let mut repo = MockRepository::new();
        repo.add_branch("release/v2.3.0-alpha");
        assert_eq!(next(&repo, &Config::default()), "v2.4.0-dev.1");
    }

    #[test]
    fn test_other_release_channels_do_not_rebase() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0-dev.4");
        repo.add_branch("release/v1.0.0-beta");
        assert_eq!(next(&repo, &Config::default()), "v1.0.0-dev.5");
    }

    #[test]
    fn test_explicit_base_pins_the_line() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0-dev.3");
        repo.add_tag("v2.0.0-dev.1");
        let config = Config::default();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let pinned = engine
            .dev(&PhaseRequest::new(Operation::Next).base_version("v1.0.0"))
            .unwrap();
        assert_eq!(pinned.output.as_deref(), Some("v1.0.0-dev.4"));

        let fresh = engine
            .dev(&PhaseRequest::new(Operation::Current).base_version("v3.0.0"))
            .unwrap();
        assert_eq!(fresh.output.as_deref(), Some("v3.0.0-dev.1"));
    }

    #[test]
    fn test_configured_channel_and_start() {
        let mut config = Config::default();
        config.dev.channel = "snapshot".to_string();
        config.dev.start_build_number = 0;

        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0-dev.7");
        assert_eq!(next(&repo, &config), "v1.0.0-snapshot.0");
    }

    #[test]
    fn test_current_reports_the_target_line() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0-dev.4");
        repo.add_tag("v1.3.0-dev.2");
        repo.add_branch("release/v1.0.0-alpha");
        let config = Config::default();
        let engine = PhaseVersionEngine::new(&repo, &config);

        let current = engine.dev(&PhaseRequest::new(Operation::Current)).unwrap();
        assert_eq!(current.output.as_deref(), Some("v1.0.0-dev.4"));

        // Next still follows the highest dev tag
        assert_eq!(next(&repo, &config), "v1.3.0-dev.3");
    }

    #[test]
    fn test_current_without_tag_on_target_is_synthesized() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.1.0-dev.2");
        repo.add_branch("release/v2.0.0-alpha");
        let config = Config::default();

        let current = PhaseVersionEngine::new(&repo, &config)
            .dev(&PhaseRequest::new(Operation::Current))
            .unwrap();
        assert_eq!(current.output.as_deref(), Some("v2.0.0-dev.1"));
    }
}
