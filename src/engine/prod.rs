//! Production phase.
//!
//! Production tags are bare release versions. `next-release` and `next-fix`
//! move the base forward; `previous` looks back along the main branch.

use super::{PhaseRequest, PhaseVersionEngine};
use crate::boundary::BoundaryWarning;
use crate::domain::pattern::ChannelFilter;
use crate::domain::{Operation, ReleaseBranch};
use crate::error::Result;
use crate::git::Repository;
use crate::version::{self, VersionBump};
use semver::Version;

impl<'a, R: Repository> PhaseVersionEngine<'a, R> {
    pub(super) fn resolve_prod(
        &self,
        request: &PhaseRequest,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Option<Version>> {
        match request.operation {
            Operation::Previous => return self.previous_release(warnings),
            Operation::PreviousFix => {
                let previous = self.previous_release(warnings)?;
                return previous
                    .map(|v| version::bump(&v, VersionBump::Patch))
                    .transpose();
            }
            _ => {}
        }

        let release_base = self
            .releases
            .latest_base_version(&ChannelFilter::Any)?
            .take(warnings);
        let base = match (self.explicit_base(request)?, &release_base) {
            (Some(explicit), _) => explicit,
            (None, Some(derived)) => derived.clone(),
            (None, None) => self.config.default_base()?,
        };

        let scope = match &self.config.prod.branch {
            Some(branch) => branch.clone(),
            None => ReleaseBranch::name_for(
                &self.config.release_branch_prefix,
                &self.config.tag_prefix,
                &base,
                None,
            ),
        };
        let latest = self
            .tags
            .latest_tag(&scope, &ChannelFilter::Release, Some(&base))?
            .take(warnings);

        let bump = match request.operation {
            Operation::NextRelease => VersionBump::Minor,
            Operation::NextFix => VersionBump::Patch,
            _ => return Ok(Some(latest.map(|tag| tag.version).unwrap_or(base))),
        };

        if latest.is_none() && release_base.is_none() {
            tracing::debug!(%base, "no release history yet, using the base as-is");
            return Ok(Some(base));
        }

        version::bump(&base, bump).map(Some)
    }

    /// Latest release tag reachable from the main branch.
    fn previous_release(&self, warnings: &mut Vec<BoundaryWarning>) -> Result<Option<Version>> {
        let latest = self
            .tags
            .latest_reachable_tag(&self.config.main_branch, &ChannelFilter::Release, None)?
            .take(warnings);
        Ok(latest.map(|tag| tag.version))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::domain::Operation;
    use crate::engine::{PhaseRequest, PhaseVersionEngine};
    use crate::git::MockRepository;

    fn prod(repo: &MockRepository, request: PhaseRequest) -> Option<String> {
        let config = Config::default();
        PhaseVersionEngine::new(repo, &config)
            .prod(&request)
            .unwrap()
            .output
    }

    #[test]
    fn test_next_on_empty_repository() {
        let repo = MockRepository::new();
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::Next)).as_deref(),
            Some("v1.0.0")
        );
    }

    #[test]
    fn test_next_release_and_fix_guard() {
        let repo = MockRepository::new();
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::NextRelease)).as_deref(),
            Some("v1.0.0")
        );
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::NextFix)).as_deref(),
            Some("v1.0.0")
        );
    }

    #[test]
    fn test_next_release_and_fix_after_release() {
        let mut repo = MockRepository::new();
        repo.add_branch("release/v1.2.0");
        repo.add_tag("v1.2.0");
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::NextRelease)).as_deref(),
            Some("v1.3.0")
        );
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::NextFix)).as_deref(),
            Some("v1.2.1")
        );
    }

    #[test]
    fn test_prerelease_tags_are_ignored() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0-rc.3");
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::Current)).as_deref(),
            Some("v1.0.0")
        );
    }

    #[test]
    fn test_previous_follows_main_branch() {
        let mut repo = MockRepository::new();
        repo.add_branch("main");
        repo.add_tag_on("v1.0.0", &["main"]);
        repo.add_tag_on("v1.1.0", &["release/v1.1.0"]);

        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::Previous)).as_deref(),
            Some("v1.0.0")
        );
        assert_eq!(
            prod(&repo, PhaseRequest::new(Operation::PreviousFix)).as_deref(),
            Some("v1.0.1")
        );
    }

    #[test]
    fn test_previous_without_main_degrades() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0");
        let config = Config::default();
        let resolution = PhaseVersionEngine::new(&repo, &config)
            .prod(&PhaseRequest::new(Operation::Previous))
            .unwrap();

        assert_eq!(resolution.output, None);
        assert!(resolution.is_degraded());
    }
}
