use crate::boundary::{BoundaryWarning, Discovery};
use crate::config::Config;
use crate::domain::pattern::{self, ChannelFilter, PatternMatcher};
use crate::domain::ReleaseBranch;
use crate::error::Result;
use crate::git::Repository;
use crate::version;
use semver::Version;

/// Finds release branches and the release lines they stand for.
pub struct ReleaseBranchResolver<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
}

impl<'a, R: Repository> ReleaseBranchResolver<'a, R> {
    /// Create a new release branch resolver
    pub fn new(repo: &'a R, config: &'a Config) -> Self {
        ReleaseBranchResolver { repo, config }
    }

    /// Release branches matching `filter`, highest version first.
    pub fn list_release_branches(
        &self,
        filter: &ChannelFilter,
    ) -> Result<Discovery<Vec<ReleaseBranch>>> {
        if let ChannelFilter::Named(channel) = filter {
            version::validate_channel(channel)?;
        }

        let prefix = &self.config.release_branch_prefix;
        let matcher = PatternMatcher::compile(&pattern::release_branch_template(
            prefix,
            &self.config.tag_prefix,
            filter,
        ))?;

        let names = match self.repo.list_branches(prefix) {
            Ok(names) => names,
            Err(e) => {
                return Ok(Discovery::degraded(
                    Vec::new(),
                    BoundaryWarning::BranchListingFailed {
                        prefix: prefix.clone(),
                        reason: e.to_string(),
                    },
                ))
            }
        };

        let mut branches: Vec<ReleaseBranch> = matcher
            .filter(&names)
            .iter()
            .filter_map(|name| {
                let branch = ReleaseBranch::parse(name, prefix, &self.config.tag_prefix);
                if branch.is_none() {
                    tracing::debug!(branch = %name, "ignoring release branch without a semantic version");
                }
                branch
            })
            .collect();
        branches.sort_by(|a, b| b.cmp(a));

        tracing::debug!(
            template = matcher.template(),
            found = branches.len(),
            "listed release branches"
        );
        Ok(Discovery::found(branches))
    }

    /// The most advanced release branch for `filter`.
    pub fn latest_release_branch(
        &self,
        filter: &ChannelFilter,
    ) -> Result<Discovery<Option<ReleaseBranch>>> {
        Ok(self
            .list_release_branches(filter)?
            .map(|branches| branches.into_iter().max()))
    }

    /// Highest base version among the release branches for `filter`.
    ///
    /// `None` when no branch matches; callers fall back to the configured
    /// default base version.
    pub fn latest_base_version(&self, filter: &ChannelFilter) -> Result<Discovery<Option<Version>>> {
        Ok(self
            .list_release_branches(filter)?
            .map(|branches| branches.iter().map(ReleaseBranch::base).max()))
    }
}
