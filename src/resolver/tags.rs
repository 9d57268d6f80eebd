use crate::boundary::{BoundaryWarning, Discovery};
use crate::config::Config;
use crate::domain::pattern::{self, ChannelFilter, PatternMatcher};
use crate::domain::VersionTag;
use crate::error::Result;
use crate::git::Repository;
use crate::version;
use semver::Version;

/// Finds version tags and picks the highest-ranked one.
pub struct TagResolver<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
}

impl<'a, R: Repository> TagResolver<'a, R> {
    /// Create a new tag resolver
    pub fn new(repo: &'a R, config: &'a Config) -> Self {
        TagResolver { repo, config }
    }

    /// Tags matching the naming template for `filter`, highest version first.
    ///
    /// Membership in `scope` is only enforced when
    /// `strict_tag_branch_membership` is set.
    pub fn list_tags(
        &self,
        scope: &str,
        filter: &ChannelFilter,
    ) -> Result<Discovery<Vec<VersionTag>>> {
        self.collect(scope, self.config.strict_tag_branch_membership, filter)
    }

    /// Like [`TagResolver::list_tags`], but always restricted to tags
    /// reachable from `scope`.
    pub fn list_reachable_tags(
        &self,
        scope: &str,
        filter: &ChannelFilter,
    ) -> Result<Discovery<Vec<VersionTag>>> {
        self.collect(scope, true, filter)
    }

    /// Highest tag for `filter`, optionally restricted to one base version.
    pub fn latest_tag(
        &self,
        scope: &str,
        filter: &ChannelFilter,
        base: Option<&Version>,
    ) -> Result<Discovery<Option<VersionTag>>> {
        let tags = self.list_tags(scope, filter)?;
        Ok(tags.map(|tags| pick_latest(tags, base)))
    }

    /// Highest tag reachable from `scope`, whatever the strictness setting.
    pub fn latest_reachable_tag(
        &self,
        scope: &str,
        filter: &ChannelFilter,
        base: Option<&Version>,
    ) -> Result<Discovery<Option<VersionTag>>> {
        let tags = self.list_reachable_tags(scope, filter)?;
        Ok(tags.map(|tags| pick_latest(tags, base)))
    }

    fn collect(
        &self,
        scope: &str,
        merged_only: bool,
        filter: &ChannelFilter,
    ) -> Result<Discovery<Vec<VersionTag>>> {
        if let ChannelFilter::Named(channel) = filter {
            version::validate_channel(channel)?;
        }
        let matcher =
            PatternMatcher::compile(&pattern::tag_template(&self.config.tag_prefix, filter))?;

        if merged_only {
            if let Err(e) = self.repo.resolve_ref(scope) {
                return Ok(Discovery::degraded(
                    Vec::new(),
                    BoundaryWarning::ScopeNotFound {
                        branch: scope.to_string(),
                        reason: e.to_string(),
                    },
                ));
            }
        }

        let names = match self.repo.list_tags(scope, merged_only) {
            Ok(names) => names,
            Err(e) => {
                return Ok(Discovery::degraded(
                    Vec::new(),
                    BoundaryWarning::TagListingFailed {
                        scope: scope.to_string(),
                        reason: e.to_string(),
                    },
                ))
            }
        };

        let mut tags: Vec<VersionTag> = matcher
            .filter(&names)
            .iter()
            .filter_map(|name| {
                let tag = VersionTag::parse(name, &self.config.tag_prefix);
                if tag.is_none() {
                    tracing::debug!(tag = %name, "ignoring tag that is not a semantic version");
                }
                tag
            })
            .collect();
        tags.sort_by(|a, b| b.cmp(a));

        tracing::debug!(
            scope,
            template = matcher.template(),
            merged_only,
            found = tags.len(),
            "listed tags"
        );
        Ok(Discovery::found(tags))
    }
}

fn pick_latest(tags: Vec<VersionTag>, base: Option<&Version>) -> Option<VersionTag> {
    tags.into_iter()
        .filter(|tag| base.map_or(true, |base| tag.base() == *base))
        .max()
}
