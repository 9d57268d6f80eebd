use crate::error::{FlowError, Result};
use crate::git::Repository;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// Mock repository for testing without actual git operations
///
/// Every tag records the branches it is reachable from. A tag added with
/// [`MockRepository::add_tag`] is reachable from every branch.
#[derive(Debug, Default)]
pub struct MockRepository {
    tags: BTreeMap<String, Option<BTreeSet<String>>>,
    branches: BTreeSet<String>,
    fail_tags: Cell<bool>,
    fail_branches: Cell<bool>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag reachable from every branch
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.insert(name.into(), None);
    }

    /// Add a tag reachable only from the given branches
    pub fn add_tag_on(&mut self, name: impl Into<String>, branches: &[&str]) {
        let reachable = branches.iter().map(|b| b.to_string()).collect();
        self.tags.insert(name.into(), Some(reachable));
    }

    /// Add a branch
    pub fn add_branch(&mut self, name: impl Into<String>) {
        self.branches.insert(name.into());
    }

    /// Make every subsequent tag listing fail
    pub fn fail_tag_listing(&self, fail: bool) {
        self.fail_tags.set(fail);
    }

    /// Make every subsequent branch listing fail
    pub fn fail_branch_listing(&self, fail: bool) {
        self.fail_branches.set(fail);
    }
}

impl Repository for MockRepository {
    fn list_tags(&self, scope: &str, merged_only: bool) -> Result<Vec<String>> {
        if self.fail_tags.get() {
            return Err(FlowError::tag("tag listing unavailable"));
        }

        if !merged_only {
            return Ok(self.tags.keys().cloned().collect());
        }

        self.resolve_ref(scope)?;
        Ok(self
            .tags
            .iter()
            .filter(|(_, reachable)| match reachable {
                Some(branches) => branches.contains(scope),
                None => true,
            })
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn list_branches(&self, prefix: &str) -> Result<Vec<String>> {
        if self.fail_branches.get() {
            return Err(FlowError::branch("branch listing unavailable"));
        }

        Ok(self
            .branches
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn resolve_ref(&self, reference: &str) -> Result<String> {
        // Fake but stable commit ids, one per branch
        self.branches
            .iter()
            .position(|branch| branch == reference)
            .map(|index| format!("{:040x}", index + 1))
            .ok_or_else(|| FlowError::branch(format!("Branch not found: {}", reference)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags("main", false).unwrap().is_empty());
        assert!(repo.list_branches("").unwrap().is_empty());
    }

    #[test]
    fn test_mock_repository_merged_only() {
        let mut repo = MockRepository::new();
        repo.add_branch("main");
        repo.add_branch("develop");
        repo.add_tag("v1.0.0");
        repo.add_tag_on("v1.1.0-dev.1", &["develop"]);

        assert_eq!(repo.list_tags("main", true).unwrap(), vec!["v1.0.0"]);
        assert_eq!(repo.list_tags("develop", true).unwrap().len(), 2);
        assert_eq!(repo.list_tags("main", false).unwrap().len(), 2);
    }

    #[test]
    fn test_mock_repository_unknown_scope() {
        let repo = MockRepository::new();
        assert!(repo.list_tags("nope", true).is_err());
        assert!(repo.list_tags("nope", false).is_ok());
        assert!(repo.resolve_ref("nope").is_err());
    }

    #[test]
    fn test_mock_repository_branch_prefix() {
        let mut repo = MockRepository::new();
        repo.add_branch("release/v1.0.0-alpha");
        repo.add_branch("feature/login");

        assert_eq!(
            repo.list_branches("release/").unwrap(),
            vec!["release/v1.0.0-alpha"]
        );
    }

    #[test]
    fn test_mock_repository_injected_failures() {
        let mut repo = MockRepository::new();
        repo.add_branch("main");
        repo.fail_tag_listing(true);
        repo.fail_branch_listing(true);

        assert!(repo.list_tags("main", false).is_err());
        assert!(repo.list_branches("").is_err());

        repo.fail_tag_listing(false);
        assert!(repo.list_tags("main", false).is_ok());
    }
}
