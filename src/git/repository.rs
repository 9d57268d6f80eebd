use crate::error::{FlowError, Result};
use git2::{BranchType, Oid, Repository as Git2Repo};
use std::collections::BTreeSet;
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn commit_of(&self, reference: &str) -> Result<Oid> {
        let object = match self.repo.revparse_single(reference) {
            Ok(object) => object,
            // A branch that only exists on a remote
            Err(e) => self.remote_branch(reference)?.ok_or_else(|| {
                FlowError::branch(format!("Cannot resolve '{}': {}", reference, e))
            })?,
        };

        let commit = object.peel_to_commit().map_err(|e| {
            FlowError::branch(format!("'{}' does not point to a commit: {}", reference, e))
        })?;

        Ok(commit.id())
    }

    /// The remote-tracking branch `<remote>/<name>`, whatever the remote is called.
    fn remote_branch(&self, name: &str) -> Result<Option<git2::Object<'_>>> {
        for entry in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            let matches = branch
                .name()?
                .and_then(|full| full.split_once('/'))
                .is_some_and(|(_, rest)| rest == name);

            if matches {
                return Ok(Some(branch.get().peel(git2::ObjectType::Commit)?));
            }
        }
        Ok(None)
    }

    fn tag_commit(&self, tag_name: &str) -> Option<Oid> {
        self.repo
            .find_reference(&format!("refs/tags/{}", tag_name))
            .ok()?
            .peel_to_commit()
            .ok()
            .map(|commit| commit.id())
    }
}

impl super::Repository for Git2Repository {
    fn list_tags(&self, scope: &str, merged_only: bool) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        let names = names.iter().flatten().map(str::to_string);

        if !merged_only {
            return Ok(names.collect());
        }

        let head = self.commit_of(scope)?;
        let mut merged = Vec::new();

        for name in names {
            // Tags pointing at something other than a commit are skipped
            let Some(tag_oid) = self.tag_commit(&name) else {
                continue;
            };

            if tag_oid == head || self.repo.graph_descendant_of(head, tag_oid)? {
                merged.push(name);
            }
        }

        Ok(merged)
    }

    fn list_branches(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();

        for entry in self.repo.branches(None)? {
            let (branch, branch_type) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };

            let name = match branch_type {
                BranchType::Local => name,
                // "origin/release/v1.0.0" -> "release/v1.0.0"
                BranchType::Remote => match name.split_once('/') {
                    Some((_, rest)) if rest != "HEAD" => rest,
                    _ => continue,
                },
            };

            if name.starts_with(prefix) {
                names.insert(name.to_string());
            }
        }

        Ok(names.into_iter().collect())
    }

    fn resolve_ref(&self, reference: &str) -> Result<String> {
        Ok(self.commit_of(reference)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::TempDir;

    fn commit(repo: &Git2Repo, message: &str) -> Oid {
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_git2_repository_open_missing() {
        let dir = TempDir::new().unwrap();
        assert!(Git2Repository::open(dir.path()).is_err());
    }

    #[test]
    fn test_list_tags_and_membership() {
        let dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(dir.path()).unwrap();

        let first = commit(&raw, "first");
        let first_commit = raw.find_commit(first).unwrap();
        raw.tag_lightweight("v1.0.0", first_commit.as_object(), false)
            .unwrap();
        raw.branch("develop", &first_commit, false).unwrap();

        let second = commit(&raw, "second");
        let second_commit = raw.find_commit(second).unwrap();
        raw.tag_lightweight("v1.1.0", second_commit.as_object(), false)
            .unwrap();
        drop(first_commit);
        drop(second_commit);

        let repo = Git2Repository::from_git2(raw);

        let mut all = repo.list_tags("develop", false).unwrap();
        all.sort();
        assert_eq!(all, vec!["v1.0.0", "v1.1.0"]);

        assert_eq!(repo.list_tags("develop", true).unwrap(), vec!["v1.0.0"]);
        assert!(repo.list_tags("missing", true).is_err());
    }

    #[test]
    fn test_list_branches_by_prefix() {
        let dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(dir.path()).unwrap();
        let head = commit(&raw, "init");
        let head_commit = raw.find_commit(head).unwrap();
        raw.branch("release/v1.0.0-alpha", &head_commit, false)
            .unwrap();
        raw.branch("feature/x", &head_commit, false).unwrap();
        drop(head_commit);

        let repo = Git2Repository::from_git2(raw);
        assert_eq!(
            repo.list_branches("release/").unwrap(),
            vec!["release/v1.0.0-alpha"]
        );
        assert_eq!(repo.resolve_ref("feature/x").unwrap(), head.to_string());
    }

    #[test]
    fn test_branch_on_any_remote_resolves() {
        let dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(dir.path()).unwrap();
        let head = commit(&raw, "init");
        let head_commit = raw.find_commit(head).unwrap();
        raw.tag_lightweight("v2.0.0", head_commit.as_object(), false)
            .unwrap();
        raw.reference("refs/remotes/upstream/release/v2.0.0", head, false, "fetch")
            .unwrap();
        drop(head_commit);

        let repo = Git2Repository::from_git2(raw);
        assert_eq!(
            repo.list_branches("release/").unwrap(),
            vec!["release/v2.0.0"]
        );
        assert_eq!(repo.resolve_ref("release/v2.0.0").unwrap(), head.to_string());
        assert_eq!(
            repo.list_tags("release/v2.0.0", true).unwrap(),
            vec!["v2.0.0"]
        );
        assert!(repo.resolve_ref("release/v9.0.0").is_err());
    }
}
