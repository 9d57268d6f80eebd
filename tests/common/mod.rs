//! Throwaway git repositories for integration tests.

#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// A repository with one commit on `main`
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        let repo = Repository::init(dir.path()).expect("Could not init git repo");
        let fixture = TestRepo { dir, repo };
        fixture.commit_on("main", "Initial commit");
        fixture
            .repo
            .set_head("refs/heads/main")
            .expect("Could not point HEAD at main");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit on top of `branch`, creating it from `main` when missing
    pub fn commit_on(&self, branch: &str, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Could not get sig");
        let tree_id = self
            .repo
            .index()
            .expect("Could not get index")
            .write_tree()
            .expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).expect("Could not find tree");

        let parent = self
            .tip(branch)
            .or_else(|| self.tip("main"))
            .map(|oid| self.repo.find_commit(oid).expect("Could not find parent"));
        let parents: Vec<_> = parent.iter().collect();

        self.repo
            .commit(
                Some(&format!("refs/heads/{}", branch)),
                &sig,
                &sig,
                message,
                &tree,
                &parents,
            )
            .expect("Could not create commit")
    }

    /// Create `name` at the tip of `from`
    pub fn branch(&self, name: &str, from: &str) {
        let oid = self.tip(from).expect("Source branch has no commits");
        let commit = self.repo.find_commit(oid).expect("Could not find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Could not create branch");
    }

    /// Lightweight tag at the tip of `branch`
    pub fn tag(&self, name: &str, branch: &str) {
        let oid = self.tip(branch).expect("Branch has no commits");
        let object = self.repo.find_object(oid, None).expect("Could not find object");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("Could not create tag");
    }

    /// Commit on `branch` and tag the new commit
    pub fn tagged_commit(&self, branch: &str, tag: &str) {
        self.commit_on(branch, &format!("build {}", tag));
        self.tag(tag, branch);
    }

    pub fn write_config(&self, text: &str) {
        fs::write(self.path().join("flow.toml"), text).expect("Could not write flow.toml");
    }

    fn tip(&self, branch: &str) -> Option<Oid> {
        self.repo
            .find_reference(&format!("refs/heads/{}", branch))
            .ok()
            .and_then(|r| r.target())
    }
}
