//! Git operations abstraction layer
//!
//! The resolvers only ever read from the repository: they list tags, list
//! branches and resolve references. The [Repository] trait captures exactly
//! that surface so the phase engine can run against a real repository or an
//! in-memory one.
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! ```rust
//! # use release_flow::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_flow::Result<()> {
//! let tags = repo.list_tags("develop", true)?;
//! let branches = repo.list_branches("release/")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Read-only repository operations used by the resolvers
///
/// ## Error Handling
///
/// Methods return [crate::error::Result<T>]. Callers in this crate treat
/// every error from these methods as a discovery failure: they log it and
/// continue with an empty result.
pub trait Repository {
    /// List tag names
    ///
    /// With `merged_only`, only tags whose commit is reachable from `scope`
    /// are returned, and an unknown `scope` is an error. Without it, `scope`
    /// is ignored and every tag is returned.
    ///
    /// # Arguments
    /// * `scope` - Branch or reference name (e.g., "develop", "release/v1.0.0-alpha")
    /// * `merged_only` - Restrict to tags reachable from `scope`
    fn list_tags(&self, scope: &str, merged_only: bool) -> Result<Vec<String>>;

    /// List branch names starting with `prefix`
    ///
    /// Local and remote-tracking branches are both included; the remote name
    /// is stripped from remote-tracking branches. Names are unique and sorted.
    fn list_branches(&self, prefix: &str) -> Result<Vec<String>>;

    /// Resolve a branch, tag or revision to a commit id
    ///
    /// # Returns
    /// * `Ok(String)` - Full hex commit id
    /// * `Err` - If the reference does not exist
    fn resolve_ref(&self, reference: &str) -> Result<String>;
}
