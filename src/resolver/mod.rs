//! Discovery of existing tags and release branches.
//!
//! Both resolvers share one rule: a failing repository call is logged and
//! reported as a [`crate::boundary::BoundaryWarning`], never returned as an
//! error. The only errors they return are contract violations such as an
//! invalid channel name.

pub mod releases;
pub mod tags;

pub use releases::ReleaseBranchResolver;
pub use tags::TagResolver;
