//! Domain logic - pure types independent of git operations

pub mod branch;
pub mod pattern;
pub mod phase;
pub mod tag;

pub use branch::ReleaseBranch;
pub use pattern::{ChannelFilter, PatternMatcher};
pub use phase::{Operation, Phase};
pub use tag::VersionTag;
