use std::fmt;

/// Warnings raised when repository discovery degrades to an empty result.
///
/// These are non-fatal: the resolver carries on as if nothing had been
/// found, and reports what went wrong next to the value it returns.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Listing tags failed
    TagListingFailed { scope: String, reason: String },
    /// Listing branches failed
    BranchListingFailed { prefix: String, reason: String },
    /// The branch tag membership was checked against does not resolve
    ScopeNotFound { branch: String, reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::TagListingFailed { scope, reason } => {
                write!(f, "Cannot list tags for '{}': {}", scope, reason)
            }
            BoundaryWarning::BranchListingFailed { prefix, reason } => {
                write!(f, "Cannot list branches matching '{}*': {}", prefix, reason)
            }
            BoundaryWarning::ScopeNotFound { branch, reason } => {
                write!(f, "Branch '{}' cannot be resolved: {}", branch, reason)
            }
        }
    }
}

/// A best-effort value together with the warnings raised while finding it.
///
/// An empty `value` with no warnings means nothing exists yet; an empty
/// `value` with warnings means discovery failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery<T> {
    pub value: T,
    pub warnings: Vec<BoundaryWarning>,
}

impl<T> Discovery<T> {
    /// A value found without trouble
    pub fn found(value: T) -> Self {
        Discovery {
            value,
            warnings: Vec::new(),
        }
    }

    /// A fallback value standing in for a failed lookup
    pub fn degraded(value: T, warning: BoundaryWarning) -> Self {
        tracing::warn!("{}", warning);
        Discovery {
            value,
            warnings: vec![warning],
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Transform the value, keeping the warnings
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Discovery<U> {
        Discovery {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Move the warnings into `sink` and return the bare value
    pub fn take(self, sink: &mut Vec<BoundaryWarning>) -> T {
        sink.extend(self.warnings);
        self.value
    }
}
