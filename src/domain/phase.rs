use std::fmt;

/// A stage of the release pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Dev,
    Qa,
    Stage,
    Prod,
}

impl Phase {
    /// Operations the phase knows how to resolve.
    pub fn operations(self) -> &'static [Operation] {
        match self {
            Phase::Dev => &[Operation::Current, Operation::Next],
            Phase::Qa | Phase::Stage => &[
                Operation::Current,
                Operation::Next,
                Operation::NextRelease,
            ],
            Phase::Prod => &[
                Operation::Current,
                Operation::Next,
                Operation::NextRelease,
                Operation::NextFix,
                Operation::Previous,
                Operation::PreviousFix,
            ],
        }
    }

    pub fn supports(self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Dev => write!(f, "dev"),
            Phase::Qa => write!(f, "qa"),
            Phase::Stage => write!(f, "stage"),
            Phase::Prod => write!(f, "prod"),
        }
    }
}

/// What the caller wants resolved for a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// The latest tag, or the first one the line would get
    #[default]
    Current,
    /// The next build on the current line
    Next,
    /// The first build of the next minor line
    NextRelease,
    /// The next patch release (hotfix track)
    NextFix,
    /// The latest release reachable from the main branch
    Previous,
    /// A patch on top of `Previous`
    PreviousFix,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Current => write!(f, "current"),
            Operation::Next => write!(f, "next"),
            Operation::NextRelease => write!(f, "next-release"),
            Operation::NextFix => write!(f, "next-fix"),
            Operation::Previous => write!(f, "previous"),
            Operation::PreviousFix => write!(f, "previous-fix"),
        }
    }
}
