pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod resolver;
pub mod ui;
pub mod version;

pub use engine::{PhaseRequest, PhaseVersionEngine, Resolution};
pub use error::{FlowError, Result};
