//! Command-line surface and command dispatch.
//!
//! Argument types are plain clap derives; [`execute`] runs a parsed command
//! against any [`Repository`] so the whole flow can be driven from tests
//! without a process boundary.

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::pattern::ChannelFilter;
use crate::domain::{Operation, Phase};
use crate::engine::{PhaseRequest, PhaseVersionEngine};
use crate::error::{FlowError, Result};
use crate::git::Repository;
use crate::version::{self, PrintFormat};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "flow",
    version,
    about = "Compute the next version tag for each phase of a release pipeline"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long = "repo",
        global = true,
        default_value = ".",
        help = "Path inside the git repository"
    )]
    pub repo: PathBuf,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        help = "Exit with status 3 instead of printing when tags or branches could not be listed"
    )]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the version for a release phase
    #[command(subcommand)]
    Phase(PhaseCommand),

    /// Inspect version tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Inspect release branches
    #[command(subcommand)]
    Release(ReleaseCommand),

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum PhaseCommand {
    /// Development builds, one minor ahead of the release line
    Dev {
        #[command(flatten)]
        operation: DevOperation,

        #[arg(long, value_enum, default_value_t = PrintFormat::Full)]
        print: PrintFormat,
    },

    /// QA builds on a release line
    Qa(ChannelPhaseArgs),

    /// Staging builds on a release line
    Stage(ChannelPhaseArgs),

    /// Production releases
    Prod(ProdArgs),
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct DevOperation {
    #[arg(long, help = "Next dev build")]
    pub next: bool,

    #[arg(long, help = "Latest dev build (default)")]
    pub current: bool,
}

impl DevOperation {
    pub fn operation(&self) -> Operation {
        if self.next {
            Operation::Next
        } else {
            Operation::Current
        }
    }
}

#[derive(Args, Debug)]
pub struct ChannelPhaseArgs {
    /// Channel name, e.g. alpha or beta
    pub channel: String,

    /// Base version of the release line, e.g. v1.2.0
    pub version: Option<String>,

    #[command(flatten)]
    pub operation: ChannelOperation,

    #[arg(long, value_enum, default_value_t = PrintFormat::Full)]
    pub print: PrintFormat,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct ChannelOperation {
    #[arg(long, help = "Next build on this line")]
    pub next: bool,

    #[arg(long, help = "First build of the next minor line")]
    pub next_release: bool,

    #[arg(long, help = "Latest build on this line (default)")]
    pub current: bool,
}

impl ChannelOperation {
    pub fn operation(&self) -> Operation {
        if self.next {
            Operation::Next
        } else if self.next_release {
            Operation::NextRelease
        } else {
            Operation::Current
        }
    }
}

#[derive(Args, Debug)]
pub struct ProdArgs {
    /// Base version of the release line, e.g. v1.2.0
    pub version: Option<String>,

    #[command(flatten)]
    pub operation: ProdOperation,

    #[arg(long, value_enum, default_value_t = PrintFormat::Full)]
    pub print: PrintFormat,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct ProdOperation {
    #[arg(long, help = "Release for this line")]
    pub next: bool,

    #[arg(long, help = "Next minor release")]
    pub next_release: bool,

    #[arg(long, help = "Next patch release")]
    pub next_fix: bool,

    #[arg(long, help = "Release for this line (default)")]
    pub current: bool,

    #[arg(long, help = "Latest release on the main branch")]
    pub previous: bool,

    #[arg(long, help = "Patch on top of the latest release on the main branch")]
    pub previous_fix: bool,
}

impl ProdOperation {
    pub fn operation(&self) -> Operation {
        if self.next {
            Operation::Next
        } else if self.next_release {
            Operation::NextRelease
        } else if self.next_fix {
            Operation::NextFix
        } else if self.previous {
            Operation::Previous
        } else if self.previous_fix {
            Operation::PreviousFix
        } else {
            Operation::Current
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// List version tags reachable from a branch, highest first
    List { branch: String },

    /// Print the highest version tag reachable from a branch
    Latest {
        branch: String,

        #[arg(long, value_enum, default_value_t = PrintFormat::Full)]
        print: PrintFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// List release branches, highest first
    List { channel: Option<String> },

    /// Print the most advanced release line of a channel
    Latest {
        channel: String,

        #[arg(long, value_enum, default_value_t = PrintFormat::Full)]
        print: PrintFormat,
    },
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    /// Lines for standard output
    pub lines: Vec<String>,
    pub warnings: Vec<BoundaryWarning>,
    /// An empty `lines` means the command failed to resolve anything
    pub requires_output: bool,
}

impl Outcome {
    fn single(line: Option<String>, warnings: Vec<BoundaryWarning>) -> Self {
        Outcome {
            lines: line.into_iter().collect(),
            warnings,
            requires_output: true,
        }
    }

    fn listing(lines: Vec<String>, warnings: Vec<BoundaryWarning>) -> Self {
        Outcome {
            lines,
            warnings,
            requires_output: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Nothing to print although the command should have printed a line
    pub fn is_unresolved(&self) -> bool {
        self.requires_output && self.lines.is_empty()
    }
}

/// Run `command` against `repo`.
pub fn execute<R: Repository>(command: &Command, repo: &R, config: &Config) -> Result<Outcome> {
    let engine = PhaseVersionEngine::new(repo, config);

    match command {
        Command::Phase(phase) => {
            let (phase, request) = phase_request(phase);
            let resolution = engine.resolve(phase, &request)?;
            Ok(Outcome::single(resolution.output, resolution.warnings))
        }
        Command::Tag(TagCommand::List { branch }) => {
            let tags = engine
                .tags()
                .list_reachable_tags(branch, &ChannelFilter::Any)?;
            Ok(Outcome::listing(
                tags.value.into_iter().map(|t| t.name).collect(),
                tags.warnings,
            ))
        }
        Command::Tag(TagCommand::Latest { branch, print }) => {
            let latest = engine
                .tags()
                .latest_reachable_tag(branch, &ChannelFilter::Any, None)?;
            if latest.value.is_none() {
                tracing::error!(branch = %branch, "no version tag is reachable from this branch");
            }
            let line = latest
                .value
                .and_then(|tag| version::render(&tag.version, *print, &config.tag_prefix));
            Ok(Outcome::single(line, latest.warnings))
        }
        Command::Release(ReleaseCommand::List { channel }) => {
            let branches = engine
                .releases()
                .list_release_branches(&ChannelFilter::from_option(channel.as_deref()))?;
            Ok(Outcome::listing(
                branches.value.into_iter().map(|b| b.name).collect(),
                branches.warnings,
            ))
        }
        Command::Release(ReleaseCommand::Latest { channel, print }) => {
            let latest = engine
                .releases()
                .latest_release_branch(&ChannelFilter::Named(channel.clone()))?;
            if latest.value.is_none() {
                tracing::error!(channel = %channel, "no release branch exists for this channel");
            }
            let line = latest
                .value
                .and_then(|branch| version::render(&branch.version, *print, &config.tag_prefix));
            Ok(Outcome::single(line, latest.warnings))
        }
        Command::Config => Ok(Outcome::single(
            Some(render_config(config)?),
            Vec::new(),
        )),
    }
}

/// The effective configuration as TOML.
pub fn render_config(config: &Config) -> Result<String> {
    toml::to_string(config)
        .map(|text| text.trim_end().to_string())
        .map_err(|e| FlowError::config(format!("Cannot render configuration: {}", e)))
}

fn phase_request(command: &PhaseCommand) -> (Phase, PhaseRequest) {
    match command {
        PhaseCommand::Dev { operation, print } => (
            Phase::Dev,
            PhaseRequest::new(operation.operation()).print(*print),
        ),
        PhaseCommand::Qa(args) => (Phase::Qa, channel_request(args)),
        PhaseCommand::Stage(args) => (Phase::Stage, channel_request(args)),
        PhaseCommand::Prod(args) => (
            Phase::Prod,
            PhaseRequest {
                channel: None,
                base_version: args.version.clone(),
                operation: args.operation.operation(),
                print: args.print,
            },
        ),
    }
}

fn channel_request(args: &ChannelPhaseArgs) -> PhaseRequest {
    PhaseRequest {
        channel: Some(args.channel.clone()),
        base_version: args.version.clone(),
        operation: args.operation.operation(),
        print: args.print,
    }
}
