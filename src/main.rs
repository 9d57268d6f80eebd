use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_flow::cli::{self, Cli, Command};
use release_flow::config;
use release_flow::git::Git2Repository;
use release_flow::ui;

/// Exit status when the command resolved nothing
const EXIT_UNRESOLVED: i32 = 1;
/// Exit status when `--strict` is set and discovery was incomplete
const EXIT_DEGRADED: i32 = 3;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    // Load configuration
    let config = match config::load_config(args.config.as_deref(), &args.repo) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(EXIT_UNRESOLVED);
        }
    };

    // Works outside a repository too
    if let Command::Config = args.command {
        ui::print_line(&cli::render_config(&config)?);
        return Ok(());
    }

    let repo = match Git2Repository::open(&args.repo) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(EXIT_UNRESOLVED);
        }
    };

    let outcome = match cli::execute(&args.command, &repo, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(EXIT_UNRESOLVED);
        }
    };

    if args.strict && outcome.is_degraded() {
        ui::display_error("Tags or branches could not be listed; refusing to guess (--strict)");
        std::process::exit(EXIT_DEGRADED);
    }

    if outcome.is_unresolved() {
        std::process::exit(EXIT_UNRESOLVED);
    }

    for line in &outcome.lines {
        ui::print_line(line);
    }

    Ok(())
}

/// Logs go to stderr. `FLOW_LOG` takes an `EnvFilter` directive; without it
/// each `-v` raises the level one step from `warn`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("FLOW_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
