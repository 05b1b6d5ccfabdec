mod config;
mod error;
mod logging;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use policy::{AccessRequest, HookInput};
use tracing::debug;

use config::Config;
use error::Result;

const EXIT_ERROR: u8 = 1;
const EXIT_BLOCKED: u8 = 2;

#[derive(Parser)]
#[command(name = "edit-guard")]
#[command(about = "Blocks edits to protected paths", long_about = None)]
#[command(version)]
struct Cli {
    /// Policy file to use instead of searching for patterns.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide a PreToolUse hook request read from stdin (default)
    Hook,
    /// Check whether editing the given paths would be blocked
    Check {
        /// Paths to check
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Show the policy file in effect and its patterns
    Config,
}

/// How the process exits when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Allow,
    Block,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Allow => ExitCode::SUCCESS,
            Outcome::Block => ExitCode::from(EXIT_BLOCKED),
        }
    }
}

fn main() -> ExitCode {
    logging::init();

    // Exit code 2 means "blocked" to the hook caller, so usage errors must
    // not use clap's default status.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.exit_code() == 0 { 0 } else { EXIT_ERROR };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match run(cli) {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::from_process(cli.config)?;

    match cli.command {
        Some(Commands::Hook) | None => cmd_hook(&config),
        Some(Commands::Check { paths }) => cmd_check(&config, &paths),
        Some(Commands::Config) => cmd_config(&config),
    }
}

fn cmd_hook(config: &Config) -> Result<Outcome> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let hook = HookInput::from_json(&input)?;

    // Non-edit tools and edits without a target never touch the policy.
    let Some(request) = hook.access_request()? else {
        debug!(tool = %hook.tool_name, "nothing to check");
        return Ok(Outcome::Allow);
    };

    let policy = config.load_policy()?;
    let decision = policy.check_request(&request, &config.matcher);

    match decision.reason() {
        Some(reason) => {
            eprintln!("SECURITY: Blocked edit to {reason}: {}", request.path);
            Ok(Outcome::Block)
        }
        None => Ok(Outcome::Allow),
    }
}

fn cmd_check(config: &Config, paths: &[String]) -> Result<Outcome> {
    let policy = config.load_policy()?;
    let mut outcome = Outcome::Allow;

    for path in paths {
        let decision = policy.check_request(&AccessRequest::modify(path.as_str()), &config.matcher);
        match decision.reason() {
            Some(reason) => {
                println!("block {path}: {reason}");
                outcome = Outcome::Block;
            }
            None => println!("allow {path}"),
        }
    }

    Ok(outcome)
}

fn cmd_config(config: &Config) -> Result<Outcome> {
    let path = config.policy_path();
    let policy = config.load_policy()?;

    println!("Policy: {}", path.display());
    if !path.exists() {
        println!("(not found, using empty policy)");
    }

    for (name, patterns) in policy.groups() {
        println!("\n{name} ({})", patterns.len());
        for pattern in patterns {
            println!("  {pattern}");
        }
    }

    Ok(Outcome::Allow)
}
