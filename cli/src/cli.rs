//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for agent-ensemble
#[derive(Parser, Debug)]
#[command(name = "agent-ensemble")]
#[command(author, version, about = "Run several analysis agents over a repository and aggregate their findings")]
#[command(long_about = r#"
agent-ensemble executes an analysis plan: a primary agent, optional secondary
and specialist agents, and fallback agents that substitute for any agent that
fails or times out. The result is a single JSON report.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./ensemble.toml     Project-level config
3. ~/.config/agent-ensemble/config.toml   Global config

Example:
  agent-ensemble validate plans/security.toml --check-availability
  agent-ensemble run plans/security.toml --payload pr-42.json --events run.jsonl
  agent-ensemble suggest security --secondary performance --language rust
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a plan file and print its issues
    Validate {
        /// Plan file (TOML)
        plan: PathBuf,

        /// Also try to create the primary (and, without fallback, secondary) agents
        #[arg(long)]
        check_availability: bool,
    },

    /// Execute a plan against a repository payload and print the report
    Run {
        /// Plan file (TOML)
        plan: PathBuf,

        /// Repository payload (JSON)
        #[arg(short, long, value_name = "FILE")]
        payload: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Record execution events as JSON lines
        #[arg(long, value_name = "FILE")]
        events: Option<PathBuf>,
    },

    /// Generate a plan from the [selection] preferences
    Suggest {
        /// Role of the primary agent
        role: String,

        /// Additional roles to cover with secondary agents
        #[arg(long, value_name = "ROLE")]
        secondary: Vec<String>,

        /// Repository languages, most significant first
        #[arg(long, value_name = "LANG")]
        language: Vec<String>,

        /// Execution strategy
        #[arg(long, default_value = "parallel")]
        strategy: String,

        /// Do not attach fallback agents
        #[arg(long)]
        no_fallback: bool,
    },

    /// Show configuration file locations and the effective engine settings
    Config,
}
