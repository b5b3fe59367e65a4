//! Quadratic voting daemon: replays scripted calls against an in-memory
//! ledger and computes commitment hashes for voters.

mod config;
mod script;

use anyhow::Context;
use clap::Parser;
use config::DaemonConfig;
use qvote_ledger::{derive_phase, PhaseSchedule};
use qvote_types::{AccountId, CandidateId, Clock, PollId, Salt, SystemClock, Timestamp};
use qvote_utils::{format_duration, LogFormat};
use script::Script;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qvote-daemon", about = "Commit-reveal quadratic voting ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long, env = "QVOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "QVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "QVOTE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Ledger owner (overrides the config file).
    #[arg(long, env = "QVOTE_OWNER")]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Execute a TOML script of timed calls and print the final state as JSON.
    Replay {
        /// Script file.
        script: PathBuf,
    },
    /// Compute the commitment hash a voter submits when committing.
    Hash {
        #[arg(long)]
        poll: u64,
        #[arg(long)]
        votes: u64,
        #[arg(long)]
        candidate: u8,
        /// 32-byte hex salt. Mutually exclusive with --salt-from.
        #[arg(long, conflicts_with = "salt_from")]
        salt: Option<Salt>,
        /// Derive the salt from this account id (not secret).
        #[arg(long)]
        salt_from: Option<String>,
    },
    /// Show the phase a schedule is in and the time to its next boundary.
    Phase {
        #[arg(long)]
        start_commit: u64,
        #[arg(long)]
        start_reveal: u64,
        /// Evaluate at this unix time instead of the system clock.
        #[arg(long)]
        at: Option<u64>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(owner) = cli.owner {
        config.owner = owner;
    }

    qvote_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Replay { script } => {
            let owner = config.owner()?;
            let parsed = Script::from_toml_file(&script)?;
            tracing::info!(
                script = %script.display(),
                steps = parsed.steps.len(),
                owner = %owner,
                "replaying script"
            );
            let report = script::replay(parsed, owner, config.params.clone())?;
            tracing::info!(
                applied = report.applied,
                rejected = report.rejected,
                events = report.events,
                "replay finished"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Hash {
            poll,
            votes,
            candidate,
            salt,
            salt_from,
        } => {
            let salt = match (salt, salt_from) {
                (Some(salt), _) => salt,
                (None, Some(account)) => qvote_crypto::derive_salt(&AccountId::new(account)?),
                (None, None) => anyhow::bail!("either --salt or --salt-from is required"),
            };
            let hash = qvote_crypto::commitment_hash(
                PollId::new(poll),
                votes,
                CandidateId::new(candidate),
                &salt,
            );
            println!("salt: {}", salt.to_hex());
            println!("hash: {}", hash.to_hex());
        }
        Command::Phase {
            start_commit,
            start_reveal,
            at,
        } => {
            let now = at.map(Timestamp::new).unwrap_or_else(|| SystemClock.now());
            let schedule = PhaseSchedule::new(
                Timestamp::new(start_commit),
                Timestamp::new(start_reveal),
                Timestamp::EPOCH,
                config.params.max_schedule_secs,
            )?;
            println!("phase: {}", derive_phase(now, &schedule));
            println!("window: {}", format_duration(schedule.window_secs()));
            if let Some(next) = schedule.next_boundary(now) {
                println!(
                    "next boundary: {} (in {})",
                    next,
                    format_duration(next.remaining_from(now))
                );
            }
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
