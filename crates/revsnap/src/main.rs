//! Revsnap command line entry point.
//!
//! Commands run on their own current-thread runtime; nothing here keeps
//! a server alive. JSON-mode failures go to stdout as a structured
//! error object so scripted callers never have to scrape stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "revsnap",
    about = "Hotel revenue forecast snapshot registry",
    version
)]
struct Cli {
    /// Enable verbose logging on stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage hotels and their routing addresses
    Hotel {
        #[command(subcommand)]
        action: cli::hotel::HotelAction,
    },
    /// Run or watch the mailbox ingestion cycle
    Cycle {
        #[command(subcommand)]
        action: cli::cycle::CycleAction,
    },
    /// Register one-time seed history files
    Seed {
        #[command(subcommand)]
        action: cli::seed::SeedAction,
    },
    /// Compare snapshots: pickup, actuals, stly
    Compare(cli::compare::CompareArgs),
    /// Inspect registered snapshots
    Snapshot {
        #[command(subcommand)]
        action: cli::snapshot::SnapshotAction,
    },
    /// Browse the processed-mail audit log
    Mail {
        #[command(subcommand)]
        action: cli::mail::MailAction,
    },
    /// Show registry-wide ingest statistics
    Status(cli::status::StatusArgs),
    /// Show current configuration and paths
    Config(cli::config::ConfigArgs),
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Hotel { action } => hotel_action_wants_json(action),
        Commands::Cycle { action } => cycle_action_wants_json(action),
        Commands::Seed { action } => seed_action_wants_json(action),
        Commands::Compare(args) => args.json,
        Commands::Snapshot { action } => snapshot_action_wants_json(action),
        Commands::Mail { action } => mail_action_wants_json(action),
        Commands::Status(args) => args.json,
        Commands::Config(args) => args.json,
    }
}

fn hotel_action_wants_json(action: &cli::hotel::HotelAction) -> bool {
    match action {
        cli::hotel::HotelAction::Add { json, .. } => *json,
        cli::hotel::HotelAction::List { json, .. } => *json,
        cli::hotel::HotelAction::Show { json, .. } => *json,
        _ => false,
    }
}

fn cycle_action_wants_json(action: &cli::cycle::CycleAction) -> bool {
    match action {
        cli::cycle::CycleAction::Run { json, .. } => *json,
        _ => false,
    }
}

fn seed_action_wants_json(action: &cli::seed::SeedAction) -> bool {
    match action {
        cli::seed::SeedAction::Register { json, .. } => *json,
    }
}

fn snapshot_action_wants_json(action: &cli::snapshot::SnapshotAction) -> bool {
    match action {
        cli::snapshot::SnapshotAction::List { json, .. } => *json,
        cli::snapshot::SnapshotAction::Show { json, .. } => *json,
        _ => false,
    }
}

fn mail_action_wants_json(action: &cli::mail::MailAction) -> bool {
    match action {
        cli::mail::MailAction::Log { json, .. } => *json,
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Hotel { action } => cli::hotel::run(action),
        Commands::Cycle { action } => cli::cycle::run(action),
        Commands::Seed { action } => cli::seed::run(action),
        Commands::Compare(args) => cli::compare::run(args),
        Commands::Snapshot { action } => cli::snapshot::run(action),
        Commands::Mail { action } => cli::mail::run(action),
        Commands::Status(args) => cli::status::run(args),
        Commands::Config(args) => cli::config::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    if let Err(err) = logging::init_logging(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {err:#}");
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{err:?}");
            }
            ExitCode::from(1)
        }
    }
}
