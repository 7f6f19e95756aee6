// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Showing - property viewing appointment scheduler.
//!
//! Every subcommand opens the configured SQLite database (applying pending
//! migrations), runs one operation and prints its result as JSON on stdout.
//! Diagnostics go to stderr.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod seed;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use showing_config::ShowingConfig;
use showing_core::{Operator, ShowingError, StorageAdapter, SystemClock};
use showing_scheduler::AppointmentManager;
use showing_storage::SqliteStorage;
use tracing::{error, info};

/// Showing - property viewing appointment scheduler.
#[derive(Parser, Debug)]
#[command(name = "showing", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and apply pending migrations.
    Migrate,
    /// Report storage health and the effective configuration.
    Status,
    /// Load stores, agents and working hours from a TOML directory file.
    Seed {
        /// Path to the directory file.
        file: PathBuf,
    },
    /// Book a viewing.
    Book(commands::BookArgs),
    /// An agent claims a pending appointment.
    Accept {
        id: i64,
        #[arg(long)]
        realtor: i64,
    },
    /// The assigned agent starts the viewing.
    Start {
        id: i64,
        #[arg(long)]
        realtor: i64,
    },
    /// The assigned agent finishes the viewing.
    Complete {
        id: i64,
        #[arg(long)]
        realtor: i64,
    },
    /// Cancel a pending or confirmed appointment.
    Cancel {
        id: i64,
        /// Who cancels: `customer:<id>`, `realtor:<id>`, `store:<id>` or `system`.
        #[arg(long, default_value = "system", value_parser = commands::parse_operator)]
        by: Operator,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show one appointment by id or by code.
    Show {
        #[arg(long, required_unless_present = "code", conflicts_with = "code")]
        id: Option<i64>,
        #[arg(long)]
        code: Option<String>,
    },
    /// List appointments of a customer, an agent or a store.
    #[command(subcommand)]
    List(commands::ListTarget),
    /// Bookable slots of a store.
    Slots {
        #[arg(long)]
        store: i64,
        /// First date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Appointments waiting for an agent.
    Queue {
        #[arg(long)]
        store: i64,
        #[arg(long)]
        date: Option<String>,
        /// Only count entries starting at this time (HH:MM).
        #[arg(long)]
        time: Option<String>,
    },
    /// Audit trail of an appointment.
    Logs { id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => showing_config::load_and_validate_path(path),
        None => showing_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            showing_config::render_errors(&errors);
            return ExitCode::from(1);
        }
    };

    init_tracing(&config.service.log_level);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(command: Commands, config: ShowingConfig) -> Result<(), ShowingError> {
    let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);
    info!(
        service = %config.service.name,
        database = %config.storage.database_path,
        "storage ready"
    );

    let manager = AppointmentManager::new(
        storage.clone(),
        storage.clone(),
        Arc::new(SystemClock),
        &config,
    );
    let result = dispatch(command, &config, &storage, &manager).await;

    if let Err(e) = storage.close().await {
        error!(error = %e, "failed to close storage");
    }
    result
}

async fn dispatch(
    command: Commands,
    config: &ShowingConfig,
    storage: &SqliteStorage,
    manager: &AppointmentManager,
) -> Result<(), ShowingError> {
    match command {
        Commands::Migrate => status::run_migrate(config),
        Commands::Status => status::run_status(config, storage).await,
        Commands::Seed { file } => seed::run_seed(storage, &file).await,
        Commands::Book(args) => commands::book(manager, args).await,
        Commands::Accept { id, realtor } => {
            commands::print_json(&manager.accept_appointment(id, realtor).await?)
        }
        Commands::Start { id, realtor } => {
            commands::print_json(&manager.start_appointment(id, realtor).await?)
        }
        Commands::Complete { id, realtor } => {
            commands::print_json(&manager.complete_appointment(id, realtor).await?)
        }
        Commands::Cancel { id, by, reason } => {
            commands::print_json(&manager.cancel_appointment(id, by, reason).await?)
        }
        Commands::Show { id, code } => commands::show(manager, id, code).await,
        Commands::List(target) => commands::list(manager, target).await,
        Commands::Slots { store, date, days } => {
            commands::slots(manager, store, date.as_deref(), days).await
        }
        Commands::Queue { store, date, time } => {
            commands::queue(manager, store, date.as_deref(), time.as_deref()).await
        }
        Commands::Logs { id } => commands::print_json(&manager.appointment_logs(id).await?),
    }
}

/// Process exit status for a failed command.
///
/// Distinct codes let scripts tell rejected requests from infrastructure
/// failures worth retrying.
fn exit_code(error: &ShowingError) -> u8 {
    match error {
        ShowingError::Validation(_) | ShowingError::Config(_) => 2,
        ShowingError::Conflict { .. } => 3,
        ShowingError::NotFound { .. } => 4,
        ShowingError::InvalidTransition { .. } => 5,
        ShowingError::Storage { .. } | ShowingError::Timeout { .. } => 75,
        ShowingError::Internal(_) => 1,
    }
}

/// Initialize the tracing subscriber with an env-filter.
///
/// Logs go to stderr so stdout carries only command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("showing={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn cancel_parses_operator() {
        let cli = Cli::try_parse_from(["showing", "cancel", "7", "--by", "customer:42"]).unwrap();
        match cli.command {
            Commands::Cancel { id, by, reason } => {
                assert_eq!(id, 7);
                assert_eq!(by, Operator::customer(42));
                assert!(reason.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_id_or_code() {
        assert!(Cli::try_parse_from(["showing", "show"]).is_err());
        assert!(Cli::try_parse_from(["showing", "show", "--id", "1", "--code", "ABC"]).is_err());
        assert!(Cli::try_parse_from(["showing", "show", "--code", "ABC234"]).is_ok());
    }

    #[test]
    fn rejections_and_outages_exit_differently() {
        assert_eq!(exit_code(&ShowingError::Validation("x".into())), 2);
        assert_eq!(
            exit_code(&ShowingError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }),
            75
        );
        assert_eq!(exit_code(&ShowingError::appointment_not_found(1)), 4);
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = showing_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.service.name, "showing");
    }
}
