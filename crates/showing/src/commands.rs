// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment subcommands: argument types and JSON-printing handlers.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use showing_core::{Clock, Operator, OperatorType, ShowingError, SystemClock};
use showing_scheduler::validation::{parse_date, parse_time};
use showing_scheduler::{AppointmentManager, BookingRequest};

/// Arguments of `showing book`.
#[derive(Args, Debug)]
pub struct BookArgs {
    #[arg(long)]
    pub user: i64,
    #[arg(long)]
    pub store: i64,
    /// Ask for a specific agent.
    #[arg(long)]
    pub realtor: Option<i64>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// HH:MM
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub duration: u32,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub requirements: Option<String>,
}

impl From<BookArgs> for BookingRequest {
    fn from(args: BookArgs) -> Self {
        Self {
            user_id: args.user,
            store_id: args.store,
            realtor_id: args.realtor,
            appointment_date: args.date,
            start_time: args.time,
            duration_minutes: args.duration,
            customer_name: args.name,
            customer_phone: args.phone,
            requirements: args.requirements,
        }
    }
}

/// Whose appointments `showing list` shows.
#[derive(Subcommand, Debug)]
pub enum ListTarget {
    /// A customer's appointments, newest first.
    User {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// An agent's appointments on one date.
    Realtor {
        id: i64,
        #[arg(long)]
        date: Option<String>,
    },
    /// A store's appointments on one date.
    Store {
        id: i64,
        #[arg(long)]
        date: Option<String>,
    },
}

/// Parse `customer:<id>`, `realtor:<id>`, `store:<id>` or `system`.
pub fn parse_operator(raw: &str) -> Result<Operator, String> {
    let (kind, id) = match raw.split_once(':') {
        Some((kind, id)) => {
            let id = id
                .parse::<i64>()
                .map_err(|_| format!("operator id `{id}` is not a number"))?;
            (kind, Some(id))
        }
        None => (raw, None),
    };
    let kind: OperatorType = kind
        .parse()
        .map_err(|_| format!("unknown operator type `{kind}`"))?;
    match (kind, id) {
        (OperatorType::System, None) => Ok(Operator::system()),
        (OperatorType::System, Some(_)) => Err("the system operator takes no id".to_string()),
        (kind, Some(id)) => Ok(Operator { kind, id: Some(id) }),
        (kind, None) => Err(format!("operator `{kind}` needs an id, as in `{kind}:42`")),
    }
}

/// Serialize `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), ShowingError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| ShowingError::Internal(format!("failed to serialize output: {e}")))?;
    println!("{out}");
    Ok(())
}

fn date_or_today(raw: Option<&str>) -> Result<NaiveDate, ShowingError> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(SystemClock.local_now().date()),
    }
}

pub async fn book(manager: &AppointmentManager, args: BookArgs) -> Result<(), ShowingError> {
    let appointment = manager.create_appointment(args.into()).await?;
    print_json(&appointment)
}

pub async fn show(
    manager: &AppointmentManager,
    id: Option<i64>,
    code: Option<String>,
) -> Result<(), ShowingError> {
    let appointment = match (id, code) {
        (Some(id), _) => manager.get_appointment(id).await?,
        (None, Some(code)) => manager.get_appointment_by_code(&code).await?,
        (None, None) => {
            return Err(ShowingError::Validation(
                "either --id or --code is required".to_string(),
            ));
        }
    };
    print_json(&appointment)
}

pub async fn list(manager: &AppointmentManager, target: ListTarget) -> Result<(), ShowingError> {
    match target {
        ListTarget::User {
            id,
            page,
            page_size,
        } => print_json(&manager.list_user_appointments(id, page, page_size).await?),
        ListTarget::Realtor { id, date } => {
            let date = date_or_today(date.as_deref())?;
            print_json(&manager.list_realtor_appointments(id, date).await?)
        }
        ListTarget::Store { id, date } => {
            let date = date_or_today(date.as_deref())?;
            print_json(&manager.list_store_appointments(id, date).await?)
        }
    }
}

pub async fn slots(
    manager: &AppointmentManager,
    store: i64,
    date: Option<&str>,
    days: u32,
) -> Result<(), ShowingError> {
    let start = date_or_today(date)?;
    print_json(&manager.available_slots(store, start, days).await?)
}

#[derive(Serialize)]
struct QueueCount {
    store_id: i64,
    date: NaiveDate,
    start_time: String,
    count: u32,
}

pub async fn queue(
    manager: &AppointmentManager,
    store: i64,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<(), ShowingError> {
    let date = date_or_today(date)?;
    match time {
        Some(raw) => {
            let start = parse_time(raw)?;
            let count = manager.queue_count(store, date, start).await?;
            print_json(&QueueCount {
                store_id: store,
                date,
                start_time: start.format("%H:%M").to_string(),
                count,
            })
        }
        None => print_json(&manager.queued_appointments(store, date).await?),
    }
}
