// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline-bounded write transactions.
//!
//! All writes in showing-storage are serialized through `tokio-rusqlite`'s
//! single background thread and run inside `BEGIN IMMEDIATE`, so a
//! check-then-write sequence (conflict re-check, agent binding, queue
//! allocation) cannot interleave with another writer.
//!
//! Closures return `Ok(Err(_))` for a domain rejection. The transaction is
//! dropped without committing, which rolls it back.
//!
//! The deadline check in here decides whether a write lands. A caller whose
//! own timer fires first keeps waiting for this answer, since the commit may
//! already be under way.

use rusqlite::{Connection, TransactionBehavior};
use showing_core::{Deadline, ShowingError};
use tracing::warn;

use crate::database::{Database, map_tr_err};

/// Outcome of work done inside a write transaction.
pub(crate) type TxResult<T> = Result<Result<T, ShowingError>, rusqlite::Error>;

/// Run `work` in an immediate transaction and commit only if `deadline` holds.
pub(crate) async fn write<T, F>(db: &Database, deadline: Deadline, work: F) -> Result<T, ShowingError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> TxResult<T> + Send + 'static,
{
    db.connection()
        .call(move |conn| -> TxResult<T> {
            if deadline.expired() {
                return Ok(Err(timed_out(deadline)));
            }
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let value = match work(&tx)? {
                Ok(value) => value,
                Err(rejected) => return Ok(Err(rejected)),
            };
            if deadline.expired() {
                tx.rollback()?;
                return Ok(Err(timed_out(deadline)));
            }
            tx.commit()?;
            Ok(Ok(value))
        })
        .await
        .map_err(map_tr_err)?
}

fn timed_out(deadline: Deadline) -> ShowingError {
    warn!(budget = ?deadline.budget(), "write abandoned past its deadline");
    ShowingError::Timeout {
        duration: deadline.budget(),
    }
}
