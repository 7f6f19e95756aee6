// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status transitions applied as a compare-and-set on the current status.

use rusqlite::{Connection, params};
use showing_core::{
    Appointment, ConflictSubject, Deadline, QueuePolicy, ShowingError, StatusChange, Transition,
};
use tracing::debug;

use crate::database::Database;
use crate::queries::appointments::fetch;
use crate::queries::logs::{self, LogEntry};
use crate::queries::{conflicts, queue};
use crate::writer::{self, TxResult};

/// Apply `change`, append its log entry and close the queue gap it leaves.
pub async fn transition_appointment(
    db: &Database,
    change: StatusChange,
    policy: QueuePolicy,
    deadline: Deadline,
) -> Result<Appointment, ShowingError> {
    writer::write(db, deadline, move |conn| apply(conn, &change, &policy)).await
}

pub(crate) fn apply(
    conn: &Connection,
    change: &StatusChange,
    policy: &QueuePolicy,
) -> TxResult<Appointment> {
    let Some(current) = fetch(conn, change.appointment_id)? else {
        return Ok(Err(ShowingError::appointment_not_found(change.appointment_id)));
    };
    let transition = change.transition;
    if !transition.permitted_from(current.status) {
        return Ok(Err(ShowingError::InvalidTransition {
            current: current.status,
            attempted: transition.to_string(),
        }));
    }

    let mut next = current.clone();
    let mut remark = None;
    match transition {
        Transition::Accept => {
            let Some(realtor_id) = change.realtor_id else {
                return Ok(Err(ShowingError::Validation(
                    "accepting an appointment requires a realtor".to_string(),
                )));
            };
            if let Some(bound) = current.realtor_id
                && bound != realtor_id
            {
                return Ok(Err(ShowingError::Validation(format!(
                    "appointment {} is assigned to realtor {bound}",
                    current.id
                ))));
            }
            if conflicts::realtor_conflict(conn, realtor_id, &current.window(), Some(current.id))? {
                return Ok(Err(ShowingError::conflict(
                    ConflictSubject::Realtor,
                    format!("realtor {realtor_id} is booked during this appointment"),
                )));
            }
            next.realtor_id = Some(realtor_id);
            next.confirmed_at = Some(change.at);
            remark = Some(format!("accepted by realtor {realtor_id}"));
        }
        Transition::Start | Transition::Complete => {
            let acting = change.realtor_id;
            if acting.is_none() || acting != current.realtor_id {
                return Ok(Err(ShowingError::Validation(format!(
                    "only the assigned realtor may {transition} appointment {}",
                    current.id
                ))));
            }
            if transition == Transition::Complete {
                next.completed_at = Some(change.at);
            }
        }
        Transition::Cancel => {
            next.cancelled_at = Some(change.at);
            next.cancel_reason = change.reason.clone();
            remark = change.reason.clone();
        }
    }
    next.status = transition.target();
    next.queue_position = 0;
    next.estimated_wait_minutes = 0;
    next.updated_at = change.at;

    let updated = conn.execute(
        "UPDATE appointments
         SET realtor_id = ?1, status = ?2, queue_position = 0, estimated_wait_minutes = 0,
             cancel_reason = ?3, confirmed_at = ?4, completed_at = ?5, cancelled_at = ?6,
             updated_at = ?7
         WHERE id = ?8 AND status = ?9",
        params![
            next.realtor_id,
            next.status.to_string(),
            next.cancel_reason,
            next.confirmed_at,
            next.completed_at,
            next.cancelled_at,
            next.updated_at,
            next.id,
            current.status.to_string(),
        ],
    )?;
    if updated != 1 {
        return Ok(Err(ShowingError::Internal(format!(
            "appointment {} changed status underneath a transition",
            current.id
        ))));
    }

    logs::append(
        conn,
        LogEntry {
            appointment_id: current.id,
            old_status: Some(current.status),
            new_status: next.status,
            operator: &change.operator,
            remark,
            at: change.at,
        },
    )?;

    if current.is_queued() {
        queue::renumber(conn, current.store_id, current.appointment_date, policy)?;
    }

    debug!(id = current.id, from = %current.status, to = %next.status, "transition applied");
    Ok(Ok(next))
}
