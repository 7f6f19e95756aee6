// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Showing appointment engine.

use strum::Display;
use thiserror::Error;

use crate::appointment::AppointmentStatus;

/// Which booked resource a conflict was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConflictSubject {
    /// The customer already holds an overlapping booking.
    Customer,
    /// The agent is already bound to an overlapping booking.
    Realtor,
    /// The generated appointment code is already taken.
    AppointmentCode,
}

/// The primary error type used across all Showing crates.
#[derive(Debug, Error)]
pub enum ShowingError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request is malformed or violates a business rule. User-correctable.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested window overlaps an existing booking.
    #[error("{subject} conflict: {message}")]
    Conflict {
        subject: ConflictSubject,
        message: String,
    },

    /// The appointment is not in a state that permits the requested transition.
    #[error("cannot {attempted} an appointment that is {current}")]
    InvalidTransition {
        current: AppointmentStatus,
        attempted: String,
    },

    /// An entity looked up by id or code does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Storage backend errors (connection failure, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A store call did not finish before its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShowingError {
    /// Whether the caller may retry the whole operation.
    ///
    /// Only infrastructure failures are transient. Retrying a creation is
    /// safe only if the caller deduplicates submissions itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Timeout { .. })
    }

    /// Shorthand for a conflict on `subject`.
    pub fn conflict(subject: ConflictSubject, message: impl Into<String>) -> Self {
        Self::Conflict {
            subject,
            message: message.into(),
        }
    }

    /// Shorthand for a missing appointment.
    pub fn appointment_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity: "appointment",
            key: key.to_string(),
        }
    }
}
