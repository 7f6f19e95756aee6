// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-supplied deadlines for store calls.

use std::time::{Duration, Instant};

/// The point in time by which a store call must finish.
///
/// Write transactions check the deadline before starting and again right
/// before committing, rolling back once it has passed. A write that passes
/// the second check commits even if the caller's deadline elapses during the
/// commit itself, so callers must wait for the store's answer rather than
/// report a timeout on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// The total time allowed when the deadline was created.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_already_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[test]
    fn generous_budget_is_not_expired() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(!deadline.expired());
        assert!(deadline.remaining() > Duration::from_secs(30));
        assert_eq!(deadline.budget(), Duration::from_secs(60));
    }
}
