// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-boxed store calls.
//!
//! Reads are simply abandoned when their budget runs out. Writes carry a
//! [`Deadline`] that the store checks before committing; once it has passed
//! the store either rolls back or reports a commit that was already under
//! way, so the write path waits a short grace period for that answer
//! instead of guessing.

use std::future::Future;
use std::time::Duration;

use showing_core::{Deadline, ShowingError};
use tracing::warn;

/// How long a write may keep running past its deadline to report whether
/// its commit landed.
pub const COMMIT_GRACE: Duration = Duration::from_secs(2);

/// Budget shared by every store and directory call the engine makes.
#[derive(Debug, Clone, Copy)]
pub struct StoreTimeout {
    budget: Duration,
}

impl StoreTimeout {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Per-call budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// A fresh deadline for a write the store must not commit after.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.budget)
    }

    /// Await `call`, failing with a retryable timeout once the budget is spent.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, ShowingError>
    where
        F: Future<Output = Result<T, ShowingError>>,
    {
        match tokio::time::timeout(self.budget, call).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(
                    operation,
                    timeout_ms = self.budget.as_millis() as u64,
                    "store call timed out"
                );
                Err(ShowingError::Timeout {
                    duration: self.budget,
                })
            }
        }
    }

    /// Await a write bounded by `deadline`.
    ///
    /// The store decides the outcome: a write that is still pending when the
    /// deadline passes gets [`COMMIT_GRACE`] to either roll back (a
    /// `Timeout` from the store) or confirm a commit that started in time,
    /// which is returned as a success. Only a store that stays silent through
    /// the grace period is reported as timed out here.
    pub async fn run_write<T, F>(
        &self,
        operation: &'static str,
        deadline: Deadline,
        call: F,
    ) -> Result<T, ShowingError>
    where
        F: Future<Output = Result<T, ShowingError>>,
    {
        let mut call = std::pin::pin!(call);
        if let Ok(result) = tokio::time::timeout(deadline.remaining(), call.as_mut()).await {
            return result;
        }
        match tokio::time::timeout(COMMIT_GRACE, call).await {
            Ok(Ok(value)) => {
                warn!(operation, "write committed at its deadline");
                Ok(value)
            }
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => {
                warn!(
                    operation,
                    timeout_ms = deadline.budget().as_millis() as u64,
                    "store write did not answer within its grace period"
                );
                Err(ShowingError::Timeout {
                    duration: deadline.budget(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let timeout = StoreTimeout::new(Duration::from_millis(50));
        let err = timeout
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<(), ShowingError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ShowingError::Timeout { duration } if duration == Duration::from_millis(50)));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn write_committing_at_the_deadline_reports_success() {
        let timeout = StoreTimeout::new(Duration::from_millis(50));
        let deadline = timeout.deadline();
        let value = timeout
            .run_write("create", deadline, async {
                tokio::time::sleep(Duration::from_millis(80)).await;
                Ok::<_, ShowingError>(11)
            })
            .await
            .unwrap();
        assert_eq!(value, 11, "a commit that landed must not be reported as a timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn write_rolled_back_by_the_store_surfaces_its_timeout() {
        let timeout = StoreTimeout::new(Duration::from_millis(50));
        let deadline = timeout.deadline();
        let err = timeout
            .run_write("create", deadline, async move {
                tokio::time::sleep(Duration::from_millis(60)).await;
                Err::<(), _>(ShowingError::Timeout {
                    duration: deadline.budget(),
                })
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_write_times_out_after_grace() {
        let timeout = StoreTimeout::new(Duration::from_millis(50));
        let started = tokio::time::Instant::now();
        let err = timeout
            .run_write(
                "create",
                timeout.deadline(),
                std::future::pending::<Result<(), ShowingError>>(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ShowingError::Timeout { duration } if duration == Duration::from_millis(50)));
        assert!(started.elapsed() >= COMMIT_GRACE);
    }

    #[tokio::test]
    async fn fast_call_passes_result_through() {
        let timeout = StoreTimeout::new(Duration::from_secs(1));
        let value = timeout.run("fast", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = timeout
            .run("failing", async {
                Err::<(), _>(ShowingError::Validation("bad".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ShowingError::Validation(_)));
    }
}
