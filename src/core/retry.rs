//! Bounded retry for provisioning calls.
//!
//! Bucket and key creation retry a fixed number of times and then give up,
//! so a persistent infrastructure failure surfaces as a worker exit instead
//! of being masked by an endless retry loop. The budget is configuration
//! (default 3 attempts).

use std::fmt;
use std::future::Future;
use thiserror::Error;

/// All attempts of a budgeted operation failed.
///
/// Carries the final attempt's error so the caller can report the cause.
#[derive(Debug, Error)]
#[error("retry budget of {attempts} attempts exhausted: {last}")]
pub struct Exhausted<E>
where
    E: fmt::Display + fmt::Debug,
{
    /// Number of attempts made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last: E,
}

/// Run `op` up to `budget` times, returning the first success.
///
/// Failed attempts are logged at warn level. When every attempt fails the
/// typed [`Exhausted`] result carries the last error; the caller decides
/// whether that is fatal.
pub async fn with_budget<T, E, F, Fut>(budget: u32, mut op: F) -> Result<T, Exhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display + fmt::Debug,
{
    debug_assert!(budget > 0, "retry budget must be at least one attempt");
    let mut last = None;
    for attempt in 1..=budget.max(1) {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                tracing::warn!(attempt, budget, error = %error, "attempt failed");
                last = Some(error);
            }
        }
    }
    // `last` is always set here: the loop runs at least once and only
    // falls through on Err.
    match last {
        Some(last) => Err(Exhausted {
            attempts: budget.max(1),
            last,
        }),
        None => unreachable!("budgeted loop exited without recording an error"),
    }
}
