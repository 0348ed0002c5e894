//! Caller-supplied scan deadline.

use std::time::{Duration, Instant};

use crate::error::{ScanError, ScanResult};

/// A deadline threaded through every scan task.
///
/// `check` is the only cancellation point: it is evaluated between row
/// reads, so a single slow read can overrun the deadline before expiry is
/// detected. Cancellation is cooperative, never preemptive.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; `check` always passes.
    pub fn none() -> Self {
        Self(None)
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    /// From optional configuration.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(t) => Self::after(t),
            None => Self::none(),
        }
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        matches!(self.0, Some(at) if Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded` if the deadline has passed.
    ///
    /// `context` names the work in progress and only renders on expiry.
    pub fn check(&self, context: &str) -> ScanResult<()> {
        if self.expired() {
            return Err(ScanError::DeadlineExceeded {
                context: context.to_string(),
            });
        }
        Ok(())
    }
}
