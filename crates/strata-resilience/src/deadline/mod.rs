//! Request deadlines.

use std::time::Duration;
use tokio::time::Instant;

/// The instant by which a caller needs an answer, if it has one.
///
/// `Copy`, so it can be handed to every store and cache call of one
/// repository operation without cloning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No caller deadline; component defaults apply alone.
    #[must_use]
    pub const fn none() -> Self {
        Self { at: None }
    }

    /// A deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// A deadline at a fixed instant.
    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// Time left, or `None` when there is no deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// True once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// The budget for one call: the smaller of the time left and `default`.
    #[must_use]
    pub fn budget(&self, default: Duration) -> Duration {
        self.remaining().map_or(default, |left| left.min(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_none_uses_default() {
        let deadline = Deadline::none();
        assert_eq!(deadline.remaining(), None);
        assert!(!deadline.is_expired());
        assert_eq!(deadline.budget(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_min_of_remaining_and_default() {
        let deadline = Deadline::after(Duration::from_secs(2));
        assert_eq!(deadline.budget(Duration::from_secs(5)), Duration::from_secs(2));
        assert_eq!(deadline.budget(Duration::from_secs(1)), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let deadline = Deadline::after(Duration::from_millis(100));
        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.budget(Duration::from_secs(5)), Duration::ZERO);
    }
}
