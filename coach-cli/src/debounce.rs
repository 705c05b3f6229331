//! Trailing-edge debouncing for search input.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Delay between the last keystroke and the search it triggers.
pub(crate) const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the most recent value until it has been quiet for `delay`.
#[derive(Debug)]
pub(crate) struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub(crate) fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value now, skipping the rest of the quiet period.
    pub(crate) fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Resolves with the pending value once its quiet period ends.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: if the future
    /// is dropped early the value stays pending.
    pub(crate) async fn settled(&mut self) -> T {
        let Some((_, deadline)) = self.pending.as_ref() else {
            return std::future::pending().await;
        };
        sleep_until(*deadline).await;
        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}
