//! Progress reporting seam.
//!
//! An explicit observer interface instead of optional callback parameters:
//! the poller pushes attempt and progress events, implementations decide
//! what to do with them. Values are forwarded as reported by the service
//! and are not required to be monotonic — debouncing is the consumer's
//! responsibility.

/// Receives lifecycle events from the status poller.
pub trait ProgressObserver: Send + Sync {
    /// A progress report, 0-100. Invoked at most once per poll attempt,
    /// plus exactly once with `100` when the job completes.
    fn on_progress(&self, percent: u8);

    /// A poll attempt is starting (1-based).
    fn on_attempt(&self, _attempt: u32) {}
}

/// Discards all events.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _percent: u8) {}
}

/// Logs progress through `tracing`.
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, percent: u8) {
        tracing::info!(percent, "Analysis progress");
    }

    fn on_attempt(&self, attempt: u32) {
        tracing::debug!(attempt, "Checking analysis status");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingObserver;
    use super::*;

    #[test]
    fn null_observer_accepts_events() {
        let observer = NullObserver;
        observer.on_progress(50);
        observer.on_attempt(1);
    }

    #[test]
    fn recording_observer_captures_sequence() {
        let observer = RecordingObserver::new();
        observer.on_attempt(1);
        observer.on_progress(40);
        observer.on_attempt(2);
        observer.on_progress(80);
        assert_eq!(observer.progress_seen(), vec![40, 80]);
        assert_eq!(observer.attempts_seen(), vec![1, 2]);
    }
}
