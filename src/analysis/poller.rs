//! Fixed-interval status polling.
//!
//! One loop per submission: check, report progress, sleep, repeat. The
//! interval is fixed — no jitter, no backoff — sized for a human-scale
//! job that takes minutes, and the attempt budget bounds the loop at
//! fifteen minutes by default.

use std::time::Duration;

use super::backend::AnalysisBackend;
use super::error::AnalysisError;
use super::progress::ProgressObserver;

/// Poll cadence and budget. Defaults: every 15 seconds, 60 attempts.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(15),
        }
    }
}

/// Poll the status endpoint until the job completes, fails, or the
/// attempt budget runs out.
///
/// Returns `Ok(true)` on completion, after exactly one terminal
/// `on_progress(100)`. Returns `Ok(false)` when `max_attempts` checks
/// elapse without completion — a terminal outcome, not an error: the job
/// may still finish server-side and the caller decides what to tell the
/// user. A status response with an embedded `error` field aborts
/// immediately with `AnalysisFailed`.
pub async fn poll_until_complete(
    backend: &dyn AnalysisBackend,
    task_id: &str,
    observer: &dyn ProgressObserver,
    config: &PollConfig,
) -> Result<bool, AnalysisError> {
    for attempt in 1..=config.max_attempts {
        observer.on_attempt(attempt);
        tracing::debug!(task_id, attempt, max_attempts = config.max_attempts, "Polling analysis status");

        let report = backend.status(task_id).await?;
        let completed = report.is_completed();

        // Natural progress is forwarded at most once per attempt. The
        // completed response is excluded: its terminal report is the
        // single `100` below, even when the service also sent a number.
        if !completed {
            if let Some(progress) = report.progress {
                observer.on_progress(clamp_percent(progress));
            }
        }

        if let Some(message) = report.error {
            tracing::warn!(task_id, error = %message, "Analysis job reported an error");
            return Err(AnalysisError::AnalysisFailed(message));
        }

        if completed {
            observer.on_progress(100);
            tracing::info!(task_id, attempts = attempt, "Analysis completed");
            return Ok(true);
        }

        // No sleep after the final attempt.
        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    tracing::info!(task_id, attempts = config.max_attempts, "Analysis attempt budget exhausted");
    Ok(false)
}

fn clamp_percent(progress: f64) -> u8 {
    progress.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::super::backend::testing::{ScriptedBackend, ScriptedStatus};
    use super::super::backend::StatusReport;
    use super::super::progress::testing::RecordingObserver;
    use super::*;

    fn fast(max_attempts: u32) -> PollConfig {
        PollConfig {
            max_attempts,
            interval: Duration::from_millis(1),
        }
    }

    fn pending(progress: Option<f64>) -> ScriptedStatus {
        ScriptedStatus::Report(StatusReport {
            status: Some("pending".to_string()),
            progress,
            error: None,
        })
    }

    fn completed() -> ScriptedStatus {
        ScriptedStatus::Report(StatusReport {
            status: Some("completed".to_string()),
            progress: None,
            error: None,
        })
    }

    #[tokio::test]
    async fn happy_path_reports_40_80_100() {
        let backend = ScriptedBackend::new("task-1").with_statuses(vec![
            pending(Some(40.0)),
            pending(Some(80.0)),
            completed(),
        ]);
        let observer = RecordingObserver::new();

        let done = poll_until_complete(&backend, "task-1", &observer, &fast(60))
            .await
            .unwrap();

        assert!(done);
        assert_eq!(observer.progress_seen(), vec![40, 80, 100]);
        assert_eq!(backend.status_calls(), 3);
    }

    #[tokio::test]
    async fn terminal_100_is_emitted_exactly_once_even_when_reported() {
        let backend = ScriptedBackend::new("task-1").with_statuses(vec![
            pending(Some(95.0)),
            ScriptedStatus::Report(StatusReport {
                status: Some("completed".to_string()),
                progress: Some(100.0),
                error: None,
            }),
        ]);
        let observer = RecordingObserver::new();

        let done = poll_until_complete(&backend, "task-1", &observer, &fast(60))
            .await
            .unwrap();

        assert!(done);
        assert_eq!(observer.progress_seen(), vec![95, 100]);
    }

    #[tokio::test]
    async fn embedded_error_stops_after_one_call() {
        let backend = ScriptedBackend::new("task-1").with_statuses(vec![ScriptedStatus::Report(
            StatusReport {
                status: Some("pending".to_string()),
                progress: None,
                error: Some("corrupt pdf".to_string()),
            },
        )]);
        let observer = RecordingObserver::new();

        let result = poll_until_complete(&backend, "task-1", &observer, &fast(60)).await;

        match result {
            Err(AnalysisError::AnalysisFailed(message)) => assert_eq!(message, "corrupt pdf"),
            other => panic!("Expected AnalysisFailed, got: {other:?}"),
        }
        assert_eq!(backend.status_calls(), 1);
        assert!(observer.progress_seen().is_empty());
    }

    #[tokio::test]
    async fn progress_is_forwarded_before_embedded_error() {
        let backend = ScriptedBackend::new("task-1").with_statuses(vec![ScriptedStatus::Report(
            StatusReport {
                status: Some("pending".to_string()),
                progress: Some(30.0),
                error: Some("extraction aborted".to_string()),
            },
        )]);
        let observer = RecordingObserver::new();

        let result = poll_until_complete(&backend, "task-1", &observer, &fast(60)).await;

        assert!(matches!(result, Err(AnalysisError::AnalysisFailed(_))));
        assert_eq!(observer.progress_seen(), vec![30]);
    }

    #[tokio::test]
    async fn exhausted_budget_returns_false_not_error() {
        // Fallback status is a perpetual pending report.
        let backend = ScriptedBackend::new("task-1");
        let observer = RecordingObserver::new();

        let done = poll_until_complete(&backend, "task-1", &observer, &fast(4))
            .await
            .unwrap();

        assert!(!done);
        assert_eq!(backend.status_calls(), 4);
        assert_eq!(observer.attempts_seen(), vec![1, 2, 3, 4]);
        // Progress was forwarded every attempt, never reached 100.
        assert!(observer.progress_seen().iter().all(|p| *p < 100));
    }

    #[tokio::test]
    async fn missing_progress_field_emits_nothing() {
        let backend = ScriptedBackend::new("task-1")
            .with_statuses(vec![pending(None), pending(None), completed()]);
        let observer = RecordingObserver::new();

        let done = poll_until_complete(&backend, "task-1", &observer, &fast(60))
            .await
            .unwrap();

        assert!(done);
        assert_eq!(observer.progress_seen(), vec![100]);
    }

    #[tokio::test]
    async fn non_monotonic_progress_is_forwarded_verbatim() {
        let backend = ScriptedBackend::new("task-1").with_statuses(vec![
            pending(Some(60.0)),
            pending(Some(40.0)),
            completed(),
        ]);
        let observer = RecordingObserver::new();

        poll_until_complete(&backend, "task-1", &observer, &fast(60))
            .await
            .unwrap();

        assert_eq!(observer.progress_seen(), vec![60, 40, 100]);
    }

    #[tokio::test]
    async fn transport_failure_mid_loop_propagates() {
        let backend = ScriptedBackend::new("task-1").with_statuses(vec![
            pending(Some(10.0)),
            ScriptedStatus::Fail(401, "token expired".to_string()),
        ]);
        let observer = RecordingObserver::new();

        let result = poll_until_complete(&backend, "task-1", &observer, &fast(60)).await;

        match result {
            Err(AnalysisError::RequestFailed { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "token expired");
            }
            other => panic!("Expected RequestFailed, got: {other:?}"),
        }
        assert_eq!(backend.status_calls(), 2);
    }

    #[test]
    fn clamp_rounds_and_bounds() {
        assert_eq!(clamp_percent(42.4), 42);
        assert_eq!(clamp_percent(42.5), 43);
        assert_eq!(clamp_percent(-3.0), 0);
        assert_eq!(clamp_percent(250.0), 100);
    }

    #[test]
    fn default_budget_is_fifteen_minutes() {
        let config = PollConfig::default();
        assert_eq!(config.max_attempts, 60);
        assert_eq!(config.interval, Duration::from_secs(15));
    }
}
