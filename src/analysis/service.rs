//! Submission coordinator: one call drives the whole lifecycle.
//!
//! `analyze` owns a single job from multipart upload through polling to a
//! terminal state, recording every transition in the shared `JobTracker`.
//! Submissions are independent of each other; there is no cross-job state
//! and no cancellation — a started loop runs to completion, error, or
//! attempt-budget exhaustion.

use std::sync::Arc;

use uuid::Uuid;

use super::backend::AnalysisBackend;
use super::error::AnalysisError;
use super::job::{JobState, JobTracker};
use super::poller::{poll_until_complete, PollConfig};
use super::progress::ProgressObserver;

pub struct AnalysisService {
    backend: Arc<dyn AnalysisBackend>,
    tracker: Arc<JobTracker>,
    poll: PollConfig,
}

impl AnalysisService {
    pub fn new(backend: Arc<dyn AnalysisBackend>, tracker: Arc<JobTracker>, poll: PollConfig) -> Self {
        Self {
            backend,
            tracker,
            poll,
        }
    }

    /// Submit a PDF and wait for the analysis to finish.
    ///
    /// Resolves with `Ok(())` only when the remote job reported
    /// completion. Every failure mode is typed: submission failures are
    /// re-thrown from the transport layer, a missing task id fails before
    /// the status endpoint is ever called, an exhausted poll budget maps
    /// to the soft `TimedOut`.
    pub async fn analyze(
        &self,
        job_id: Uuid,
        file_name: &str,
        bytes: Vec<u8>,
        observer: &dyn ProgressObserver,
    ) -> Result<(), AnalysisError> {
        self.tracker.ensure(job_id);
        self.tracker.set_state(job_id, JobState::Submitting);
        tracing::info!(document = %job_id, file = file_name, "Submitting PDF for analysis");

        let receipt = match self.backend.submit(file_name, bytes).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(job_id, e)),
        };

        let task_id = match receipt.task_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(self.fail(job_id, AnalysisError::MissingTaskId)),
        };

        self.tracker.set_task(job_id, &task_id);
        self.tracker.set_state(job_id, JobState::Polling);
        tracing::info!(document = %job_id, task_id, "Analysis started, polling for completion");

        let tracking = TrackingObserver {
            tracker: self.tracker.as_ref(),
            job_id,
            inner: observer,
        };

        match poll_until_complete(self.backend.as_ref(), &task_id, &tracking, &self.poll).await {
            Ok(true) => {
                self.tracker.set_state(job_id, JobState::Completed);
                Ok(())
            }
            Ok(false) => {
                self.tracker.set_state(job_id, JobState::TimedOut);
                self.tracker.set_error(job_id, &AnalysisError::TimedOut.to_string());
                Err(AnalysisError::TimedOut)
            }
            Err(e) => Err(self.fail(job_id, e)),
        }
    }

    /// Retrieve the finalized structured document. Pure read; assumes the
    /// caller confirmed completion through `analyze`.
    pub async fn fetch_result(&self) -> Result<serde_json::Value, AnalysisError> {
        self.backend.fetch_result().await
    }

    fn fail(&self, job_id: Uuid, error: AnalysisError) -> AnalysisError {
        self.tracker.set_state(job_id, JobState::Failed);
        self.tracker.set_error(job_id, &error.to_string());
        error
    }
}

/// Forwards events to the caller's observer while mirroring them into the
/// job tracker for the HTTP status endpoint.
struct TrackingObserver<'a> {
    tracker: &'a JobTracker,
    job_id: Uuid,
    inner: &'a dyn ProgressObserver,
}

impl ProgressObserver for TrackingObserver<'_> {
    fn on_progress(&self, percent: u8) {
        self.tracker.set_progress(self.job_id, percent);
        self.inner.on_progress(percent);
    }

    fn on_attempt(&self, attempt: u32) {
        self.tracker.record_attempt(self.job_id);
        self.inner.on_attempt(attempt);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::backend::testing::{ScriptedBackend, ScriptedStatus, ScriptedSubmit};
    use super::super::backend::StatusReport;
    use super::super::progress::testing::RecordingObserver;
    use super::super::progress::NullObserver;
    use super::*;

    fn service(backend: ScriptedBackend) -> (AnalysisService, Arc<JobTracker>) {
        let tracker = Arc::new(JobTracker::new());
        let poll = PollConfig {
            max_attempts: 5,
            interval: Duration::from_millis(1),
        };
        (
            AnalysisService::new(Arc::new(backend), tracker.clone(), poll),
            tracker,
        )
    }

    fn pending(progress: f64) -> ScriptedStatus {
        ScriptedStatus::Report(StatusReport {
            status: Some("pending".to_string()),
            progress: Some(progress),
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
    async fn happy_path_completes_and_tracks() {
        let backend =
            ScriptedBackend::new("task-9").with_statuses(vec![pending(40.0), pending(80.0), completed()]);
        let (service, tracker) = service(backend);
        let observer = RecordingObserver::new();
        let id = Uuid::new_v4();

        service.analyze(id, "report.pdf", b"%PDF".to_vec(), &observer).await.unwrap();

        assert_eq!(observer.progress_seen(), vec![40, 80, 100]);
        let job = tracker.snapshot(id).unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.task_id.as_deref(), Some("task-9"));
        assert_eq!(job.attempts, 3);
        assert_eq!(job.progress, Some(100));
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn missing_task_id_never_calls_status() {
        let backend = ScriptedBackend::new("unused").with_submit(ScriptedSubmit::NoTaskId);
        let (service, tracker) = service(backend);
        let id = Uuid::new_v4();

        let result = service
            .analyze(id, "report.pdf", b"%PDF".to_vec(), &NullObserver)
            .await;

        assert!(matches!(result, Err(AnalysisError::MissingTaskId)));
        let job = tracker.snapshot(id).unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.attempts, 0, "status endpoint must not be called");
        assert!(job.error.is_some());
    }

    #[tokio::test]
    async fn empty_task_id_is_treated_as_missing() {
        let backend =
            ScriptedBackend::new("unused").with_submit(ScriptedSubmit::TaskId(String::new()));
        let (service, _tracker) = service(backend);

        let result = service
            .analyze(Uuid::new_v4(), "report.pdf", b"%PDF".to_vec(), &NullObserver)
            .await;

        assert!(matches!(result, Err(AnalysisError::MissingTaskId)));
    }

    #[tokio::test]
    async fn submission_rejection_is_rethrown_verbatim() {
        let backend = ScriptedBackend::new("unused")
            .with_submit(ScriptedSubmit::Fail(413, "file too large".to_string()));
        let (service, tracker) = service(backend);
        let id = Uuid::new_v4();

        let result = service
            .analyze(id, "report.pdf", b"%PDF".to_vec(), &NullObserver)
            .await;

        match result {
            Err(AnalysisError::RequestFailed { status, message }) => {
                assert_eq!(status, 413);
                assert_eq!(message, "file too large");
            }
            other => panic!("Expected RequestFailed, got: {other:?}"),
        }
        assert_eq!(tracker.snapshot(id).unwrap().state, JobState::Failed);
    }

    #[tokio::test]
    async fn connectivity_failure_on_submit() {
        let backend = ScriptedBackend::new("unused").with_submit(ScriptedSubmit::Connectivity);
        let (service, _tracker) = service(backend);

        let result = service
            .analyze(Uuid::new_v4(), "report.pdf", b"%PDF".to_vec(), &NullObserver)
            .await;

        assert!(matches!(result, Err(AnalysisError::Connectivity)));
    }

    #[tokio::test]
    async fn poll_exhaustion_maps_to_timed_out() {
        // Empty status queue: perpetual pending.
        let backend = ScriptedBackend::new("task-9");
        let (service, tracker) = service(backend);
        let id = Uuid::new_v4();

        let result = service
            .analyze(id, "report.pdf", b"%PDF".to_vec(), &NullObserver)
            .await;

        assert!(matches!(result, Err(AnalysisError::TimedOut)));
        let job = tracker.snapshot(id).unwrap();
        assert_eq!(job.state, JobState::TimedOut);
        assert_eq!(job.attempts, 5);
    }

    #[tokio::test]
    async fn embedded_error_maps_to_failed_state() {
        let backend = ScriptedBackend::new("task-9").with_statuses(vec![ScriptedStatus::Report(
            StatusReport {
                status: Some("pending".to_string()),
                progress: None,
                error: Some("corrupt pdf".to_string()),
            },
        )]);
        let (service, tracker) = service(backend);
        let id = Uuid::new_v4();

        let result = service
            .analyze(id, "report.pdf", b"%PDF".to_vec(), &NullObserver)
            .await;

        match result {
            Err(AnalysisError::AnalysisFailed(message)) => assert_eq!(message, "corrupt pdf"),
            other => panic!("Expected AnalysisFailed, got: {other:?}"),
        }
        let job = tracker.snapshot(id).unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert!(job.error.as_deref().unwrap().contains("corrupt pdf"));
    }

    #[tokio::test]
    async fn fetch_result_is_a_pure_repeatable_read() {
        let backend = ScriptedBackend::new("task-9")
            .with_result(serde_json::json!({"costs": [{"label": "Entry", "value": 2.0}]}));
        let (service, _tracker) = service(backend);

        let first = service.fetch_result().await.unwrap();
        let second = service.fetch_result().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn independent_jobs_do_not_share_state() {
        let backend = ScriptedBackend::new("task-a").with_statuses(vec![completed(), completed()]);
        let (service, tracker) = service(backend);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        service
            .analyze(first, "a.pdf", b"%PDF".to_vec(), &NullObserver)
            .await
            .unwrap();
        service
            .analyze(second, "b.pdf", b"%PDF".to_vec(), &NullObserver)
            .await
            .unwrap();

        assert_eq!(tracker.snapshot(first).unwrap().attempts, 1);
        assert_eq!(tracker.snapshot(second).unwrap().attempts, 1);
    }
}
