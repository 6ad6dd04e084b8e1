//! Job lifecycle state, observable per-document through `JobTracker`.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ═══════════════════════════════════════════
// JobState
// ═══════════════════════════════════════════

/// Lifecycle of one analysis submission.
///
/// `Completed`, `Failed` and `TimedOut` are terminal: no transition leaves
/// them within a single submission. A fresh upload starts a fresh job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "submitting" => Some(Self::Submitting),
            "polling" => Some(Self::Polling),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "timed_out" => Some(Self::TimedOut),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// AnalysisJob
// ═══════════════════════════════════════════

/// Snapshot of one analysis job. Ephemeral — never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisJob {
    pub state: JobState,
    /// Server-issued opaque job identifier, known after submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Last observed progress (0-100). Not required to be monotonic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Status-poll attempts made so far.
    pub attempts: u32,
    /// Terminal error message, present when `state` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl AnalysisJob {
    fn new() -> Self {
        Self {
            state: JobState::Idle,
            task_id: None,
            progress: None,
            attempts: 0,
            error: None,
            started_at: Utc::now(),
        }
    }
}

// ═══════════════════════════════════════════
// JobTracker
// ═══════════════════════════════════════════

/// Observable registry of analysis jobs, keyed by document id.
///
/// The submission coordinator writes state transitions; the HTTP layer
/// reads snapshots to answer progress queries. Mutations on a missing or
/// poisoned entry are dropped rather than panicking — the tracker is
/// observability, not control flow.
pub struct JobTracker {
    jobs: Mutex<HashMap<Uuid, AnalysisJob>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Register a fresh job for a document. Overwrites any previous job
    /// under the same id (a re-upload starts a fresh machine).
    pub fn register(&self, id: Uuid) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.insert(id, AnalysisJob::new());
        }
    }

    /// Register only if absent.
    pub fn ensure(&self, id: Uuid) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.entry(id).or_insert_with(AnalysisJob::new);
        }
    }

    pub fn set_state(&self, id: Uuid, state: JobState) {
        if let Ok(mut jobs) = self.jobs.lock() {
            if let Some(job) = jobs.get_mut(&id) {
                job.state = state;
            }
        }
    }

    pub fn set_task(&self, id: Uuid, task_id: &str) {
        if let Ok(mut jobs) = self.jobs.lock() {
            if let Some(job) = jobs.get_mut(&id) {
                job.task_id = Some(task_id.to_string());
            }
        }
    }

    pub fn set_error(&self, id: Uuid, message: &str) {
        if let Ok(mut jobs) = self.jobs.lock() {
            if let Some(job) = jobs.get_mut(&id) {
                job.error = Some(message.to_string());
            }
        }
    }

    pub fn record_attempt(&self, id: Uuid) {
        if let Ok(mut jobs) = self.jobs.lock() {
            if let Some(job) = jobs.get_mut(&id) {
                job.attempts += 1;
            }
        }
    }

    pub fn set_progress(&self, id: Uuid, percent: u8) {
        if let Ok(mut jobs) = self.jobs.lock() {
            if let Some(job) = jobs.get_mut(&id) {
                job.progress = Some(percent);
            }
        }
    }

    /// Current snapshot of a job, if registered.
    pub fn snapshot(&self, id: Uuid) -> Option<AnalysisJob> {
        self.jobs.lock().ok()?.get(&id).cloned()
    }

    /// Drop a job once its document is removed.
    pub fn remove(&self, id: Uuid) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.remove(&id);
        }
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}
