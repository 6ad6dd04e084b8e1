//! Error taxonomy for the analysis lifecycle client.
//!
//! Each variant is a distinct user-facing situation; the HTTP layer picks
//! copy and status per variant instead of string-matching messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network unreachable, DNS failure, or connect timeout.
    /// Recoverable by user retry.
    #[error("Cannot reach the analysis service. Check your internet connection and try again.")]
    Connectivity,

    /// The service answered with a non-2xx status. The message is the
    /// server-supplied text, surfaced verbatim.
    #[error("Analysis service rejected the request ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// The submission response carried no task id. Contract violation,
    /// non-retryable.
    #[error("Analysis service did not return a task id")]
    MissingTaskId,

    /// The job itself reported an error. Fatal for this submission.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Attempt budget exhausted without completion. The job may still
    /// finish server-side, so the user is told to check back rather than
    /// resubmit.
    #[error(
        "The analysis is still running. It can take up to 10 minutes; \
         check back later for the result instead of uploading again."
    )]
    TimedOut,

    /// A body that should have been JSON was not.
    #[error("Invalid response from the analysis service: {0}")]
    InvalidResponse(String),
}

impl AnalysisError {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connectivity => "CONNECTIVITY",
            Self::RequestFailed { .. } => "REQUEST_FAILED",
            Self::MissingTaskId => "MISSING_TASK_ID",
            Self::AnalysisFailed(_) => "ANALYSIS_FAILED",
            Self::TimedOut => "ANALYSIS_TIMED_OUT",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}
