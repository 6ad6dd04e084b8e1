//! Analysis lifecycle client for the remote document-extraction service.
//!
//! The remote service does the actual document understanding; this module
//! drives its job lifecycle from the application side: submit a PDF, poll
//! the status endpoint at a fixed interval, and fetch the structured result
//! once the job reports completion.

pub mod backend;
pub mod document;
pub mod error;
pub mod job;
pub mod poller;
pub mod progress;
pub mod service;

pub use backend::{AnalysisBackend, HttpAnalysisBackend, StatusReport, SubmitReceipt};
pub use document::{AnnualReportMetrics, KidDocument};
pub use error::AnalysisError;
pub use job::{AnalysisJob, JobState, JobTracker};
pub use poller::{poll_until_complete, PollConfig};
pub use progress::{NullObserver, ProgressObserver, TracingObserver};
pub use service::AnalysisService;
