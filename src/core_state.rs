//! Transport-agnostic application state.
//!
//! One `CoreState` instance, wrapped in `Arc` at startup, is shared by
//! every HTTP handler and by the background analysis tasks they spawn.
//! No component reaches for ambient state: the clock, the token store,
//! and the analysis backend are all injected here.

use std::sync::Arc;

use crate::analysis::{
    AnalysisService, HttpAnalysisBackend, JobTracker, PollConfig,
};
use crate::auth::{AuthService, MemoryTokenStore, SystemClock};
use crate::config::AppConfig;
use crate::documents::DocumentRegistry;

pub struct CoreState {
    pub config: AppConfig,
    pub documents: DocumentRegistry,
    pub jobs: Arc<JobTracker>,
    pub analysis: AnalysisService,
    pub auth: AuthService,
}

impl CoreState {
    /// Production wiring: HTTP backend, wall clock, in-memory session.
    pub fn new(config: AppConfig) -> Self {
        let backend = Arc::new(HttpAnalysisBackend::new(&config.api_url, &config.api_key));
        Self::assemble(config, backend, PollConfig::default(), Arc::new(SystemClock))
    }

    fn assemble(
        config: AppConfig,
        backend: Arc<dyn crate::analysis::AnalysisBackend>,
        poll: PollConfig,
        clock: Arc<dyn crate::auth::Clock>,
    ) -> Self {
        let jobs = Arc::new(JobTracker::new());
        let analysis = AnalysisService::new(backend, jobs.clone(), poll);
        let auth = AuthService::new(
            &config.auth_secret,
            &config.username,
            &config.password,
            clock,
            Arc::new(MemoryTokenStore::new()),
        );

        Self {
            config,
            documents: DocumentRegistry::new(),
            jobs,
            analysis,
            auth,
        }
    }

    /// Test wiring: scripted backend, manual clock, fast polling.
    #[cfg(test)]
    pub(crate) fn with_parts(
        config: AppConfig,
        backend: Arc<dyn crate::analysis::AnalysisBackend>,
        poll: PollConfig,
        clock: Arc<dyn crate::auth::Clock>,
    ) -> Self {
        Self::assemble(config, backend, poll, clock)
    }
}
