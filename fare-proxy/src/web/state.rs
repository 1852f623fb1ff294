//! Application state for the web layer.

use std::sync::Arc;

use crate::config::{ConfigError, ProxyConfig};
use crate::decode::CandidateList;
use crate::upstream::FareFetcher;

/// Shared application state.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Proxy configuration
    pub config: Arc<ProxyConfig>,

    /// Candidate encodings resolved from the config
    pub candidates: Arc<CandidateList>,

    /// Outbound fare fetcher
    pub fetcher: Arc<dyn FareFetcher>,
}

impl AppState {
    /// Create a new app state, resolving the configured encodings.
    pub fn new(config: ProxyConfig, fetcher: Arc<dyn FareFetcher>) -> Result<Self, ConfigError> {
        let candidates = config.candidate_list()?;
        Ok(Self::with_candidates(config, candidates, fetcher))
    }

    /// Create a new app state with an explicit candidate list.
    pub fn with_candidates(
        config: ProxyConfig,
        candidates: CandidateList,
        fetcher: Arc<dyn FareFetcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            candidates: Arc::new(candidates),
            fetcher,
        }
    }
}
