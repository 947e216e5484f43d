//! Client wiring
//!
//! Builds every client from one [`AppConfig`] so they share a single
//! credential store: a 401 seen by any of them is seen by all.

use std::sync::Arc;

use application::{PlanningQueries, QueryCache};
use backend_api::{ApiClient, ApiError, SharedCredentials};
use doc_intel::{AnalysisError, DocIntelClient};
use thiserror::Error;
use tracing::debug;

use crate::{adapters::BackendAdapter, config::AppConfig};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Backend client: {0}")]
    Backend(#[from] ApiError),

    #[error("Analysis client: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Clients and cached queries for one session
#[derive(Debug, Clone)]
pub struct AppContext {
    pub credentials: SharedCredentials,
    pub api: ApiClient,
    pub analysis: DocIntelClient,
    pub queries: Arc<PlanningQueries>,
}

impl AppContext {
    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        let credentials = config.credential_store();
        let api = ApiClient::new(config.backend.clone(), Arc::clone(&credentials))?;
        let analysis = DocIntelClient::new(config.analysis.clone(), Arc::clone(&credentials))?;

        let adapter = BackendAdapter::new(api.clone()).with_retry(config.retry.clone());
        let queries = PlanningQueries::new(Arc::new(adapter), QueryCache::new(config.cache));

        debug!(
            authenticated = credentials.is_authenticated(),
            "Application context ready"
        );

        Ok(Self {
            credentials,
            api,
            analysis,
            queries: Arc::new(queries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_share_credentials() {
        let context = AppContext::from_config(&AppConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&context.credentials, context.api.credentials()));

        context.credentials.set_token("tok");
        assert!(context.api.credentials().is_authenticated());
    }
}
