//! Backend adapter - Implements PlanningBackendPort using backend_api

use application::{ApplicationError, ports::PlanningBackendPort};
use async_trait::async_trait;
use backend_api::{ApiClient, ApiError};
use domain::{
    Alert, ApplicationQuery, ApplicationSummary, BulkActionOutcome, BulkInboxAction, InboxItem,
    InboxQuery, NewAlert, Page, PlanningApplication, ZoningInfo,
};
use tracing::{debug, instrument};

use crate::retry::{RetryConfig, retry};

/// Adapter over the backend REST client
///
/// Reads are retried on transient failures; mutations are sent once.
#[derive(Debug, Clone)]
pub struct BackendAdapter {
    client: ApiClient,
    retry: RetryConfig,
}

impl BackendAdapter {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Convert backend API errors to application errors
    fn map_error(err: ApiError) -> ApplicationError {
        match err {
            ApiError::ConnectionFailed(e) | ApiError::RequestFailed(e) => {
                ApplicationError::ExternalService(e)
            },
            ApiError::Unauthorized => ApplicationError::Unauthorized,
            ApiError::NotFound(what) => ApplicationError::NotFound(what),
            ApiError::RateLimited => ApplicationError::RateLimited,
            err @ (ApiError::ServerError { .. } | ApiError::Timeout) => {
                ApplicationError::ExternalService(err.to_string())
            },
            ApiError::InvalidResponse(e) => ApplicationError::Internal(e),
            ApiError::InvalidInput(e) => ApplicationError::InvalidInput(e),
        }
    }
}

#[async_trait]
impl PlanningBackendPort for BackendAdapter {
    #[instrument(skip(self, query))]
    async fn search_applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Page<ApplicationSummary>, ApplicationError> {
        let page = retry(&self.retry, || async move {
            self.client.applications().search(query).await
        })
        .await
        .map_err(Self::map_error)?;
        debug!(total = page.total, returned = page.items.len(), "Search complete");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get_application(&self, id: &str) -> Result<PlanningApplication, ApplicationError> {
        retry(&self.retry, || async move {
            self.client.applications().get(id).await
        })
        .await
        .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn list_alerts(&self) -> Result<Vec<Alert>, ApplicationError> {
        retry(&self.retry, || async move { self.client.alerts().list().await })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, alert), fields(name = %alert.name))]
    async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, ApplicationError> {
        self.client
            .alerts()
            .create(alert)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn delete_alert(&self, id: &str) -> Result<(), ApplicationError> {
        self.client
            .alerts()
            .delete(id)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, query))]
    async fn inbox(&self, query: &InboxQuery) -> Result<Page<InboxItem>, ApplicationError> {
        retry(&self.retry, || async move {
            self.client.alerts().inbox(query).await
        })
        .await
        .map_err(Self::map_error)
    }

    #[instrument(skip(self, action), fields(action = ?action.action, count = action.item_ids.len()))]
    async fn apply_bulk(
        &self,
        action: &BulkInboxAction,
    ) -> Result<BulkActionOutcome, ApplicationError> {
        self.client
            .alerts()
            .apply_bulk(action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn unread_count(&self) -> Result<u64, ApplicationError> {
        retry(&self.retry, || async move {
            self.client.alerts().unread_count().await
        })
        .await
        .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn zoning_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ZoningInfo, ApplicationError> {
        retry(&self.retry, || async move {
            self.client.zoning().at_point(latitude, longitude).await
        })
        .await
        .map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_error_connection_failed() {
        let err = ApiError::ConnectionFailed("refused".into());
        let app_err = BackendAdapter::map_error(err);
        assert!(matches!(app_err, ApplicationError::ExternalService(_)));
    }

    #[test]
    fn map_error_unauthorized() {
        let app_err = BackendAdapter::map_error(ApiError::Unauthorized);
        assert!(matches!(app_err, ApplicationError::Unauthorized));
    }

    #[test]
    fn map_error_server_error_keeps_status() {
        let app_err = BackendAdapter::map_error(ApiError::ServerError {
            status: 502,
            message: "bad gateway".into(),
        });
        assert!(
            matches!(app_err, ApplicationError::ExternalService(ref msg) if msg == "Server error (502): bad gateway")
        );
        assert!(app_err.is_retryable());
    }

    #[test]
    fn map_error_invalid_input() {
        let app_err = BackendAdapter::map_error(ApiError::InvalidInput("bad coords".into()));
        assert!(matches!(app_err, ApplicationError::InvalidInput(_)));
        assert!(!app_err.is_retryable());
    }

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackendAdapter>();
    }
}
