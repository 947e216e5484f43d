//! Planning backend port
//!
//! The reads and mutations the query layer caches. Everything else the
//! backend offers is reached through the API client directly.

use async_trait::async_trait;
use domain::{
    Alert, ApplicationQuery, ApplicationSummary, BulkActionOutcome, BulkInboxAction, InboxItem,
    InboxQuery, NewAlert, Page, PlanningApplication, ZoningInfo,
};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the planning backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlanningBackendPort: Send + Sync {
    async fn search_applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Page<ApplicationSummary>, ApplicationError>;

    async fn get_application(&self, id: &str) -> Result<PlanningApplication, ApplicationError>;

    async fn list_alerts(&self) -> Result<Vec<Alert>, ApplicationError>;

    async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, ApplicationError>;

    async fn delete_alert(&self, id: &str) -> Result<(), ApplicationError>;

    async fn inbox(&self, query: &InboxQuery) -> Result<Page<InboxItem>, ApplicationError>;

    async fn apply_bulk(
        &self,
        action: &BulkInboxAction,
    ) -> Result<BulkActionOutcome, ApplicationError>;

    async fn unread_count(&self) -> Result<u64, ApplicationError>;

    /// Zoning at a point; coordinates are validated by the implementation
    async fn zoning_at(&self, latitude: f64, longitude: f64)
    -> Result<ZoningInfo, ApplicationError>;
}
