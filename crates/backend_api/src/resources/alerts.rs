//! Alerts and the alert inbox

use domain::{
    Alert, BulkActionOutcome, BulkInboxAction, InboxItem, InboxQuery, NewAlert, Page,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::path::encode_segment;
use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct AlertsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn alerts(&self) -> AlertsApi<'_> {
        AlertsApi { client: self }
    }
}

#[derive(Serialize)]
struct EnabledPatch {
    enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnreadCount {
    unread: u64,
}

impl AlertsApi<'_> {
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Alert>, ApiError> {
        self.client.get_json("/alerts").await
    }

    #[instrument(skip(self, alert), fields(name = %alert.name))]
    pub async fn create(&self, alert: &NewAlert) -> Result<Alert, ApiError> {
        alert.validate()?;
        self.client.post_json("/alerts", alert).await
    }

    #[instrument(skip(self, alert))]
    pub async fn update(&self, id: &str, alert: &NewAlert) -> Result<Alert, ApiError> {
        alert.validate()?;
        self.client
            .put_json(&format!("/alerts/{}", encode_segment(id)), alert)
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Alert, ApiError> {
        self.client
            .patch_json(
                &format!("/alerts/{}", encode_segment(id)),
                &EnabledPatch { enabled },
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/alerts/{}", encode_segment(id)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn inbox(&self, query: &InboxQuery) -> Result<Page<InboxItem>, ApiError> {
        query.paging.validate()?;
        self.client
            .get_json_with_query("/alerts/inbox", &query.to_query_pairs())
            .await
    }

    /// Apply one action to many inbox items
    #[instrument(skip(self, action), fields(action = ?action.action, count = action.item_ids.len()))]
    pub async fn apply_bulk(&self, action: &BulkInboxAction) -> Result<BulkActionOutcome, ApiError> {
        if action.item_ids.is_empty() {
            return Err(ApiError::InvalidInput(
                "bulk action needs at least one item".to_string(),
            ));
        }
        self.client.post_json("/alerts/inbox/bulk", action).await
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let count: UnreadCount = self.client.get_json("/alerts/inbox/unread-count").await?;
        Ok(count.unread)
    }
}
