//! Cache-aware planning operations

use std::{collections::HashSet, fmt, sync::Arc};

use domain::{
    Alert, ApplicationQuery, ApplicationSummary, BulkActionKind, BulkActionOutcome,
    BulkInboxAction, GeoLocation, InboxItem, InboxQuery, NewAlert, Page, PlanningApplication,
    ZoningInfo,
};
use tracing::{debug, instrument, warn};

use super::{QueryCache, QueryKey};
use crate::{ApplicationError, ports::PlanningBackendPort};

const APPLICATIONS: &str = "applications";
const ALERTS: &str = "alerts";
const INBOX: &str = "inbox";
const ZONING: &str = "zoning";

const INBOX_LIST: &str = "list";
const INBOX_UNREAD_COUNT: &str = "unread-count";
const UNREAD_VIEW: &str = "unread";
const FULL_VIEW: &str = "all";

/// Planning reads and mutations routed through the query cache
pub struct PlanningQueries {
    backend: Arc<dyn PlanningBackendPort>,
    cache: QueryCache,
}

impl fmt::Debug for PlanningQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanningQueries")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl PlanningQueries {
    #[must_use]
    pub fn new(backend: Arc<dyn PlanningBackendPort>, cache: QueryCache) -> Self {
        Self { backend, cache }
    }

    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Page<ApplicationSummary>, ApplicationError> {
        query.validate()?;
        let key = QueryKey::new(APPLICATIONS).with("search").with_params(query)?;
        self.cache
            .fetch(key, || self.backend.search_applications(query))
            .await
    }

    #[instrument(skip(self))]
    pub async fn application(&self, id: &str) -> Result<PlanningApplication, ApplicationError> {
        let key = QueryKey::new(APPLICATIONS).with("detail").with(id);
        self.cache
            .fetch(key, || self.backend.get_application(id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn alerts(&self) -> Result<Vec<Alert>, ApplicationError> {
        self.cache
            .fetch(QueryKey::new(ALERTS), || self.backend.list_alerts())
            .await
    }

    #[instrument(skip(self, query))]
    pub async fn inbox(&self, query: &InboxQuery) -> Result<Page<InboxItem>, ApplicationError> {
        query.paging.validate()?;
        self.cache
            .fetch(inbox_key(query)?, || self.backend.inbox(query))
            .await
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self) -> Result<u64, ApplicationError> {
        let key = QueryKey::new(INBOX).with(INBOX_UNREAD_COUNT);
        self.cache
            .fetch(key, || self.backend.unread_count())
            .await
    }

    #[instrument(skip(self))]
    pub async fn zoning(&self, latitude: f64, longitude: f64) -> Result<ZoningInfo, ApplicationError> {
        let point = GeoLocation::new(latitude, longitude)?;
        let key = QueryKey::new(ZONING)
            .with(format!("{:.5}", point.latitude()))
            .with(format!("{:.5}", point.longitude()));
        self.cache
            .fetch(key, || self.backend.zoning_at(latitude, longitude))
            .await
    }

    #[instrument(skip(self, alert), fields(name = %alert.name))]
    pub async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, ApplicationError> {
        alert.validate()?;
        let created = self.backend.create_alert(alert).await?;
        self.cache.invalidate_prefix(&QueryKey::new(ALERTS)).await;
        Ok(created)
    }

    /// Deleting an alert also drops the inbox items it delivered
    #[instrument(skip(self))]
    pub async fn delete_alert(&self, id: &str) -> Result<(), ApplicationError> {
        self.backend.delete_alert(id).await?;
        self.cache.invalidate_prefix(&QueryKey::new(ALERTS)).await;
        self.cache.invalidate_prefix(&QueryKey::new(INBOX)).await;
        Ok(())
    }

    /// Apply a bulk inbox action with an optimistic cache update
    ///
    /// Cached inbox pages and the unread counter change immediately. If the
    /// backend refuses, they are restored to what they were before the call;
    /// on success the inbox is invalidated so the next read refetches.
    #[instrument(skip(self, action), fields(action = ?action.action, count = action.item_ids.len()))]
    pub async fn apply_bulk(
        &self,
        action: &BulkInboxAction,
    ) -> Result<BulkActionOutcome, ApplicationError> {
        if action.item_ids.is_empty() {
            return Err(ApplicationError::NothingSelected);
        }

        let inbox = QueryKey::new(INBOX);
        let snapshot = self.cache.snapshot(&inbox);
        self.apply_optimistic(action).await?;

        match self.backend.apply_bulk(action).await {
            Ok(outcome) => {
                debug!(updated = outcome.updated, "Bulk inbox action applied");
                self.cache.invalidate_prefix(&inbox).await;
                Ok(outcome)
            },
            Err(e) => {
                warn!(error = %e, "Bulk inbox action failed, rolling back");
                self.cache.restore(snapshot).await;
                Err(e)
            },
        }
    }

    async fn apply_optimistic(&self, action: &BulkInboxAction) -> Result<(), ApplicationError> {
        let mut now_read = HashSet::new();
        let mut now_unread = HashSet::new();

        let list = QueryKey::new(INBOX).with(INBOX_LIST);
        self.cache
            .update_matching(&list, |key, page: &mut Page<InboxItem>| {
                for item in page.items.iter().filter(|item| action.targets(item)) {
                    match action.action {
                        BulkActionKind::MarkUnread if item.read => {
                            now_unread.insert(item.id.clone());
                        },
                        BulkActionKind::MarkUnread => {},
                        _ if !item.read => {
                            now_read.insert(item.id.clone());
                        },
                        _ => {},
                    }
                }

                let unread_only = key.parts().get(2).is_some_and(|view| view == UNREAD_VIEW);
                let removed = action.apply_to(&mut page.items, unread_only);
                page.total = page
                    .total
                    .saturating_sub(u64::try_from(removed).unwrap_or(u64::MAX));
            })
            .await?;

        let became_unread = u64::try_from(now_unread.len()).unwrap_or(u64::MAX);
        let became_read = u64::try_from(now_read.len()).unwrap_or(u64::MAX);
        self.cache
            .update_matching(
                &QueryKey::new(INBOX).with(INBOX_UNREAD_COUNT),
                |_, count: &mut u64| {
                    *count = count.saturating_add(became_unread).saturating_sub(became_read);
                },
            )
            .await?;
        Ok(())
    }
}

fn inbox_key(query: &InboxQuery) -> Result<QueryKey, ApplicationError> {
    let view = if query.unread_only { UNREAD_VIEW } else { FULL_VIEW };
    QueryKey::new(INBOX)
        .with(INBOX_LIST)
        .with(view)
        .with_params(query)
}
