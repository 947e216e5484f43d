//! Planning applications: search, detail, documents and timeline

use domain::{
    ApplicationDocument, ApplicationQuery, ApplicationSummary, Page, PlanningApplication,
    TimelineEvent,
};
use tracing::instrument;

use super::path::encode_segment;
use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct ApplicationsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn applications(&self) -> ApplicationsApi<'_> {
        ApplicationsApi { client: self }
    }
}

impl ApplicationsApi<'_> {
    /// Search and filter applications
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Page<ApplicationSummary>, ApiError> {
        query.validate()?;
        self.client
            .get_json_with_query("/applications", &query.to_query_pairs())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<PlanningApplication, ApiError> {
        self.client
            .get_json(&format!("/applications/{}", encode_segment(id)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn documents(&self, id: &str) -> Result<Vec<ApplicationDocument>, ApiError> {
        self.client
            .get_json(&format!("/applications/{}/documents", encode_segment(id)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn timeline(&self, id: &str) -> Result<Vec<TimelineEvent>, ApiError> {
        self.client
            .get_json(&format!("/applications/{}/timeline", encode_segment(id)))
            .await
    }
}
