//! Pre-planning report generation

use domain::{Report, ReportRequest};
use tracing::instrument;

use super::path::encode_segment;
use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct ReportsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn reports(&self) -> ReportsApi<'_> {
        ReportsApi { client: self }
    }
}

impl ReportsApi<'_> {
    /// Queue a pre-planning report; the returned report is usually `pending`
    #[instrument(skip(self, request))]
    pub async fn request_pre_planning(&self, request: &ReportRequest) -> Result<Report, ApiError> {
        request.validate()?;
        self.client.post_json("/reports", request).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Report, ApiError> {
        self.client
            .get_json(&format!("/reports/{}", encode_segment(id)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Report>, ApiError> {
        self.client.get_json("/reports").await
    }
}
