//! Heatmap overlay points

use domain::{HeatmapPoint, HeatmapQuery};
use tracing::instrument;

use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct HeatmapApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn heatmap(&self) -> HeatmapApi<'_> {
        HeatmapApi { client: self }
    }
}

impl HeatmapApi<'_> {
    #[instrument(skip(self))]
    pub async fn points(&self, query: &HeatmapQuery) -> Result<Vec<HeatmapPoint>, ApiError> {
        self.client
            .get_json_with_query("/heatmap", &query.to_query_pairs())
            .await
    }
}
