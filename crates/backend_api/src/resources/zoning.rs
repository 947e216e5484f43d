//! Development-plan zoning lookups

use domain::{GeoLocation, ZoningInfo};
use tracing::instrument;

use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct ZoningApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn zoning(&self) -> ZoningApi<'_> {
        ZoningApi { client: self }
    }
}

impl ZoningApi<'_> {
    /// Zoning at a point; coordinates are validated before any request
    #[instrument(skip(self))]
    pub async fn at_point(&self, latitude: f64, longitude: f64) -> Result<ZoningInfo, ApiError> {
        let point = GeoLocation::new(latitude, longitude)?;
        self.client
            .get_json_with_query(
                "/zoning",
                &[("lat", point.latitude()), ("lng", point.longitude())],
            )
            .await
    }
}
