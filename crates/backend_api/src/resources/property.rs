//! Residential property price register lookups

use domain::{GeoLocation, PropertySale};
use tracing::instrument;

use crate::{ApiClient, ApiError};

/// Largest search radius the backend accepts
const MAX_RADIUS_M: u32 = 5_000;

#[derive(Debug, Clone, Copy)]
pub struct PropertyApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn property(&self) -> PropertyApi<'_> {
        PropertyApi { client: self }
    }
}

impl PropertyApi<'_> {
    /// Sales within `radius_m` of a point; the radius is clamped to 1..=5000
    #[instrument(skip(self))]
    pub async fn sales_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<Vec<PropertySale>, ApiError> {
        let point = GeoLocation::new(latitude, longitude)?;
        let radius = radius_m.clamp(1, MAX_RADIUS_M);
        self.client
            .get_json_with_query(
                "/property/sales",
                &[
                    ("lat", point.latitude().to_string()),
                    ("lng", point.longitude().to_string()),
                    ("radius", radius.to_string()),
                ],
            )
            .await
    }

    /// Sale history of one address
    #[instrument(skip(self))]
    pub async fn history(&self, address: &str) -> Result<Vec<PropertySale>, ApiError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ApiError::InvalidInput("address must not be empty".to_string()));
        }
        self.client
            .get_json_with_query("/property/history", &[("address", address)])
            .await
    }
}
