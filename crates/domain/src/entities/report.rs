//! Pre-planning reports generated by the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, GeoLocation};

const DEFAULT_RADIUS_M: u32 = 500;

/// Request for a pre-planning report around a site
///
/// Either an address or a location must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_number: Option<String>,
    #[serde(default = "default_radius")]
    pub radius_m: u32,
    #[serde(default = "default_true")]
    pub include_zoning: bool,
    #[serde(default = "default_true")]
    pub include_property_sales: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

const fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}

const fn default_true() -> bool {
    true
}

impl ReportRequest {
    #[must_use]
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            location: None,
            application_number: None,
            radius_m: DEFAULT_RADIUS_M,
            include_zoning: true,
            include_property_sales: true,
            notes: None,
        }
    }

    #[must_use]
    pub const fn for_location(location: GeoLocation) -> Self {
        Self {
            address: None,
            location: Some(location),
            application_number: None,
            radius_m: DEFAULT_RADIUS_M,
            include_zoning: true,
            include_property_sales: true,
            notes: None,
        }
    }

    /// # Errors
    ///
    /// Returns an error if neither address nor location is set, or the
    /// radius is zero.
    pub fn validate(&self) -> Result<(), DomainError> {
        let has_address = self.address.as_deref().is_some_and(|a| !a.trim().is_empty());
        if !has_address && self.location.is_none() {
            return Err(DomainError::validation(
                "report needs an address or a location",
            ));
        }
        if self.radius_m == 0 {
            return Err(DomainError::validation("report radius must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Pending,
    Generating,
    Ready,
    Failed,
}

impl ReportStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
