//! Planning application entities and search parameters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DomainError, GeoLocation, PageRequest};

/// Lifecycle status of a planning application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Received,
    FurtherInformation,
    Granted,
    Refused,
    Withdrawn,
    Invalid,
    Appealed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::FurtherInformation => "further_information",
            Self::Granted => "granted",
            Self::Refused => "refused",
            Self::Withdrawn => "withdrawn",
            Self::Invalid => "invalid",
            Self::Appealed => "appealed",
            Self::Unknown => "unknown",
        }
    }

    /// A decision has been made (or the application closed without one)
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        matches!(
            self,
            Self::Granted | Self::Refused | Self::Withdrawn | Self::Invalid
        )
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "received" | "new" => Ok(Self::Received),
            "further_information" | "fi" => Ok(Self::FurtherInformation),
            "granted" => Ok(Self::Granted),
            "refused" => Ok(Self::Refused),
            "withdrawn" => Ok(Self::Withdrawn),
            "invalid" => Ok(Self::Invalid),
            "appealed" => Ok(Self::Appealed),
            other => Err(DomainError::validation(format!(
                "unknown application status: {other}"
            ))),
        }
    }
}

/// Row-level view of an application, as returned by search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: String,
    pub application_number: String,
    #[serde(default)]
    pub planning_authority: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub decision_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

/// Full application detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningApplication {
    #[serde(flatten)]
    pub summary: ApplicationSummary,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub development_type: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub appeal_reference: Option<String>,
    #[serde(default)]
    pub document_count: u32,
}

/// A document lodged against an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub is_drawing: bool,
}

/// One dated step in an application's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub date: NaiveDate,
    #[serde(alias = "type")]
    pub event_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    DecisionDate,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::DecisionDate => "decision_date",
        }
    }
}

/// Search and filter parameters for the applications list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_to: Option<NaiveDate>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(flatten)]
    pub paging: PageRequest,
}

impl ApplicationQuery {
    /// # Errors
    ///
    /// Returns a validation error for bad paging or an inverted date range.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.paging.validate()?;
        if matches!((self.received_from, self.received_to), (Some(from), Some(to)) if from > to) {
            return Err(DomainError::validation(
                "received_from must not be after received_to",
            ));
        }
        Ok(())
    }

    /// Whether any filter (other than paging and sort) is set
    #[must_use]
    pub const fn has_filters(&self) -> bool {
        self.search.is_some()
            || self.planning_authority.is_some()
            || self.status.is_some()
            || self.received_from.is_some()
            || self.received_to.is_some()
    }

    /// Query-string pairs in a stable order
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(8);
        if let Some(search) = &self.search {
            pairs.push(("q", search.clone()));
        }
        if let Some(authority) = &self.planning_authority {
            pairs.push(("planningAuthority", authority.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(from) = self.received_from {
            pairs.push(("receivedFrom", from.to_string()));
        }
        if let Some(to) = self.received_to {
            pairs.push(("receivedTo", to.to_string()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs.push(("page", self.paging.page.to_string()));
        pairs.push(("pageSize", self.paging.page_size.to_string()));
        pairs
    }
}
