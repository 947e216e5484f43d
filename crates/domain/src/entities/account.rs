//! User profile, settings and billing portal handoff

use serde::{Deserialize, Serialize};

use crate::AlertFrequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Pro,
    Enterprise,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub digest_frequency: AlertFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_planning_authority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub plan: SubscriptionPlan,
    #[serde(default)]
    pub settings: UserSettings,
}

/// Redirect target for the hosted billing portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPortalSession {
    pub url: String,
}
