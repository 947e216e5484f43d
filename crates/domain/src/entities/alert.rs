//! Saved-search alerts and the inbox they deliver into

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApplicationStatus, ApplicationSummary, DomainError, GeoLocation, PageRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Instant,
    #[default]
    Daily,
    Weekly,
}

impl AlertFrequency {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl std::str::FromStr for AlertFrequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instant" => Ok(Self::Instant),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(DomainError::validation(format!(
                "unknown alert frequency: {other}"
            ))),
        }
    }
}

/// Circle around a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertArea {
    pub center: GeoLocation,
    pub radius_m: u32,
}

/// What an alert matches on. At least one criterion must be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCriteria {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub planning_authorities: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<ApplicationStatus>,
    #[serde(default)]
    pub area: Option<AlertArea>,
}

impl AlertCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.planning_authorities.is_empty()
            && self.statuses.is_empty()
            && self.area.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub criteria: AlertCriteria,
    #[serde(default)]
    pub frequency: AlertFrequency,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_triggered_at: Option<DateTime<Utc>>,
}

const fn default_enabled() -> bool {
    true
}

/// Body for creating or replacing an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub name: String,
    pub criteria: AlertCriteria,
    #[serde(default)]
    pub frequency: AlertFrequency,
}

impl NewAlert {
    /// # Errors
    ///
    /// Returns an error for a blank name, empty criteria or a zero radius.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyField("alert name"));
        }
        if self.criteria.is_empty() {
            return Err(DomainError::validation(
                "alert needs at least one keyword, authority, status or area",
            ));
        }
        if self.criteria.area.is_some_and(|area| area.radius_m == 0) {
            return Err(DomainError::validation("alert radius must be positive"));
        }
        Ok(())
    }
}

/// An application delivered to the user's inbox by an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub id: String,
    pub alert_id: String,
    #[serde(default)]
    pub alert_name: Option<String>,
    pub application: ApplicationSummary,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Inbox filters and paging
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub paging: PageRequest,
}

impl InboxQuery {
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("unreadOnly", self.unread_only.to_string()),
            ("includeArchived", self.include_archived.to_string()),
        ];
        if let Some(alert_id) = &self.alert_id {
            pairs.push(("alertId", alert_id.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("q", search.clone()));
        }
        pairs.push(("page", self.paging.page.to_string()));
        pairs.push(("pageSize", self.paging.page_size.to_string()));
        pairs
    }
}

/// Action applied to a set of inbox items at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionKind {
    MarkRead,
    MarkUnread,
    Archive,
    Delete,
}

impl BulkActionKind {
    /// Archive and delete take items out of the default inbox view
    #[must_use]
    pub const fn removes_from_view(&self) -> bool {
        matches!(self, Self::Archive | Self::Delete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInboxAction {
    pub action: BulkActionKind,
    pub item_ids: Vec<String>,
}

impl BulkInboxAction {
    #[must_use]
    pub fn targets(&self, item: &InboxItem) -> bool {
        self.item_ids.iter().any(|id| *id == item.id)
    }

    /// Apply the action to locally held items the way the backend will
    ///
    /// Returns how many items left the list. In an unread-only view, items
    /// marked read leave the list as well.
    pub fn apply_to(&self, items: &mut Vec<InboxItem>, unread_only: bool) -> usize {
        let read = match self.action {
            BulkActionKind::MarkRead => Some(true),
            BulkActionKind::MarkUnread => Some(false),
            BulkActionKind::Archive | BulkActionKind::Delete => None,
        };
        if let Some(read) = read {
            for item in items.iter_mut().filter(|item| self.targets(item)) {
                item.read = read;
            }
        }

        let hide_read = unread_only && self.action == BulkActionKind::MarkRead;
        let before = items.len();
        items.retain(|item| !(self.targets(item) && (self.action.removes_from_view() || hide_read)));
        before - items.len()
    }
}

/// Server acknowledgement of a bulk action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionOutcome {
    #[serde(default)]
    pub updated: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria_with_keyword() -> AlertCriteria {
        AlertCriteria {
            keywords: vec!["data centre".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn new_alert_requires_name_and_criteria() {
        let alert = NewAlert {
            name: " ".to_string(),
            criteria: criteria_with_keyword(),
            frequency: AlertFrequency::Daily,
        };
        assert_eq!(alert.validate(), Err(DomainError::EmptyField("alert name")));

        let alert = NewAlert {
            name: "Data centres".to_string(),
            criteria: AlertCriteria::default(),
            frequency: AlertFrequency::Daily,
        };
        assert!(alert.validate().is_err());

        let alert = NewAlert {
            name: "Data centres".to_string(),
            criteria: criteria_with_keyword(),
            frequency: AlertFrequency::Instant,
        };
        assert!(alert.validate().is_ok());
    }

    #[test]
    fn zero_radius_is_rejected() {
        let alert = NewAlert {
            name: "Near home".to_string(),
            criteria: AlertCriteria {
                area: Some(AlertArea {
                    center: GeoLocation::new(53.3, -6.2).unwrap(),
                    radius_m: 0,
                }),
                ..Default::default()
            },
            frequency: AlertFrequency::Weekly,
        };
        assert!(alert.validate().is_err());
    }

    #[test]
    fn bulk_action_serializes_snake_case() {
        let action = BulkInboxAction {
            action: BulkActionKind::MarkRead,
            item_ids: vec!["i1".to_string()],
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "mark_read");
        assert_eq!(json["itemIds"][0], "i1");
    }

    fn inbox_item(id: &str, read: bool) -> InboxItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "alertId": "al-1",
            "application": {"id": format!("app-{id}"), "applicationNumber": id},
            "read": read,
            "createdAt": "2024-03-05T08:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn mark_read_updates_in_place() {
        let mut items = vec![inbox_item("a", false), inbox_item("b", false)];
        let action = BulkInboxAction {
            action: BulkActionKind::MarkRead,
            item_ids: vec!["a".to_string()],
        };
        assert_eq!(action.apply_to(&mut items, false), 0);
        assert!(items[0].read);
        assert!(!items[1].read);
    }

    #[test]
    fn mark_read_hides_items_in_unread_view() {
        let mut items = vec![inbox_item("a", false), inbox_item("b", false)];
        let action = BulkInboxAction {
            action: BulkActionKind::MarkRead,
            item_ids: vec!["b".to_string()],
        };
        assert_eq!(action.apply_to(&mut items, true), 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn archive_removes_targets() {
        let mut items = vec![inbox_item("a", true), inbox_item("b", false), inbox_item("c", false)];
        let action = BulkInboxAction {
            action: BulkActionKind::Archive,
            item_ids: vec!["a".to_string(), "c".to_string(), "zz".to_string()],
        };
        assert_eq!(action.apply_to(&mut items, false), 2);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "b");
    }

    #[test]
    fn inbox_query_pairs() {
        let query = InboxQuery {
            unread_only: true,
            alert_id: Some("al-1".to_string()),
            ..Default::default()
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("unreadOnly", "true".to_string())));
        assert!(pairs.contains(&("alertId", "al-1".to_string())));
        assert!(pairs.contains(&("page", "1".to_string())));
    }

    #[test]
    fn alert_enabled_defaults_to_true() {
        let alert: Alert = serde_json::from_str(r#"{"id":"1","name":"n"}"#).unwrap();
        assert!(alert.enabled);
        assert_eq!(alert.frequency, AlertFrequency::Daily);
    }
}
