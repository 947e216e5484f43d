//! Search filters, view mode and scroll positions
//!
//! Shared between views through a cloneable handle. Changing any filter
//! sends the user back to the first page.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use chrono::NaiveDate;
use domain::{ApplicationQuery, ApplicationStatus, SortOrder};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::ApplicationError;

/// How the application list is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
    Map,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Cards => "cards",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "cards" | "card" => Ok(Self::Cards),
            "map" => Ok(Self::Map),
            other => Err(ApplicationError::InvalidInput(format!(
                "unknown view mode: {other}"
            ))),
        }
    }
}

#[derive(Debug, Default)]
struct Filters {
    query: ApplicationQuery,
    view_mode: ViewMode,
    scroll_positions: HashMap<String, u32>,
}

/// Cloneable handle to the search filter state
#[derive(Debug, Clone, Default)]
pub struct SearchFilterStore {
    inner: Arc<RwLock<Filters>>,
}

impl SearchFilterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current query
    #[must_use]
    pub fn query(&self) -> ApplicationQuery {
        self.inner.read().query.clone()
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.inner.read().query.has_filters()
    }

    pub fn set_search(&self, search: Option<String>) {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.update_filter(|q| q.search = search);
    }

    pub fn set_planning_authority(&self, authority: Option<String>) {
        self.update_filter(|q| q.planning_authority = authority);
    }

    pub fn set_status(&self, status: Option<ApplicationStatus>) {
        self.update_filter(|q| q.status = status);
    }

    /// Set the received-date range; an inverted range is rejected
    pub fn set_received_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(), ApplicationError> {
        if matches!((from, to), (Some(from), Some(to)) if from > to) {
            return Err(ApplicationError::InvalidInput(
                "received-from date is after received-to date".to_string(),
            ));
        }
        self.update_filter(|q| {
            q.received_from = from;
            q.received_to = to;
        });
        Ok(())
    }

    pub fn set_sort(&self, sort: SortOrder) {
        self.update_filter(|q| q.sort = sort);
    }

    /// Drop every filter, keeping page size and sort
    pub fn clear_filters(&self) {
        self.update_filter(|q| {
            q.search = None;
            q.planning_authority = None;
            q.status = None;
            q.received_from = None;
            q.received_to = None;
        });
    }

    pub fn set_page(&self, page: u32) -> Result<(), ApplicationError> {
        if page == 0 {
            return Err(ApplicationError::InvalidPage {
                page,
                page_count: 0,
            });
        }
        self.inner.write().query.paging.page = page;
        Ok(())
    }

    /// Change the page size and go back to page one
    pub fn set_page_size(&self, page_size: u32) -> Result<(), ApplicationError> {
        let mut paging = self.inner.read().query.paging;
        paging.page = 1;
        paging.page_size = page_size;
        paging.validate()?;
        self.inner.write().query.paging = paging;
        Ok(())
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.inner.read().view_mode
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.inner.write().view_mode = mode;
    }

    pub fn save_scroll_position(&self, route: impl Into<String>, offset: u32) {
        self.inner.write().scroll_positions.insert(route.into(), offset);
    }

    #[must_use]
    pub fn scroll_position(&self, route: &str) -> Option<u32> {
        self.inner.read().scroll_positions.get(route).copied()
    }

    fn update_filter(&self, apply: impl FnOnce(&mut ApplicationQuery)) {
        let mut filters = self.inner.write();
        apply(&mut filters.query);
        filters.query.paging.page = 1;
    }
}
