//! Alert inbox view state
//!
//! Holds the filters, the loaded page and the selection for bulk actions.
//! The selection never outlives the page it was made on.

use std::collections::BTreeSet;

use domain::{BulkActionKind, BulkInboxAction, InboxItem, InboxQuery, Page, page_count};
use tracing::debug;

use crate::ApplicationError;

#[derive(Debug, Clone, Default)]
pub struct InboxState {
    query: InboxQuery,
    items: Vec<InboxItem>,
    total: u64,
    selected: BTreeSet<String>,
}

impl InboxState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for the page currently shown
    #[must_use]
    pub const fn query(&self) -> &InboxQuery {
        &self.query
    }

    #[must_use]
    pub fn items(&self) -> &[InboxItem] {
        &self.items
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.query.paging.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.query.paging.page_size
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.query.paging.page_size)
    }

    #[must_use]
    pub fn unread_on_page(&self) -> usize {
        self.items.iter().filter(|item| !item.read).count()
    }

    // Filters

    pub fn set_unread_only(&mut self, unread_only: bool) {
        self.change_filter(|q| q.unread_only = unread_only);
    }

    pub fn set_alert_filter(&mut self, alert_id: Option<String>) {
        self.change_filter(|q| q.alert_id = alert_id);
    }

    pub fn set_search(&mut self, search: Option<String>) {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.change_filter(|q| q.search = search);
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), ApplicationError> {
        let mut paging = self.query.paging;
        paging.page = 1;
        paging.page_size = page_size;
        paging.validate()?;
        self.query.paging = paging;
        self.selected.clear();
        Ok(())
    }

    // Pagination

    /// Take in a freshly fetched page
    ///
    /// Selected ids that are not on the page are dropped.
    pub fn load_page(&mut self, page: Page<InboxItem>) {
        self.query.paging.page = page.page.max(1);
        self.total = page.total;
        self.items = page.items;
        let on_page: BTreeSet<&str> = self.items.iter().map(|item| item.id.as_str()).collect();
        self.selected.retain(|id| on_page.contains(id.as_str()));
    }

    pub fn next_page(&mut self) -> Result<u32, ApplicationError> {
        self.go_to_page(self.page().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Result<u32, ApplicationError> {
        self.go_to_page(self.page().saturating_sub(1))
    }

    /// Move to `page`, clearing the selection
    pub fn go_to_page(&mut self, page: u32) -> Result<u32, ApplicationError> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(ApplicationError::InvalidPage { page, page_count });
        }
        if page != self.page() {
            self.query.paging.page = page;
            self.items.clear();
            self.selected.clear();
            debug!(page, "Inbox page changed");
        }
        Ok(page)
    }

    // Selection

    /// Flip selection of an item on the current page
    ///
    /// Returns whether the item is selected afterwards. Ids not on the page
    /// are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|item| item.id == id) {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn select_all_on_page(&mut self) {
        self.selected
            .extend(self.items.iter().map(|item| item.id.clone()));
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in stable order
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    #[must_use]
    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    // Bulk actions

    /// Action over the current selection
    pub fn bulk_action(&self, kind: BulkActionKind) -> Result<BulkInboxAction, ApplicationError> {
        if self.selected.is_empty() {
            return Err(ApplicationError::NothingSelected);
        }
        Ok(BulkInboxAction {
            action: kind,
            item_ids: self.selected_ids(),
        })
    }

    /// Reflect an action locally before the backend confirms it
    ///
    /// Returns how many rows left the page.
    pub fn apply_optimistic(&mut self, action: &BulkInboxAction) -> usize {
        let removed = action.apply_to(&mut self.items, self.query.unread_only);
        self.total = self
            .total
            .saturating_sub(u64::try_from(removed).unwrap_or(u64::MAX));
        let on_page: BTreeSet<&str> = self.items.iter().map(|item| item.id.as_str()).collect();
        self.selected.retain(|id| on_page.contains(id.as_str()));
        removed
    }

    fn change_filter(&mut self, apply: impl FnOnce(&mut InboxQuery)) {
        apply(&mut self.query);
        self.query.paging.page = 1;
        self.items.clear();
        self.selected.clear();
    }
}
