//! `planwatch inbox`: paging, selection and bulk actions

use application::{InboxState, PlanningQueries};
use clap::Args;
use domain::{BulkActionKind, BulkActionOutcome};
use tracing::warn;

use crate::output;

/// Filters and paging shared by the inbox subcommands
#[derive(Debug, Clone, Args)]
pub struct InboxFilterArgs {
    /// Only unread items
    #[arg(long)]
    pub unread: bool,

    /// Only items delivered by this alert
    #[arg(long)]
    pub alert: Option<String>,

    /// Free-text filter
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 25)]
    pub page_size: u32,
}

/// Items to act on
#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Item ids on the selected page
    #[arg(required_unless_present = "all")]
    pub ids: Vec<String>,

    /// Every item on the selected page
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

/// Load the requested page into a fresh inbox state
///
/// Pages are walked the way the inbox view does: the first page tells us how
/// many pages exist, then we jump.
pub async fn load(
    queries: &PlanningQueries,
    filters: &InboxFilterArgs,
) -> anyhow::Result<InboxState> {
    let mut state = InboxState::new();
    state.set_unread_only(filters.unread);
    state.set_alert_filter(filters.alert.clone());
    state.set_search(filters.search.clone());
    state.set_page_size(filters.page_size)?;

    state.load_page(queries.inbox(state.query()).await?);
    if filters.page != state.page() {
        state.go_to_page(filters.page)?;
        state.load_page(queries.inbox(state.query()).await?);
    }
    Ok(state)
}

pub fn render(state: &InboxState) -> String {
    let mut out = output::inbox_lines(state.items(), |id| state.is_selected(id));
    out.push_str(&format!(
        "Page {} of {} ({} total, {} unread on this page)",
        state.page(),
        state.page_count(),
        state.total(),
        state.unread_on_page()
    ));
    out
}

/// Select items on the loaded page and apply `kind` to them
pub async fn act(
    queries: &PlanningQueries,
    state: &mut InboxState,
    selection: &SelectionArgs,
    kind: BulkActionKind,
) -> anyhow::Result<BulkActionOutcome> {
    if selection.all {
        state.select_all_on_page();
    } else {
        for id in &selection.ids {
            if !state.is_selected(id) && !state.toggle(id) {
                warn!(id = %id, "Item is not on this page, skipping");
            }
        }
    }

    let action = state.bulk_action(kind)?;
    let outcome = queries.apply_bulk(&action).await?;
    state.apply_optimistic(&action);
    Ok(outcome)
}
