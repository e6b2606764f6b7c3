//! Cross-page selection tracking.
//!
//! Every operation here is pure: the current page's checkbox state comes in as
//! a [`PageSelection`] and the accumulator is read from the [`PageLocation`].
//! Writing results back into a page is the controller's job.

use tracing::debug;

use crate::query::{self, PageLocation, QueryParams};
use crate::selection::{PageSelection, RowId, SelectionAccumulator};

/// Tracker operations bound to a set of query parameter names.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    params: QueryParams,
}

impl SelectionTracker {
    pub fn new(params: QueryParams) -> Self {
        Self { params }
    }

    /// Accumulator from the URL with the current page's entry replaced by
    /// `selection`. Entries for other pages are kept as they are.
    pub fn merge_into_accumulator(
        &self,
        location: &PageLocation,
        selection: PageSelection,
    ) -> SelectionAccumulator {
        let page = location.current_page(&self.params);
        location.accumulator(&self.params).merged(page, selection)
    }

    /// `href` rewritten to carry `accumulator`.
    pub fn rewrite_href(&self, href: &str, accumulator: &SelectionAccumulator) -> String {
        query::with_accumulator(href, &self.params.accumulator, accumulator)
    }

    /// Rows recorded for the current page, to be re-checked on load.
    pub fn rows_to_restore(&self, location: &PageLocation) -> Vec<RowId> {
        let page = location.current_page(&self.params);
        let accumulator = location.accumulator(&self.params);
        match accumulator.page(&page) {
            Some(selection) => selection.row_ids().cloned().collect(),
            None => {
                debug!("No stored selection for page {}", page);
                Vec::new()
            }
        }
    }

    /// Every row selected on a visited page.
    ///
    /// The stored entry for the current page is ignored in favour of `live`.
    /// Entries from other pages are applied after `live` and win on collision.
    pub fn collect_effective_selection(
        &self,
        location: &PageLocation,
        live: &PageSelection,
    ) -> PageSelection {
        let page = location.current_page(&self.params);
        let accumulator = location.accumulator(&self.params);

        let mut effective = live.clone();
        for (_, selection) in accumulator.other_pages(&page) {
            effective.absorb(selection);
        }
        effective
    }

    /// Download endpoint URL for `selection`.
    pub fn download_url(&self, endpoint: &str, selection: &PageSelection) -> String {
        query::download_url(endpoint, &self.params.download, selection)
    }
}
