//! Event handlers wiring a [`SelectionPage`] to the selection tracker.
//!
//! The controller keeps no accumulator of its own. Each handler reads the
//! accumulator from the page URL, merges in the live checkbox state and writes
//! the result into the pagination links before returning.

use serde::Serialize;
use tracing::{debug, info};

use crate::page::{SelectionPage, ToggleStyle};
use crate::query::PageLocation;
use crate::selection::{PageSelection, RowId, SelectionAccumulator};
use crate::tracker::SelectionTracker;

/// Result of a download action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    /// Rows selected across every visited page.
    pub selection: PageSelection,
    /// URL opened in a new browsing context.
    pub url: String,
}

pub struct SelectionController<P> {
    location: PageLocation,
    page: P,
    tracker: SelectionTracker,
    download_endpoint: String,
}

impl<P: SelectionPage> SelectionController<P> {
    pub fn new(
        location: PageLocation,
        page: P,
        tracker: SelectionTracker,
        download_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            location,
            page,
            tracker,
            download_endpoint: download_endpoint.into(),
        }
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Page-load handler: re-check stored rows, then rewrite pagination links.
    ///
    /// Restoring first means the links written here already include the
    /// current page's restored rows.
    pub fn on_load(&mut self) -> SelectionAccumulator {
        self.restore_checked_state();
        self.rewrite_pagination_links()
    }

    /// Rows checked on the page right now.
    pub fn current_page_selection(&self) -> PageSelection {
        self.page.checked_selection()
    }

    /// Accumulator with the current page replaced by its live selection.
    pub fn merged_accumulator(&self) -> SelectionAccumulator {
        self.tracker
            .merge_into_accumulator(&self.location, self.current_page_selection())
    }

    /// Point every pagination link at the latest accumulator.
    pub fn rewrite_pagination_links(&mut self) -> SelectionAccumulator {
        let accumulator = self.merged_accumulator();
        for (index, href) in self.page.pagination_hrefs().into_iter().enumerate() {
            let rewritten = self.tracker.rewrite_href(&href, &accumulator);
            if rewritten != href {
                self.page.set_pagination_href(index, rewritten);
            }
        }
        accumulator
    }

    /// Check the rows stored for the current page. Returns the rows found on it.
    pub fn restore_checked_state(&mut self) -> Vec<RowId> {
        let mut restored = Vec::new();
        for pk in self.tracker.rows_to_restore(&self.location) {
            if self.page.set_row_checked(&pk, true) {
                restored.push(pk);
            } else {
                debug!("Stored row {} is not on this page", pk);
            }
        }
        restored
    }

    /// Single row checkbox changed.
    pub fn set_row_checked(&mut self, pk: &RowId, checked: bool) -> SelectionAccumulator {
        if !self.page.set_row_checked(pk, checked) {
            debug!("No checkbox for row {}", pk);
        }
        self.rewrite_pagination_links()
    }

    /// A section's check-all box changed.
    pub fn toggle_group(&mut self, group: &str, checked: bool) -> SelectionAccumulator {
        let touched = self.page.set_group_checked(group, checked);
        debug!("Set {} rows in {} to checked={}", touched, group, checked);
        self.rewrite_pagination_links()
    }

    /// Switch selection mode, showing or hiding checkboxes and the download button.
    pub fn toggle_checklist(&mut self) -> ToggleStyle {
        let style = self.page.toggle_style().flipped();
        self.page.set_toggle_style(style);
        self.page.set_checkboxes_visible(style.is_active());
        self.page.set_submit_visible(style.is_active());
        style
    }

    /// Every row selected on a visited page, with live state for this page.
    pub fn collect_effective_selection(&self) -> PageSelection {
        self.tracker
            .collect_effective_selection(&self.location, &self.current_page_selection())
    }

    /// Open the download endpoint for the effective selection, then reset the
    /// selection controls. The URL's accumulator is left as it is.
    pub fn trigger_download(&mut self) -> DownloadRequest {
        let selection = self.collect_effective_selection();
        let url = self.tracker.download_url(&self.download_endpoint, &selection);
        info!("Downloading {} worksheets", selection.len());
        self.page.open_window(&url);

        self.page.clear_checkboxes();
        self.page.set_checkboxes_visible(false);
        self.page.set_toggle_style(ToggleStyle::Inactive);
        self.page.set_submit_visible(false);

        DownloadRequest { selection, url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{HtmlPage, PageSelectors};

    const PAGE: &str = r#"
<button id="toggle-checklist-btn" class="btn btn-default"></button>
<div id="module-1">
  <input type="checkbox" class="check-all-worksheet">
  <input type="checkbox" class="worksheet-checkbox module-1-checkbox" worksheet-pk="10" worksheet-number="1">
  <input type="checkbox" class="worksheet-checkbox module-1-checkbox" worksheet-pk="11" worksheet-number="2">
</div>
<ul class="pagination">
  <li><a href="?page=1">1</a></li>
  <li><a href="?page=2">2</a></li>
</ul>
"#;

    fn controller(url: &str) -> SelectionController<HtmlPage> {
        let page = HtmlPage::parse(PAGE, &PageSelectors::default()).unwrap();
        SelectionController::new(
            PageLocation::parse(url).unwrap(),
            page,
            SelectionTracker::default(),
            "/download/",
        )
    }

    #[test]
    fn test_on_load_writes_links() {
        let mut ctl = controller("https://example.com/lessons/");
        let acc = ctl.on_load();
        assert_eq!(acc.to_json(), r#"{"1":{}}"#);
        assert_eq!(
            ctl.page().pagination_hrefs()[1],
            "?page=2&worksheet_all=%7B%221%22%3A%7B%7D%7D"
        );
    }

    #[test]
    fn test_on_load_restores_before_rewriting() {
        let mut ctl = controller(
            "https://example.com/lessons/?page=1&worksheet_all=%7B%221%22%3A%7B%2211%22%3A%222%22%7D%7D",
        );
        let acc = ctl.on_load();
        assert_eq!(acc.to_json(), r#"{"1":{"11":"2"}}"#);
        assert!(ctl.current_page_selection().contains(&RowId::from("11")));
    }

    #[test]
    fn test_row_toggle_updates_links() {
        let mut ctl = controller("https://example.com/lessons/");
        ctl.on_load();
        let acc = ctl.set_row_checked(&RowId::from("10"), true);
        assert_eq!(acc.to_json(), r#"{"1":{"10":"1"}}"#);

        let hrefs = ctl.page().pagination_hrefs();
        assert!(hrefs.iter().all(|h| h.matches("worksheet_all=").count() == 1));
        assert!(hrefs[1].contains("%2210%22"));
    }

    #[test]
    fn test_toggle_group() {
        let mut ctl = controller("https://example.com/lessons/");
        let acc = ctl.toggle_group("module-1", true);
        assert_eq!(acc.to_json(), r#"{"1":{"10":"1","11":"2"}}"#);
        assert_eq!(ctl.page().group_checked("module-1"), Some(true));

        let acc = ctl.toggle_group("module-1", false);
        assert_eq!(acc.to_json(), r#"{"1":{}}"#);
    }

    #[test]
    fn test_toggle_checklist() {
        let mut ctl = controller("https://example.com/lessons/");
        assert_eq!(ctl.toggle_checklist(), ToggleStyle::Active);
        assert!(ctl.page().checkboxes_visible());
        assert!(ctl.page().submit_visible());

        assert_eq!(ctl.toggle_checklist(), ToggleStyle::Inactive);
        assert!(!ctl.page().checkboxes_visible());
        assert!(!ctl.page().submit_visible());
    }

    #[test]
    fn test_download_resets_controls() {
        let mut ctl = controller("https://example.com/lessons/");
        ctl.toggle_checklist();
        ctl.toggle_group("module-1", true);

        let request = ctl.trigger_download();
        assert_eq!(request.selection.len(), 2);
        assert_eq!(ctl.page().opened_windows(), &[request.url.clone()]);

        let page = ctl.page();
        assert!(page.checked_selection().is_empty());
        assert_eq!(page.group_checked("module-1"), Some(false));
        assert_eq!(page.toggle_style(), ToggleStyle::Inactive);
        assert!(!page.checkboxes_visible());
        assert!(!page.submit_visible());
    }

    #[test]
    fn test_download_leaves_links_alone() {
        let mut ctl = controller("https://example.com/lessons/");
        ctl.set_row_checked(&RowId::from("10"), true);
        let before = ctl.page().pagination_hrefs();
        ctl.trigger_download();
        assert_eq!(ctl.page().pagination_hrefs(), before);
    }
}
