//! Page adapter: the DOM contract the selection controller drives.
//!
//! A page exposes selectable worksheet rows, the pagination links that carry
//! the accumulator, and the selection-mode controls. [`HtmlPage`] implements
//! it over rendered HTML; a browser binding would implement the same trait.

mod html;

pub use html::{HtmlPage, PageSelectors};

use crate::selection::{PageSelection, RowId, RowLabel};

/// One selectable row's checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCheckbox {
    pub pk: RowId,
    pub label: RowLabel,
    /// Section the row belongs to, targeted by that section's check-all box.
    pub group: Option<String>,
    pub checked: bool,
}

/// Visual state of the selection-mode toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleStyle {
    /// Selection mode off: checkboxes and the download button are hidden.
    #[default]
    Inactive,
    /// Selection mode on.
    Active,
}

impl ToggleStyle {
    pub fn flipped(self) -> Self {
        match self {
            ToggleStyle::Inactive => ToggleStyle::Active,
            ToggleStyle::Active => ToggleStyle::Inactive,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, ToggleStyle::Active)
    }
}

pub trait SelectionPage {
    /// Every row checkbox on the page, in document order.
    fn rows(&self) -> Vec<RowCheckbox>;

    /// Check or uncheck every checkbox for `pk`. Returns false if the page has none.
    fn set_row_checked(&mut self, pk: &RowId, checked: bool) -> bool;

    /// Check or uncheck every row of a section, and its check-all box.
    /// Returns the number of rows touched.
    fn set_group_checked(&mut self, group: &str, checked: bool) -> usize;

    /// Uncheck every checkbox on the page, rows and check-all boxes alike.
    fn clear_checkboxes(&mut self);

    fn pagination_hrefs(&self) -> Vec<String>;

    fn set_pagination_href(&mut self, index: usize, href: String);

    fn toggle_style(&self) -> ToggleStyle;

    fn set_toggle_style(&mut self, style: ToggleStyle);

    fn set_checkboxes_visible(&mut self, visible: bool);

    fn set_submit_visible(&mut self, visible: bool);

    /// Open a new browsing context at `url`.
    fn open_window(&mut self, url: &str);

    /// `pk -> numbering` for every checked row.
    fn checked_selection(&self) -> PageSelection {
        self.rows()
            .into_iter()
            .filter(|row| row.checked)
            .map(|row| (row.pk, row.label))
            .collect()
    }
}
