//! In-memory page built from a rendered worksheet list.

use std::fs;
use std::path::Path;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RowCheckbox, SelectionPage, ToggleStyle};
use crate::error::{Result, SelectError};
use crate::selection::{RowId, RowLabel};

/// Where the selection controls live in the rendered markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, prefer::FromValue)]
pub struct PageSelectors {
    /// Row checkboxes.
    #[serde(default = "default_row_checkbox")]
    pub row_checkbox: String,
    /// Attribute holding the row's primary key.
    #[serde(default = "default_pk_attribute")]
    pub pk_attribute: String,
    /// Attribute holding the row's numbering.
    #[serde(default = "default_label_attribute")]
    pub label_attribute: String,
    /// Per-section check-all boxes. The parent element's id names the section.
    #[serde(default = "default_check_all")]
    pub check_all: String,
    /// Rows of section `foo` carry the class `foo` + this suffix.
    #[serde(default = "default_group_class_suffix")]
    pub group_class_suffix: String,
    /// Pagination anchors rewritten to carry the accumulator.
    #[serde(default = "default_pagination_link")]
    pub pagination_link: String,
    /// Button switching selection mode on and off.
    #[serde(default = "default_toggle_button")]
    pub toggle_button: String,
    /// Class the toggle button carries while selection mode is on.
    #[serde(default = "default_active_class")]
    pub active_class: String,
    /// Download submit control.
    #[serde(default = "default_submit")]
    pub submit: String,
}

fn default_row_checkbox() -> String {
    ".worksheet-checkbox".to_string()
}
fn default_pk_attribute() -> String {
    "worksheet-pk".to_string()
}
fn default_label_attribute() -> String {
    "worksheet-number".to_string()
}
fn default_check_all() -> String {
    ".check-all-worksheet".to_string()
}
fn default_group_class_suffix() -> String {
    "-checkbox".to_string()
}
fn default_pagination_link() -> String {
    ".pagination > li > a".to_string()
}
fn default_toggle_button() -> String {
    "#toggle-checklist-btn".to_string()
}
fn default_active_class() -> String {
    "btn-success".to_string()
}
fn default_submit() -> String {
    "#download-multiple-submit".to_string()
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            row_checkbox: default_row_checkbox(),
            pk_attribute: default_pk_attribute(),
            label_attribute: default_label_attribute(),
            check_all: default_check_all(),
            group_class_suffix: default_group_class_suffix(),
            pagination_link: default_pagination_link(),
            toggle_button: default_toggle_button(),
            active_class: default_active_class(),
            submit: default_submit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckAll {
    group: String,
    checked: bool,
}

/// Selection state of one rendered list page.
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    rows: Vec<RowCheckbox>,
    check_alls: Vec<CheckAll>,
    pagination: Vec<String>,
    toggle_style: ToggleStyle,
    checkboxes_visible: bool,
    submit_visible: bool,
    opened: Vec<String>,
}

impl HtmlPage {
    /// Extract the selection controls from a rendered page.
    pub fn parse(html: &str, selectors: &PageSelectors) -> Result<Self> {
        let document = Html::parse_document(html);

        let check_all_selector = compile(&selectors.check_all)?;
        let check_alls: Vec<CheckAll> = document
            .select(&check_all_selector)
            .filter_map(|el| {
                let group = el
                    .parent()
                    .and_then(ElementRef::wrap)
                    .and_then(|parent| parent.value().id())
                    .map(str::to_string);
                match group {
                    Some(group) => Some(CheckAll {
                        group,
                        checked: el.value().attr("checked").is_some(),
                    }),
                    None => {
                        debug!("Skipping check-all control without a parent id");
                        None
                    }
                }
            })
            .collect();

        let group_classes: Vec<(String, String)> = check_alls
            .iter()
            .map(|c| {
                (
                    c.group.clone(),
                    format!("{}{}", c.group, selectors.group_class_suffix),
                )
            })
            .collect();

        let row_selector = compile(&selectors.row_checkbox)?;
        let mut rows = Vec::new();
        for el in document.select(&row_selector) {
            let element = el.value();
            let Some(pk) = element.attr(&selectors.pk_attribute) else {
                debug!(
                    "Skipping row checkbox without a {} attribute",
                    selectors.pk_attribute
                );
                continue;
            };
            let label = element.attr(&selectors.label_attribute).unwrap_or_default();
            let group = group_classes
                .iter()
                .find(|(_, class)| element.classes().any(|c| c == class))
                .map(|(group, _)| group.clone());

            rows.push(RowCheckbox {
                pk: RowId::from(pk),
                label: RowLabel::from(label),
                group,
                checked: element.attr("checked").is_some(),
            });
        }

        let link_selector = compile(&selectors.pagination_link)?;
        let pagination: Vec<String> = document
            .select(&link_selector)
            .filter_map(|el| el.value().attr("href").map(str::to_string))
            .collect();

        let toggle_selector = compile(&selectors.toggle_button)?;
        let toggle_style = match document.select(&toggle_selector).next() {
            Some(button)
                if button
                    .value()
                    .classes()
                    .any(|c| c == selectors.active_class) =>
            {
                ToggleStyle::Active
            }
            _ => ToggleStyle::Inactive,
        };

        // Validated even though its state is tracked rather than read back.
        compile(&selectors.submit)?;

        debug!(
            "Parsed page: {} rows, {} sections, {} pagination links",
            rows.len(),
            check_alls.len(),
            pagination.len()
        );

        Ok(Self {
            rows,
            check_alls,
            pagination,
            toggle_style,
            checkboxes_visible: toggle_style.is_active(),
            submit_visible: toggle_style.is_active(),
            opened: Vec::new(),
        })
    }

    pub fn from_file(path: &Path, selectors: &PageSelectors) -> Result<Self> {
        let html = fs::read_to_string(path)?;
        Self::parse(&html, selectors)
    }

    /// State of a section's check-all box, if the page has one.
    pub fn group_checked(&self, group: &str) -> Option<bool> {
        self.check_alls
            .iter()
            .find(|c| c.group == group)
            .map(|c| c.checked)
    }

    pub fn checkboxes_visible(&self) -> bool {
        self.checkboxes_visible
    }

    pub fn submit_visible(&self) -> bool {
        self.submit_visible
    }

    /// URLs opened through [`SelectionPage::open_window`], oldest first.
    pub fn opened_windows(&self) -> &[String] {
        &self.opened
    }
}

impl SelectionPage for HtmlPage {
    fn rows(&self) -> Vec<RowCheckbox> {
        self.rows.clone()
    }

    fn set_row_checked(&mut self, pk: &RowId, checked: bool) -> bool {
        let mut found = false;
        for row in self.rows.iter_mut().filter(|row| &row.pk == pk) {
            row.checked = checked;
            found = true;
        }
        found
    }

    fn set_group_checked(&mut self, group: &str, checked: bool) -> usize {
        for check_all in self.check_alls.iter_mut().filter(|c| c.group == group) {
            check_all.checked = checked;
        }

        let mut touched = 0;
        for row in self
            .rows
            .iter_mut()
            .filter(|row| row.group.as_deref() == Some(group))
        {
            row.checked = checked;
            touched += 1;
        }
        touched
    }

    fn clear_checkboxes(&mut self) {
        for row in &mut self.rows {
            row.checked = false;
        }
        for check_all in &mut self.check_alls {
            check_all.checked = false;
        }
    }

    fn pagination_hrefs(&self) -> Vec<String> {
        self.pagination.clone()
    }

    fn set_pagination_href(&mut self, index: usize, href: String) {
        if let Some(slot) = self.pagination.get_mut(index) {
            *slot = href;
        }
    }

    fn toggle_style(&self) -> ToggleStyle {
        self.toggle_style
    }

    fn set_toggle_style(&mut self, style: ToggleStyle) {
        self.toggle_style = style;
    }

    fn set_checkboxes_visible(&mut self, visible: bool) {
        self.checkboxes_visible = visible;
    }

    fn set_submit_visible(&mut self, visible: bool) {
        self.submit_visible = visible;
    }

    fn open_window(&mut self, url: &str) {
        self.opened.push(url.to_string());
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| SelectError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"
<html><body>
  <button id="toggle-checklist-btn" class="btn btn-default">Select</button>
  <div id="section-1">
    <input type="checkbox" class="check-all-worksheet">
    <input type="checkbox" class="worksheet-checkbox section-1-checkbox"
           worksheet-pk="10" worksheet-number="1.1">
    <input type="checkbox" class="worksheet-checkbox section-1-checkbox"
           worksheet-pk="11" worksheet-number="1.2" checked>
  </div>
  <div id="section-2">
    <input type="checkbox" class="check-all-worksheet">
    <input type="checkbox" class="worksheet-checkbox section-2-checkbox"
           worksheet-pk="12" worksheet-number="2.1">
  </div>
  <input type="checkbox" class="worksheet-checkbox">
  <ul class="pagination">
    <li><a href="?page=1">1</a></li>
    <li><a href="?page=2">2</a></li>
    <li><a>…</a></li>
  </ul>
  <button id="download-multiple-submit">Download</button>
</body></html>
"#;

    fn page() -> HtmlPage {
        HtmlPage::parse(LIST_PAGE, &PageSelectors::default()).unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let page = page();
        let rows = page.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].pk.as_str(), "10");
        assert_eq!(rows[0].label.as_str(), "1.1");
        assert_eq!(rows[0].group.as_deref(), Some("section-1"));
        assert!(!rows[0].checked);
        assert!(rows[1].checked);
        assert_eq!(rows[2].group.as_deref(), Some("section-2"));
    }

    #[test]
    fn test_checked_selection() {
        let selection = page().checked_selection();
        assert_eq!(selection.to_json(), r#"{"11":"1.2"}"#);
    }

    #[test]
    fn test_parse_controls() {
        let page = page();
        assert_eq!(page.pagination_hrefs(), vec!["?page=1", "?page=2"]);
        assert_eq!(page.toggle_style(), ToggleStyle::Inactive);
        assert!(!page.checkboxes_visible());
        assert!(!page.submit_visible());
        assert_eq!(page.group_checked("section-1"), Some(false));
        assert_eq!(page.group_checked("missing"), None);
    }

    #[test]
    fn test_active_toggle_shows_controls() {
        let html = LIST_PAGE.replace("btn btn-default", "btn btn-success");
        let page = HtmlPage::parse(&html, &PageSelectors::default()).unwrap();
        assert_eq!(page.toggle_style(), ToggleStyle::Active);
        assert!(page.checkboxes_visible());
        assert!(page.submit_visible());
    }

    #[test]
    fn test_set_group_checked() {
        let mut page = page();
        assert_eq!(page.set_group_checked("section-1", true), 2);
        assert_eq!(page.group_checked("section-1"), Some(true));
        assert_eq!(page.checked_selection().len(), 2);

        assert_eq!(page.set_group_checked("section-1", false), 2);
        assert!(page.checked_selection().is_empty());
    }

    #[test]
    fn test_set_row_checked_unknown_row() {
        let mut page = page();
        assert!(!page.set_row_checked(&RowId::from("99"), true));
        assert!(page.set_row_checked(&RowId::from("12"), true));
        assert!(page.checked_selection().contains(&RowId::from("12")));
    }

    #[test]
    fn test_clear_checkboxes() {
        let mut page = page();
        page.set_group_checked("section-2", true);
        page.clear_checkboxes();
        assert!(page.checked_selection().is_empty());
        assert_eq!(page.group_checked("section-2"), Some(false));
    }

    #[test]
    fn test_invalid_selector() {
        let selectors = PageSelectors {
            row_checkbox: "[[".to_string(),
            ..Default::default()
        };
        let err = HtmlPage::parse(LIST_PAGE, &selectors).unwrap_err();
        assert!(matches!(err, SelectError::InvalidSelector { .. }));
    }
}
