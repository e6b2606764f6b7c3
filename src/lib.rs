//! Cross-page worksheet selection for paginated download lists.
//!
//! A worksheet list is split over several pages. Rows checked on each page are
//! collected into a [`SelectionAccumulator`] that travels in the `worksheet_all`
//! query parameter of every pagination link, so a single download can cover
//! rows selected on any page visited in the session.
//!
//! - [`selection`]: row, page and accumulator value types
//! - [`query`]: page URL parsing and link rewriting
//! - [`tracker`]: merge, restore and collect operations
//! - [`page`]: the page adapter trait and its HTML-backed implementation
//! - [`controller`]: page-load, checkbox and download event handlers

pub mod config;
pub mod controller;
pub mod error;
pub mod page;
pub mod query;
pub mod selection;
pub mod tracker;

pub use config::{load_settings, Config, Settings};
pub use controller::{DownloadRequest, SelectionController};
pub use error::{Result, SelectError};
pub use page::{HtmlPage, PageSelectors, RowCheckbox, SelectionPage, ToggleStyle};
pub use query::{PageLocation, QueryParams};
pub use selection::{PageNumber, PageSelection, RowId, RowLabel, SelectionAccumulator};
pub use tracker::SelectionTracker;
