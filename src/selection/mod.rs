//! Selection state carried across paginated list views.
//!
//! - [`PageSelection`]: rows checked on one page (`pk -> numbering`)
//! - [`SelectionAccumulator`]: every visited page's selection, keyed by page
//!   number, serialised as JSON into the `worksheet_all` query parameter

mod accumulator;

pub use accumulator::{PageNumber, PageSelection, RowId, RowLabel, SelectionAccumulator};
