//! Row, page and accumulator value types.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page assumed when the `page` query parameter is absent.
pub const DEFAULT_PAGE: &str = "1";

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_key!(
    /// Worksheet primary key. Unique across the whole list, stable across pages.
    RowId
);

string_key!(
    /// Display numbering captured with a row when it was checked (e.g. `"1.1"`).
    RowLabel
);

string_key!(
    /// Page number as it appears in the `page` query parameter.
    PageNumber
);

impl PageNumber {
    /// Resolve the raw `page` parameter, defaulting to the first page.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some(page) if !page.is_empty() => Self::new(page),
            _ => Self::new(DEFAULT_PAGE),
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE)
    }
}

/// Rows checked on a single page, `pk -> numbering`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSelection(BTreeMap<RowId, RowLabel>);

impl PageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row, replacing any label already stored for it.
    pub fn insert(&mut self, pk: RowId, label: RowLabel) {
        self.0.insert(pk, label);
    }

    pub fn get(&self, pk: &RowId) -> Option<&RowLabel> {
        self.0.get(pk)
    }

    pub fn contains(&self, pk: &RowId) -> bool {
        self.0.contains_key(pk)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, RowId, RowLabel> {
        self.0.iter()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.0.keys()
    }

    /// Copy every entry of `other` into this selection; `other` wins on collision.
    pub fn absorb(&mut self, other: &PageSelection) {
        for (pk, label) in other.iter() {
            self.0.insert(pk.clone(), label.clone());
        }
    }

    /// JSON object form, as sent to the download endpoint.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl FromIterator<(RowId, RowLabel)> for PageSelection {
    fn from_iter<I: IntoIterator<Item = (RowId, RowLabel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PageSelection {
    type Item = (&'a RowId, &'a RowLabel);
    type IntoIter = btree_map::Iter<'a, RowId, RowLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Selections for every page visited in the current pagination session.
///
/// Lives only in the URL. Page keys are opaque strings; their iteration order
/// carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionAccumulator(BTreeMap<PageNumber, PageSelection>);

impl SelectionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the raw `worksheet_all` value.
    ///
    /// The value is user-editable, so anything that is not a
    /// `{page: {pk: label}}` JSON object yields an empty accumulator.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Self::new(),
        };

        match serde_json::from_str(raw) {
            Ok(accumulator) => accumulator,
            Err(e) => {
                debug!("Ignoring unparsable worksheet_all value {:?}: {}", raw, e);
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Replace the entry for `page` with `selection`, keeping every other page.
    pub fn merged(mut self, page: PageNumber, selection: PageSelection) -> Self {
        self.0.insert(page, selection);
        self
    }

    pub fn page(&self, page: &PageNumber) -> Option<&PageSelection> {
        self.0.get(page)
    }

    /// Entries for every page except `current`.
    pub fn other_pages<'a>(
        &'a self,
        current: &'a PageNumber,
    ) -> impl Iterator<Item = (&'a PageNumber, &'a PageSelection)> + 'a {
        self.0.iter().filter(move |(page, _)| *page != current)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
