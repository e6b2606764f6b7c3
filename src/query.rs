//! Query-string handling for the page URL and pagination links.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use crate::error::{Result, SelectError};
use crate::selection::{PageNumber, PageSelection, SelectionAccumulator};

/// Names of the query parameters the tracker reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, prefer::FromValue)]
pub struct QueryParams {
    /// Current page number of the list view.
    #[serde(default = "default_page_param")]
    pub page: String,
    /// JSON-encoded selection accumulator.
    #[serde(default = "default_accumulator_param")]
    pub accumulator: String,
    /// Effective selection handed to the download endpoint.
    #[serde(default = "default_download_param")]
    pub download: String,
}

fn default_page_param() -> String {
    "page".to_string()
}
fn default_accumulator_param() -> String {
    "worksheet_all".to_string()
}
fn default_download_param() -> String {
    "worksheet".to_string()
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: default_page_param(),
            accumulator: default_accumulator_param(),
            download: default_download_param(),
        }
    }
}

/// URL of the list page currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(url: &str) -> Result<Self> {
        Url::parse(url)
            .map(Self::from_url)
            .map_err(|source| SelectError::InvalidUrl {
                url: url.to_string(),
                source,
            })
    }

    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// First value of a query parameter, decoded.
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn current_page(&self, params: &QueryParams) -> PageNumber {
        PageNumber::from_query(self.query_value(&params.page).as_deref())
    }

    /// Accumulator carried in the URL; empty when absent or malformed.
    pub fn accumulator(&self, params: &QueryParams) -> SelectionAccumulator {
        SelectionAccumulator::parse(self.query_value(&params.accumulator).as_deref())
    }

    /// Location reached by following `href` from this page.
    pub fn follow(&self, href: &str) -> Result<Self> {
        self.url
            .join(href)
            .map(Self::from_url)
            .map_err(|source| SelectError::InvalidUrl {
                url: href.to_string(),
                source,
            })
    }
}

/// Rewrite `href` so it carries `accumulator` under `param`.
///
/// Any existing `param` entries are dropped first, so applying this twice
/// with the same accumulator is a no-op the second time. Works on relative
/// hrefs (`?page=2`) as well as absolute ones and keeps `#fragment`s.
pub fn with_accumulator(href: &str, param: &str, accumulator: &SelectionAccumulator) -> String {
    let (before_fragment, fragment) = match href.find('#') {
        Some(idx) => href.split_at(idx),
        None => (href, ""),
    };
    let (path, query) = match before_fragment.find('?') {
        Some(idx) => (&before_fragment[..idx], &before_fragment[idx + 1..]),
        None => (before_fragment, ""),
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != param {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.append_pair(param, &accumulator.to_json());

    format!("{}?{}{}", path, serializer.finish(), fragment)
}

/// Download endpoint URL carrying `selection` as JSON under `param`.
pub fn download_url(endpoint: &str, param: &str, selection: &PageSelection) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        endpoint,
        separator,
        param,
        urlencoding::encode(&selection.to_json())
    )
}
