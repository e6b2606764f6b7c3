//! Error types for worksheet selection tracking.
//!
//! Malformed `worksheet_all` state never shows up here: it degrades to an
//! empty accumulator instead. These errors cover the inputs a caller controls
//! (page URLs, selector configuration, files on disk).

use thiserror::Error;

/// Errors raised while setting up or driving a selection tracker.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The page URL could not be parsed.
    #[error("invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A configured CSS selector was rejected by the HTML parser.
    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// A configuration file could not be read or decoded.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SelectError>;
