//! Configuration management for worksheet-select using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectError};
use crate::page::PageSelectors;
use crate::query::QueryParams;
use crate::tracker::SelectionTracker;

/// Default endpoint receiving the `worksheet` selection.
pub const DEFAULT_DOWNLOAD_ENDPOINT: &str = "download-multiple-worksheet/";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Endpoint opened with the effective selection, relative to the list page.
    pub download_endpoint: String,
    /// Query parameter names.
    pub params: QueryParams,
    /// Selection controls in the rendered markup.
    pub selectors: PageSelectors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_endpoint: DEFAULT_DOWNLOAD_ENDPOINT.to_string(),
            params: QueryParams::default(),
            selectors: PageSelectors::default(),
        }
    }
}

impl Settings {
    pub fn tracker(&self) -> SelectionTracker {
        SelectionTracker::new(self.params.clone())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download endpoint URL.
    #[serde(default)]
    pub download_endpoint: Option<String>,
    /// Query parameter names.
    #[serde(default)]
    pub params: Option<QueryParams>,
    /// Markup selectors.
    #[serde(default)]
    pub selectors: Option<PageSelectors>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers worksheet-select config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("worksheet-select").await {
            Ok(pref_config) => {
                let download_endpoint: Option<String> =
                    pref_config.get("download_endpoint").ok();
                let params: Option<QueryParams> = pref_config.get("params").ok();
                let selectors: Option<PageSelectors> = pref_config.get("selectors").ok();

                Config {
                    download_endpoint,
                    params,
                    selectors,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
        let contents = fs::read_to_string(&path)
            .map_err(|e| SelectError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| SelectError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref endpoint) = self.download_endpoint {
            settings.download_endpoint = endpoint.clone();
        }
        if let Some(ref params) = self.params {
            settings.params = params.clone();
        }
        if let Some(ref selectors) = self.selectors {
            settings.selectors = selectors.clone();
        }
    }
}

/// Load settings from an explicit file, or from discovered configuration.
pub async fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load().await,
    };
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.download_endpoint, DEFAULT_DOWNLOAD_ENDPOINT);
        assert_eq!(settings.params.accumulator, "worksheet_all");
        assert_eq!(settings.selectors.pk_attribute, "worksheet-pk");
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
download_endpoint = "/en/qgis/download-multiple-worksheet/"

[params]
accumulator = "selected_all"

[selectors]
row_checkbox = ".row-select"
"#
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).await.unwrap();
        assert_eq!(
            settings.download_endpoint,
            "/en/qgis/download-multiple-worksheet/"
        );
        assert_eq!(settings.params.accumulator, "selected_all");
        // Unset fields in a provided table fall back to their defaults
        assert_eq!(settings.params.page, "page");
        assert_eq!(settings.selectors.row_checkbox, ".row-select");
        assert_eq!(settings.selectors.label_attribute, "worksheet-number");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(dir.path().join("missing.toml").as_path()))
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::Config(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "download_endpoint = [").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(SelectError::Config(_))
        ));
    }
}
