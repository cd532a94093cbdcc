use crate::error::BrowseError;
use crate::error::Result;
use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Configuration for a browsing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Number of raw releases requested by the first-page fetch
    #[serde(default = "default_initial_load_size")]
    pub initial_load_size: usize,

    /// Number of raw releases requested by each continuation fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How long a fetched taxonomy may be reused without refetching
    #[serde(default = "default_freshness_window_hours")]
    pub freshness_window_hours: u32,

    /// Database path holding the releases
    #[serde(default = "default_releases_path")]
    pub releases_path: String,

    /// Database path holding the store/section/view taxonomy
    #[serde(default = "default_taxonomy_path")]
    pub taxonomy_path: String,

    /// Release field naming the store. Pushed to the database as an
    /// equality scan.
    #[serde(default = "default_store_field")]
    pub store_field: String,

    /// Release field naming the section (filtered client-side)
    #[serde(default = "default_section_field")]
    pub section_field: String,

    /// Release field naming the view (filtered client-side)
    #[serde(default = "default_view_field")]
    pub view_field: String,

    /// Separator used when joining the selection into a composite key
    #[serde(default = "default_key_separator")]
    pub key_separator: String,

    /// Route that is reachable without an authenticated principal
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_initial_load_size() -> usize {
    50
}

fn default_page_size() -> usize {
    20
}

fn default_freshness_window_hours() -> u32 {
    24
}

fn default_releases_path() -> String {
    "releases".to_string()
}

fn default_taxonomy_path() -> String {
    "stores".to_string()
}

fn default_store_field() -> String {
    "store".to_string()
}

fn default_section_field() -> String {
    "section".to_string()
}

fn default_view_field() -> String {
    "view".to_string()
}

fn default_key_separator() -> String {
    "-".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            initial_load_size: default_initial_load_size(),
            page_size: default_page_size(),
            freshness_window_hours: default_freshness_window_hours(),
            releases_path: default_releases_path(),
            taxonomy_path: default_taxonomy_path(),
            store_field: default_store_field(),
            section_field: default_section_field(),
            view_field: default_view_field(),
            key_separator: default_key_separator(),
            login_path: default_login_path(),
        }
    }
}

impl BrowseConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BrowseConfig =
            toml::from_str(content).map_err(|e| BrowseError::Config(e.to_string()))?;
        config.validate().map_err(BrowseError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::hours(i64::from(self.freshness_window_hours))
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.initial_load_size == 0 {
            return Err("initial_load_size must be > 0".to_string());
        }

        if self.page_size == 0 {
            return Err("page_size must be > 0".to_string());
        }

        for (name, value) in [
            ("releases_path", &self.releases_path),
            ("taxonomy_path", &self.taxonomy_path),
            ("store_field", &self.store_field),
            ("section_field", &self.section_field),
            ("view_field", &self.view_field),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }

        if self.initial_load_size < self.page_size {
            warn!(
                "initial_load_size ({}) is smaller than page_size ({})",
                self.initial_load_size, self.page_size
            );
        }

        Ok(())
    }
}
