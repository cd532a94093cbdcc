use crate::error::Result;
use crate::filter::FilterSelection;
use crate::taxonomy::Taxonomy;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Client-side state that survives a restart.
///
/// Loaded pages are deliberately absent; they are always fetched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Version of the state format
    pub version: u32,

    #[serde(default)]
    pub selection: FilterSelection,

    #[serde(default)]
    pub taxonomy: Option<Taxonomy>,

    /// When `taxonomy` was read from the database
    #[serde(default)]
    pub last_fetched: Option<DateTime<Utc>>,

    #[serde(default)]
    pub initialized: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            selection: FilterSelection::default(),
            taxonomy: None,
            last_fetched: None,
            initialized: false,
        }
    }
}

impl PersistedState {
    const CURRENT_VERSION: u32 = 1;
    const STATE_FILENAME: &'static str = "browse-state.json";

    /// Load state from `state_dir`, falling back to a fresh state when the
    /// file is missing, unreadable as JSON, or was written by another format
    /// version.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let state_path = state_dir.join(Self::STATE_FILENAME);

        if !state_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&state_path)?;
        let state: PersistedState = match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "Unreadable browse state at {}: {err}. Starting fresh.",
                    state_path.display()
                );
                return Ok(Self::default());
            }
        };

        if state.version != Self::CURRENT_VERSION {
            warn!(
                "Browse state version mismatch: {} vs {}. Starting fresh.",
                state.version,
                Self::CURRENT_VERSION
            );
            return Ok(Self::default());
        }

        Ok(state)
    }

    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;

        let state_path = state_dir.join(Self::STATE_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&state_path, content)?;

        Ok(())
    }
}
