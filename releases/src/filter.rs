//! The three-level store → section → view filter.

use crate::error::BrowseError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Sentinel meaning "no filter at this level".
pub const ALL: &str = "all";

/// One level of the filter: either every value or a concrete one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    #[default]
    All,
    Value(String),
}

impl Choice {
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    /// The concrete value, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            Choice::All => None,
            Choice::Value(value) => Some(value),
        }
    }

    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ALL)
    }
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        if value == ALL {
            Choice::All
        } else {
            Choice::Value(value)
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::from(value.to_string())
    }
}

impl From<Option<String>> for Choice {
    fn from(value: Option<String>) -> Self {
        value.map_or(Choice::All, Choice::from)
    }
}

impl From<Choice> for String {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::All => ALL.to_string(),
            Choice::Value(value) => value,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store/section/view selection.
///
/// A deeper level is only ever concrete when every level above it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    store: Choice,
    #[serde(default)]
    section: Choice,
    #[serde(default)]
    view: Choice,
}

impl FilterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &Choice {
        &self.store
    }

    pub fn section(&self) -> &Choice {
        &self.section
    }

    pub fn view(&self) -> &Choice {
        &self.view
    }

    /// Select a store. Section and view go back to "all".
    pub fn set_store(&mut self, store: Choice) {
        self.store = store;
        self.section = Choice::All;
        self.view = Choice::All;
    }

    /// Select a section. View goes back to "all".
    pub fn set_section(&mut self, section: Choice) -> Result<()> {
        if !section.is_all() && self.store.is_all() {
            return Err(BrowseError::InvalidSelection(format!(
                "section {section} requires a store"
            )));
        }
        self.section = section;
        self.view = Choice::All;
        Ok(())
    }

    pub fn set_view(&mut self, view: Choice) -> Result<()> {
        if !view.is_all() && self.section.is_all() {
            return Err(BrowseError::InvalidSelection(format!(
                "view {view} requires a section"
            )));
        }
        self.view = view;
        Ok(())
    }

    /// Join the concrete levels with `separator`; `None` when no store is
    /// selected and nothing is filtered on the database side.
    pub fn composite_key(&self, separator: &str) -> Option<String> {
        let store = self.store.value()?;
        let mut parts = vec![store];
        if let Some(section) = self.section.value() {
            parts.push(section);
            if let Some(view) = self.view.value() {
                parts.push(view);
            }
        }
        Some(parts.join(separator))
    }

    /// Drop deeper levels that a decoded selection set without their parent.
    pub fn normalized(mut self) -> Self {
        if self.store.is_all() {
            self.section = Choice::All;
        }
        if self.section.is_all() {
            self.view = Choice::All;
        }
        self
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.store, self.section, self.view)
    }
}
