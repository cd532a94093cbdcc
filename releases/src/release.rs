use crate::config::BrowseConfig;
use diig_database::Entry;
use serde_json::Map;
use serde_json::Value;

/// A release as listed by one store.
///
/// The database stays authoritative; a `Release` is a client-side copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Key assigned by the database
    pub id: String,

    pub store: String,

    pub section: Option<String>,

    pub view: Option<String>,

    /// Every other field of the stored value (artist, title, link, ...)
    pub payload: Map<String, Value>,
}

impl Release {
    /// Build a release from a scanned entry, using the configured field
    /// names for the three taxonomy levels.
    pub fn from_entry(entry: Entry, config: &BrowseConfig) -> Self {
        let mut payload = match entry.value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let store = take_text(&mut payload, &config.store_field).unwrap_or_default();
        let section = take_text(&mut payload, &config.section_field);
        let view = take_text(&mut payload, &config.view_field);

        Self {
            id: entry.key,
            store,
            section,
            view,
            payload,
        }
    }

    /// String field from the payload
    pub fn text(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }
}

fn take_text(map: &mut Map<String, Value>, field: &str) -> Option<String> {
    match map.remove(field) {
        Some(Value::String(text)) => Some(text),
        Some(other) if !other.is_null() => {
            // Keep non-text values visible instead of dropping them.
            map.insert(field.to_string(), other);
            None
        }
        _ => None,
    }
}
