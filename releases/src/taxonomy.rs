use crate::error::BrowseError;
use crate::error::Result;
use crate::filter::ALL;
use crate::freshness::Clock;
use crate::freshness::is_fresh;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use diig_database::Database;
use diig_database::DatabaseError;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Store → section → view classification of releases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    stores: BTreeMap<String, StoreNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreNode {
    #[serde(default)]
    pub sections: BTreeMap<String, SectionNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    /// View name to whatever the scraper stores under it
    #[serde(default)]
    pub views: BTreeMap<String, Value>,
}

impl Taxonomy {
    /// Decode the raw tree stored in the database.
    ///
    /// Each level may be a mapping (its keys are the names) or a list of
    /// names. Sibling keys other than `sections`/`views` are ignored, so the
    /// scraper's per-store settings can live next to the classification.
    pub fn from_value(value: &Value) -> Option<Self> {
        let stores = value.as_object()?;
        let stores = stores
            .iter()
            .map(|(store, node)| {
                let sections = children(node.get("sections"))
                    .into_iter()
                    .map(|(section, node)| {
                        let views = children(node.get("views")).into_iter().collect();
                        (section, SectionNode { views })
                    })
                    .collect();
                (store.clone(), StoreNode { sections })
            })
            .collect();
        Some(Self { stores })
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn sections(&self, store: &str) -> impl Iterator<Item = &str> {
        self.stores
            .get(store)
            .into_iter()
            .flat_map(|node| node.sections.keys().map(String::as_str))
    }

    pub fn views(&self, store: &str, section: &str) -> impl Iterator<Item = &str> {
        self.stores
            .get(store)
            .and_then(|node| node.sections.get(section))
            .into_iter()
            .flat_map(|node| node.views.keys().map(String::as_str))
    }

    pub fn available_stores(&self) -> Vec<String> {
        with_all(self.stores())
    }

    pub fn available_sections(&self, store: &str) -> Vec<String> {
        if store == ALL {
            return with_all(std::iter::empty());
        }
        with_all(self.sections(store))
    }

    pub fn available_views(&self, store: &str, section: &str) -> Vec<String> {
        if store == ALL || section == ALL {
            return with_all(std::iter::empty());
        }
        with_all(self.views(store, section))
    }
}

// A list of names carries no leaf values; each name maps to null.
fn children(node: Option<&Value>) -> Vec<(String, Value)> {
    match node {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|name| (name.to_string(), Value::Null))
            .collect(),
        _ => Vec::new(),
    }
}

// `names` is already sorted; a literal "all" would shadow the sentinel.
fn with_all<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    std::iter::once(ALL)
        .chain(names.filter(|name| *name != ALL))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
struct Cached {
    taxonomy: Arc<Taxonomy>,
    fetched_at: DateTime<Utc>,
}

/// Process-local cache of the taxonomy with a fetch timestamp.
pub struct TaxonomyCache {
    path: String,
    window: Duration,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<Cached>>,
}

impl TaxonomyCache {
    pub fn new(path: impl Into<String>, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            window,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached taxonomy while it is fresh, otherwise read it from
    /// `db`. `force` skips the freshness check.
    ///
    /// A failed or empty read leaves the previous cache in place.
    pub async fn load(&self, db: &dyn Database, force: bool) -> Result<Arc<Taxonomy>> {
        if !force {
            if let Some(taxonomy) = self.fresh() {
                debug!("Using cached taxonomy");
                return Ok(taxonomy);
            }
        }

        let value = match db.get(&self.path).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                warn!("No taxonomy data found at {}", self.path);
                return Err(BrowseError::TaxonomyEmpty(self.path.clone()));
            }
            Err(err) => {
                warn!("Error loading taxonomy: {err}");
                return Err(BrowseError::TaxonomyFetchFailed(err));
            }
        };

        let taxonomy = Taxonomy::from_value(&value).ok_or_else(|| {
            BrowseError::TaxonomyFetchFailed(DatabaseError::NotAMapping(self.path.clone()))
        })?;
        if taxonomy.is_empty() {
            warn!("Taxonomy at {} has no stores", self.path);
            return Err(BrowseError::TaxonomyEmpty(self.path.clone()));
        }

        let taxonomy = Arc::new(taxonomy);
        let stores: Vec<&str> = taxonomy.stores().collect();
        info!("Loaded taxonomy: {stores:?}");
        self.replace(Some(Cached {
            taxonomy: Arc::clone(&taxonomy),
            fetched_at: self.clock.now(),
        }));
        Ok(taxonomy)
    }

    /// Cached taxonomy regardless of age
    pub fn current(&self) -> Option<Arc<Taxonomy>> {
        self.lock().as_ref().map(|cached| Arc::clone(&cached.taxonomy))
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.lock().as_ref().map(|cached| cached.fetched_at)
    }

    /// Cached taxonomy if it is still inside the freshness window
    pub fn fresh(&self) -> Option<Arc<Taxonomy>> {
        let now = self.clock.now();
        self.lock()
            .as_ref()
            .filter(|cached| is_fresh(cached.fetched_at, now, self.window))
            .map(|cached| Arc::clone(&cached.taxonomy))
    }

    /// Seed the cache from persisted state.
    pub fn restore(&self, taxonomy: Taxonomy, fetched_at: DateTime<Utc>) {
        self.replace(Some(Cached {
            taxonomy: Arc::new(taxonomy),
            fetched_at,
        }));
    }

    pub fn reset(&self) {
        self.replace(None);
    }

    pub fn available_stores(&self) -> Vec<String> {
        match self.current() {
            Some(taxonomy) => taxonomy.available_stores(),
            None => vec![ALL.to_string()],
        }
    }

    pub fn available_sections(&self, store: &str) -> Vec<String> {
        match self.current() {
            Some(taxonomy) => taxonomy.available_sections(store),
            None => vec![ALL.to_string()],
        }
    }

    pub fn available_views(&self, store: &str, section: &str) -> Vec<String> {
        match self.current() {
            Some(taxonomy) => taxonomy.available_views(store, section),
            None => vec![ALL.to_string()],
        }
    }

    fn replace(&self, cached: Option<Cached>) {
        *self.lock() = cached;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Cached>> {
        match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
