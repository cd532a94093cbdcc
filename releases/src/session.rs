//! One browsing session: taxonomy cache, filter selection and pages.

use crate::config::BrowseConfig;
use crate::engine::FetchOutcome;
use crate::engine::PageEngine;
use crate::error::Result;
use crate::filter::Choice;
use crate::filter::FilterSelection;
use crate::freshness::Clock;
use crate::freshness::SystemClock;
use crate::freshness::is_fresh;
use crate::page::PageState;
use crate::persist::PersistedState;
use crate::taxonomy::Taxonomy;
use crate::taxonomy::TaxonomyCache;
use diig_database::Database;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tracing::debug;
use tracing::warn;

/// Owned context for one view over the release database.
///
/// Sessions share nothing with each other, so several can browse the same
/// database independently.
pub struct Session {
    config: Arc<BrowseConfig>,
    db: Arc<dyn Database>,
    taxonomy: TaxonomyCache,
    engine: PageEngine,
    initialized: AtomicBool,
}

impl Session {
    pub fn new(db: Arc<dyn Database>, config: BrowseConfig) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Arc<dyn Database>, config: BrowseConfig, clock: Arc<dyn Clock>) -> Self {
        Self::restore(db, config, clock, PersistedState::default())
    }

    /// Rebuild a session from persisted state. The page always starts empty.
    /// The initialized flag only survives while the cached taxonomy is fresh,
    /// so a stale cache is read again by the next [`Session::initialize`].
    pub fn restore(
        db: Arc<dyn Database>,
        config: BrowseConfig,
        clock: Arc<dyn Clock>,
        state: PersistedState,
    ) -> Self {
        let config = Arc::new(config);
        let taxonomy = TaxonomyCache::new(
            config.taxonomy_path.clone(),
            config.freshness_window(),
            Arc::clone(&clock),
        );

        let mut fresh = false;
        if let (Some(cached), Some(fetched_at)) = (state.taxonomy, state.last_fetched) {
            fresh = is_fresh(fetched_at, clock.now(), config.freshness_window());
            taxonomy.restore(cached, fetched_at);
        }

        let engine = PageEngine::new(
            Arc::clone(&db),
            Arc::clone(&config),
            state.selection.normalized(),
        );

        Self {
            config,
            db,
            taxonomy,
            engine,
            initialized: AtomicBool::new(state.initialized && fresh),
        }
    }

    /// State to persist across restarts
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            selection: self.engine.selection(),
            taxonomy: self.taxonomy.current().map(|taxonomy| (*taxonomy).clone()),
            last_fetched: self.taxonomy.fetched_at(),
            initialized: self.is_initialized(),
            ..Default::default()
        }
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Make the taxonomy available. Later calls return immediately.
    ///
    /// A failure is returned to the caller but still marks the session
    /// initialized; option lists then degrade to `["all"]` until
    /// [`Session::refresh_taxonomy`] succeeds.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            debug!("Session already initialized");
            return Ok(());
        }

        let loaded = self.taxonomy.load(self.db.as_ref(), false).await;
        self.initialized.store(true, Ordering::SeqCst);
        if let Err(err) = &loaded {
            warn!("Continuing without taxonomy: {err}");
        }
        loaded.map(|_| ())
    }

    /// Read the taxonomy again regardless of its age.
    pub async fn refresh_taxonomy(&self) -> Result<Arc<Taxonomy>> {
        self.taxonomy.load(self.db.as_ref(), true).await
    }

    pub fn taxonomy(&self) -> Option<Arc<Taxonomy>> {
        self.taxonomy.current()
    }

    pub fn available_stores(&self) -> Vec<String> {
        self.taxonomy.available_stores()
    }

    /// Sections of the selected store
    pub fn available_sections(&self) -> Vec<String> {
        let selection = self.engine.selection();
        self.taxonomy.available_sections(selection.store().as_str())
    }

    /// Views of the selected store and section
    pub fn available_views(&self) -> Vec<String> {
        let selection = self.engine.selection();
        self.taxonomy
            .available_views(selection.store().as_str(), selection.section().as_str())
    }

    pub fn selection(&self) -> FilterSelection {
        self.engine.selection()
    }

    pub fn composite_key(&self) -> Option<String> {
        self.engine
            .selection()
            .composite_key(&self.config.key_separator)
    }

    pub fn page(&self) -> PageState {
        self.engine.page()
    }

    /// Select a store (resetting section and view) and load its first page.
    pub async fn set_store(&self, store: impl Into<Choice>) -> Result<FetchOutcome> {
        let store = store.into();
        self.engine.reselect(|selection| {
            selection.set_store(store);
            Ok(())
        })?;
        self.engine.load_releases().await
    }

    /// Select a section (resetting the view) and load its first page.
    pub async fn set_section(&self, section: impl Into<Choice>) -> Result<FetchOutcome> {
        let section = section.into();
        self.engine
            .reselect(|selection| selection.set_section(section))?;
        self.engine.load_releases().await
    }

    pub async fn set_view(&self, view: impl Into<Choice>) -> Result<FetchOutcome> {
        let view = view.into();
        self.engine.reselect(|selection| selection.set_view(view))?;
        self.engine.load_releases().await
    }

    /// Replace the whole selection at once and load its first page.
    pub async fn select(&self, selection: FilterSelection) -> Result<FetchOutcome> {
        let selection = selection.normalized();
        self.engine.reselect(|current| {
            *current = selection;
            Ok(())
        })?;
        self.engine.load_releases().await
    }

    pub async fn load_releases(&self) -> Result<FetchOutcome> {
        self.engine.load_releases().await
    }

    pub async fn load_more(&self) -> Result<FetchOutcome> {
        self.engine.load_more().await
    }

    /// Back to a brand-new session: no pages, no taxonomy, everything "all".
    pub fn reset(&self) {
        self.engine.clear_selection();
        self.taxonomy.reset();
        self.initialized.store(false, Ordering::SeqCst);
    }
}
