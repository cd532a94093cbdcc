use crate::config::BrowseConfig;
use crate::error::BrowseError;
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::page::PageState;
use crate::page::PageSummary;
use crate::page::SkipReason;
use crate::query::build_scan;
use crate::release::Release;
use diig_database::Database;
use diig_database::Entry;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Result of a first-page or continuation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fetch completed and was applied to the page
    Loaded(PageSummary),
    /// Nothing was fetched
    Skipped(SkipReason),
    /// The selection changed while the fetch was in flight; its result was
    /// dropped
    Stale,
}

struct EngineState {
    /// Bumped on every selection change or invalidation
    generation: u64,
    selection: FilterSelection,
    page: PageState,
}

/// Fetches pages of releases for the current selection.
///
/// The state lock is never held across a database call. Each fetch records
/// the generation it started under and is only applied if that generation is
/// still current when the database answers.
pub struct PageEngine {
    db: Arc<dyn Database>,
    config: Arc<BrowseConfig>,
    state: Mutex<EngineState>,
}

impl PageEngine {
    pub fn new(
        db: Arc<dyn Database>,
        config: Arc<BrowseConfig>,
        selection: FilterSelection,
    ) -> Self {
        Self {
            db,
            config,
            state: Mutex::new(EngineState {
                generation: 0,
                selection,
                page: PageState::default(),
            }),
        }
    }

    pub fn selection(&self) -> FilterSelection {
        self.lock().selection.clone()
    }

    /// Snapshot of the page for the current selection
    pub fn page(&self) -> PageState {
        self.lock().page.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Apply `change` to the selection. On success the page is invalidated
    /// and any fetch in flight becomes stale. On error nothing changes.
    pub fn reselect<F>(&self, change: F) -> Result<FilterSelection>
    where
        F: FnOnce(&mut FilterSelection) -> Result<()>,
    {
        let mut state = self.lock();
        let mut selection = state.selection.clone();
        change(&mut selection)?;
        Self::commit(&mut state, selection.clone());
        Ok(selection)
    }

    /// Select "all" at every level, with the same invalidation as
    /// [`PageEngine::reselect`].
    pub fn clear_selection(&self) {
        let mut state = self.lock();
        Self::commit(&mut state, FilterSelection::all());
    }

    fn commit(state: &mut EngineState, selection: FilterSelection) {
        state.generation += 1;
        state.page.invalidate();
        debug!(
            "Selection changed to {selection} (generation {})",
            state.generation
        );
        state.selection = selection;
    }

    /// Drop the page and orphan any fetch in flight, keeping the selection.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.page.invalidate();
    }

    /// Fetch the first page for the current selection, replacing the page.
    pub async fn load_releases(&self) -> Result<FetchOutcome> {
        let limit = self.config.initial_load_size;
        let (generation, selection, query) = {
            let mut state = self.lock();
            let generation = state.generation;
            if let Err(reason) = state.page.begin_first_page(generation) {
                debug!("Skipping first-page fetch: {reason:?}");
                return Ok(FetchOutcome::Skipped(reason));
            }
            let query = build_scan(&self.config, &state.selection, None, limit);
            (generation, state.selection.clone(), query)
        };

        let fetched = self.db.scan(&query).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!("Discarding stale first page for {selection}");
            return Ok(FetchOutcome::Stale);
        }
        match fetched {
            Ok(entries) => {
                let raw = self.to_releases(entries);
                let summary = state.page.complete_first_page(raw, &selection, limit);
                info!(
                    "Loaded releases: {} of {} for {selection}",
                    summary.added, summary.raw
                );
                Ok(FetchOutcome::Loaded(summary))
            }
            Err(err) => {
                state.page.fail_first_page();
                warn!("Error loading releases for {selection}: {err}");
                Err(BrowseError::PageFetchFailed(err))
            }
        }
    }

    /// Fetch the page after the cursor and append what passes the filter.
    pub async fn load_more(&self) -> Result<FetchOutcome> {
        let limit = self.config.page_size;
        let (generation, selection, query) = {
            let mut state = self.lock();
            let generation = state.generation;
            let cursor = match state.page.begin_continuation(generation) {
                Ok(cursor) => cursor,
                Err(reason) => {
                    debug!("Skipping continuation fetch: {reason:?}");
                    return Ok(FetchOutcome::Skipped(reason));
                }
            };
            let query = build_scan(&self.config, &state.selection, Some(&cursor), limit);
            (generation, state.selection.clone(), query)
        };

        let fetched = self.db.scan(&query).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!("Discarding stale continuation for {selection}");
            return Ok(FetchOutcome::Stale);
        }
        match fetched {
            Ok(entries) => {
                let raw = self.to_releases(entries);
                let summary = state.page.complete_continuation(raw, &selection, limit);
                info!(
                    "Loaded {} more releases ({} raw) for {selection}",
                    summary.added, summary.raw
                );
                Ok(FetchOutcome::Loaded(summary))
            }
            Err(err) => {
                state.page.fail_continuation();
                warn!("Error loading more releases for {selection}: {err}");
                Err(BrowseError::PageFetchFailed(err))
            }
        }
    }

    fn to_releases(&self, entries: Vec<Entry>) -> Vec<Release> {
        entries
            .into_iter()
            .map(|entry| Release::from_entry(entry, &self.config))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
