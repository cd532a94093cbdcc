//! Page state and its transitions.
//!
//! `PageState` is only changed through the named transitions below. The
//! pagination engine decides when each one runs; this module decides what it
//! does to the state.

use crate::filter::FilterSelection;
use crate::query::matches;
use crate::release::Release;

/// Releases loaded so far for the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    items: Vec<Release>,
    cursor: Option<String>,
    exhausted: bool,
    /// Generation of the fetch in flight, if any
    in_flight: Option<u64>,
}

/// Why a fetch request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch for the same selection is in flight
    Busy,
    /// The database has no more releases for the selection
    Exhausted,
    /// No first page has been loaded to continue from
    NoCursor,
}

/// What a completed fetch did to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    /// Releases returned by the database
    pub raw: usize,
    /// Releases that passed the client-side filter and were added
    pub added: usize,
    pub exhausted: bool,
}

impl PageState {
    pub fn items(&self) -> &[Release] {
        &self.items
    }

    /// Key of the last raw release returned by the database
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Forget everything, including a fetch in flight for an older selection.
    pub(crate) fn invalidate(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn begin_first_page(&mut self, generation: u64) -> Result<(), SkipReason> {
        if self.is_loading() {
            return Err(SkipReason::Busy);
        }
        self.invalidate();
        self.in_flight = Some(generation);
        Ok(())
    }

    /// Returns the cursor to resume from.
    pub(crate) fn begin_continuation(&mut self, generation: u64) -> Result<String, SkipReason> {
        if self.is_loading() {
            return Err(SkipReason::Busy);
        }
        if self.exhausted {
            return Err(SkipReason::Exhausted);
        }
        let cursor = self.cursor.clone().ok_or(SkipReason::NoCursor)?;
        self.in_flight = Some(generation);
        Ok(cursor)
    }

    pub(crate) fn complete_first_page(
        &mut self,
        raw: Vec<Release>,
        selection: &FilterSelection,
        limit: usize,
    ) -> PageSummary {
        let raw_len = raw.len();
        self.cursor = raw.last().map(|release| release.id.clone());
        self.items = raw
            .into_iter()
            .filter(|release| matches(selection, release))
            .collect();
        // A short raw page ends the scan even if the filter kept nothing.
        self.exhausted = raw_len < limit;
        self.in_flight = None;

        PageSummary {
            raw: raw_len,
            added: self.items.len(),
            exhausted: self.exhausted,
        }
    }

    pub(crate) fn fail_first_page(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.exhausted = false;
        self.in_flight = None;
    }

    pub(crate) fn complete_continuation(
        &mut self,
        raw: Vec<Release>,
        selection: &FilterSelection,
        limit: usize,
    ) -> PageSummary {
        let raw_len = raw.len();
        if raw_len < limit || raw_len == 0 {
            self.exhausted = true;
        }
        // Advance past every raw release, kept or not, so a page the filter
        // empties is never scanned again.
        if let Some(last) = raw.last() {
            self.cursor = Some(last.id.clone());
        }
        let before = self.items.len();
        self.items
            .extend(raw.into_iter().filter(|release| matches(selection, release)));
        self.in_flight = None;

        PageSummary {
            raw: raw_len,
            added: self.items.len() - before,
            exhausted: self.exhausted,
        }
    }

    pub(crate) fn fail_continuation(&mut self) {
        self.in_flight = None;
    }
}
