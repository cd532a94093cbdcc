//! Query construction for release pages.
//!
//! The database scans one field at a time, so only the store is pushed down
//! as an equality scan. Section and view are matched on the client against
//! each page the database returns.

use crate::config::BrowseConfig;
use crate::filter::Choice;
use crate::filter::FilterSelection;
use crate::release::Release;
use diig_database::ScanQuery;

/// Scan for the page following `cursor` (or the first page when `None`).
pub fn build_scan(
    config: &BrowseConfig,
    selection: &FilterSelection,
    cursor: Option<&str>,
    limit: usize,
) -> ScanQuery {
    let query = match selection.store() {
        Choice::All => ScanQuery::by_key(&config.releases_path, limit),
        Choice::Value(store) => ScanQuery::by_child_equal(
            &config.releases_path,
            &config.store_field,
            store,
            limit,
        ),
    };
    match cursor {
        Some(cursor) => query.start_after(cursor),
        None => query,
    }
}

/// Whether `release` passes the client-side section/view filter.
pub fn matches(selection: &FilterSelection, release: &Release) -> bool {
    level_matches(selection.section(), release.section.as_deref())
        && level_matches(selection.view(), release.view.as_deref())
}

fn level_matches(choice: &Choice, actual: Option<&str>) -> bool {
    match choice.value() {
        None => true,
        Some(expected) => actual == Some(expected),
    }
}
