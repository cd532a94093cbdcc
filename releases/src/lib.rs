/*!
# Diig Releases

Incremental, filtered browsing of scraped record-store releases held in a
keyed [`Database`](diig_database::Database).

## Features

- **Taxonomy cache**: store → section → view tree, read once and reused for
  24 hours (also across restarts through [`PersistedState`])
- **Three-level filter**: changing a level resets the levels below it and
  reloads the first page
- **Pagination**: a large first page, smaller continuation pages, a cursor
  that follows the database's scan position, and a stale-response guard for
  fetches that finish after the selection changed
- **Access gate**: every navigation is checked against an [`AuthOracle`]

## Architecture

```text
AccessGate (before anything else)
  └─> Session
        ├─> TaxonomyCache ── freshness policy
        └─> PageEngine
              ├─> FilterSelection (generation-tagged)
              ├─> build_scan ──> Database::scan
              └─> PageState transitions (post-filter, cursor, exhaustion)
```

## Example

```rust,no_run
use diig_database::MemoryDatabase;
use diig_releases::{BrowseConfig, Session};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let db = MemoryDatabase::from_json_file("dump.json".as_ref()).await?;
    let session = Session::new(Arc::new(db), BrowseConfig::default());

    session.initialize().await?;
    session.set_store("juno").await?;
    session.load_more().await?;

    println!("{} releases loaded", session.page().items().len());
    Ok(())
}
```
*/

mod config;
mod engine;
mod error;
mod filter;
mod freshness;
mod gate;
mod page;
mod persist;
mod query;
mod release;
mod session;
mod taxonomy;

pub use config::BrowseConfig;
pub use engine::FetchOutcome;
pub use engine::PageEngine;
pub use error::BrowseError;
pub use error::Result;
pub use filter::ALL;
pub use filter::Choice;
pub use filter::FilterSelection;
pub use freshness::Clock;
pub use freshness::ManualClock;
pub use freshness::SystemClock;
pub use freshness::is_fresh;
pub use gate::AccessGate;
pub use gate::AuthOracle;
pub use gate::GateDecision;
pub use gate::Principal;
pub use page::PageState;
pub use page::PageSummary;
pub use page::SkipReason;
pub use persist::PersistedState;
pub use query::build_scan;
pub use query::matches;
pub use release::Release;
pub use session::Session;
pub use taxonomy::SectionNode;
pub use taxonomy::StoreNode;
pub use taxonomy::Taxonomy;
pub use taxonomy::TaxonomyCache;
