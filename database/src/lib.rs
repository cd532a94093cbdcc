//! # Diig Database
//!
//! The keyed-store seam used by the release browser. A [`Database`] is an
//! ordered tree of JSON values addressed by `/`-separated paths. It supports
//! two kinds of reads:
//!
//! - ordered range scans over the children of a path ([`ScanQuery`]), either
//!   over the full key range or restricted to children whose named field
//!   equals a value, resumable strictly after a given key and bounded by a
//!   result-count limit;
//! - point reads of a path returning an arbitrary nested value.
//!
//! [`MemoryDatabase`] is the in-process implementation. It is used by tests
//! and by the CLI, which loads it from a JSON dump of the remote tree.
//!
//! ## Example
//!
//! ```no_run
//! use diig_database::{Database, MemoryDatabase, ScanQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = MemoryDatabase::from_json_file("dump.json".as_ref()).await?;
//!     let page = db.scan(&ScanQuery::by_key("releases", 50)).await?;
//!     println!("first page has {} entries", page.len());
//!     Ok(())
//! }
//! ```

mod error;
mod memory;
mod query;

pub use error::DatabaseError;
pub use error::Result;
pub use memory::MemoryDatabase;
pub use query::Entry;
pub use query::ScanOrder;
pub use query::ScanQuery;

use async_trait::async_trait;
use serde_json::Value;

/// Remote keyed store supporting ordered range scans and point reads.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run an ordered range scan over the children of `query.path`.
    ///
    /// Entries are returned in scan order: by key for [`ScanOrder::Key`], by
    /// the child field and then by key for [`ScanOrder::Child`].
    async fn scan(&self, query: &ScanQuery) -> Result<Vec<Entry>>;

    /// Read the value stored at `path`. `Ok(None)` means the store was
    /// reachable but holds no data there.
    async fn get(&self, path: &str) -> Result<Option<Value>>;
}
