//! Database doubles for the release browser integration tests.

use async_trait::async_trait;
use diig_database::Database;
use diig_database::DatabaseError;
use diig_database::Entry;
use diig_database::MemoryDatabase;
use diig_database::Result;
use diig_database::ScanQuery;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tokio::sync::Semaphore;

/// A [`MemoryDatabase`] that counts calls, can be told to fail, and can hold
/// scans until the test releases them.
#[derive(Default)]
pub struct ScriptedDatabase {
    inner: MemoryDatabase,
    gets: AtomicUsize,
    scans: AtomicUsize,
    fail_gets: AtomicBool,
    fail_scans: AtomicBool,
    held: Mutex<Option<Arc<Semaphore>>>,
    queries: Mutex<Vec<ScanQuery>>,
}

impl ScriptedDatabase {
    pub fn new(inner: MemoryDatabase) -> Arc<Self> {
        Arc::new(Self {
            inner,
            ..Default::default()
        })
    }

    pub fn from_value(value: Value) -> Arc<Self> {
        Self::new(MemoryDatabase::from_value(value))
    }

    pub fn inner(&self) -> &MemoryDatabase {
        &self.inner
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Every scan query received so far
    pub fn queries(&self) -> Vec<ScanQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_scans(&self, fail: bool) {
        self.fail_scans.store(fail, Ordering::SeqCst);
    }

    /// Make every following scan wait for [`ScriptedDatabase::release_scans`].
    pub fn hold_scans(&self) {
        *self.held.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held scans through, oldest first.
    pub fn release_scans(&self, count: usize) {
        if let Some(gate) = self.held.lock().unwrap().as_ref() {
            gate.add_permits(count);
        }
    }
}

#[async_trait]
impl Database for ScriptedDatabase {
    async fn scan(&self, query: &ScanQuery) -> Result<Vec<Entry>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        let gate = self.held.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|err| DatabaseError::Unavailable(err.to_string()))?
                .forget();
        }

        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("scan refused".to_string()));
        }
        self.inner.scan(query).await
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(DatabaseError::PermissionDenied(path.to_string()));
        }
        self.inner.get(path).await
    }
}

/// Insert `count` releases keyed `{prefix}{n:03}` starting at `first`.
pub async fn seed(
    db: &MemoryDatabase,
    prefix: &str,
    first: usize,
    count: usize,
    store: &str,
    section: &str,
    view: &str,
) {
    for n in first..first + count {
        db.insert(
            "releases",
            &format!("{prefix}{n:03}"),
            json!({
                "store": store,
                "section": section,
                "view": view,
                "title": format!("Release {n}"),
            }),
        )
        .await
        .unwrap();
    }
}

/// Taxonomy with two stores, used by most scenarios.
pub fn taxonomy() -> Value {
    json!({
        "juno": {
            "sections": {
                "house": {"views": {"bestsellers": {}, "new": {}}},
                "techno": {}
            }
        },
        "redeye": {"sections": {"disco": {}}}
    })
}
