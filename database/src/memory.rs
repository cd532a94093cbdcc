use crate::Database;
use crate::error::DatabaseError;
use crate::error::Result;
use crate::query::Entry;
use crate::query::ScanOrder;
use crate::query::ScanQuery;
use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;

/// In-process keyed store holding a single JSON tree.
///
/// Children of a mapping are ordered lexicographically by key, which is the
/// order the remote store hands out push-generated keys in.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    root: Arc<RwLock<Value>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    pub fn from_value(root: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(root)),
        }
    }

    /// Load a JSON export of the whole tree.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        info!("Loading database dump from {}", path.display());
        let content = tokio::fs::read(path).await?;
        let root: Value = serde_json::from_slice(&content)?;
        Ok(Self::from_value(root))
    }

    /// Replace the value at `path`, creating intermediate mappings.
    pub async fn set(&self, path: &str, value: Value) -> Result<()> {
        let segments = split_path(path)?;
        let mut root = self.root.write().await;
        let mut node = &mut *root;
        for segment in segments {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                unreachable!("node was just made a mapping");
            };
            node = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        *node = value;
        Ok(())
    }

    /// Insert `value` as child `key` of the mapping at `path`.
    pub async fn insert(&self, path: &str, key: &str, value: Value) -> Result<()> {
        self.set(&format!("{path}/{key}"), value).await
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn scan(&self, query: &ScanQuery) -> Result<Vec<Entry>> {
        let segments = split_path(&query.path)?;
        let root = self.root.read().await;

        let children = match lookup(&root, &segments) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Object(children)) => children,
            Some(_) => return Err(DatabaseError::NotAMapping(query.path.clone())),
        };

        let mut entries: Vec<(&String, &Value)> = match &query.order {
            ScanOrder::Key => children.iter().collect(),
            ScanOrder::Child(field) => children
                .iter()
                .filter(|(_, value)| match &query.equal_to {
                    Some(expected) => {
                        value.get(field).and_then(Value::as_str) == Some(expected.as_str())
                    }
                    None => true,
                })
                .collect(),
        };

        match &query.order {
            ScanOrder::Key => entries.sort_by(|a, b| a.0.cmp(b.0)),
            ScanOrder::Child(field) => entries.sort_by(|a, b| {
                compare_child(a.1.get(field), b.1.get(field)).then_with(|| a.0.cmp(b.0))
            }),
        }

        let page: Vec<Entry> = entries
            .into_iter()
            .filter(|(key, _)| match &query.start_after {
                Some(after) => key.as_str() > after.as_str(),
                None => true,
            })
            .take(query.limit)
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
            .collect();

        debug!(
            "Scanned {} ({:?}, equal_to={:?}, start_after={:?}): {} of limit {}",
            query.path,
            query.order,
            query.equal_to,
            query.start_after,
            page.len(),
            query.limit
        );
        Ok(page)
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let segments = split_path(path)?;
        let root = self.root.read().await;
        Ok(lookup(&root, &segments)
            .filter(|value| !value.is_null())
            .cloned())
    }
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(DatabaseError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(DatabaseError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.get(*segment))
}

// Missing fields sort first, then by string form.
fn compare_child(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => sort_text(a).cmp(&sort_text(b)),
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
