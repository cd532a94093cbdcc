use serde_json::Value;

/// One `(key, value)` pair returned by a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Ordering of a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOrder {
    /// Order children by their key.
    Key,
    /// Order children by the value of the named field, then by key.
    Child(String),
}

/// An ordered range scan over the children of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanQuery {
    /// Path whose children are scanned
    pub path: String,

    /// Scan ordering
    pub order: ScanOrder,

    /// Only return children whose ordering field equals this value.
    /// Ignored for [`ScanOrder::Key`].
    pub equal_to: Option<String>,

    /// Resume strictly after this key
    pub start_after: Option<String>,

    /// Maximum number of entries returned
    pub limit: usize,
}

impl ScanQuery {
    /// Full-range scan ordered by key.
    pub fn by_key(path: impl Into<String>, limit: usize) -> Self {
        Self {
            path: path.into(),
            order: ScanOrder::Key,
            equal_to: None,
            start_after: None,
            limit,
        }
    }

    /// Equality scan on `field`, ordered by that field and then by key.
    pub fn by_child_equal(
        path: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            path: path.into(),
            order: ScanOrder::Child(field.into()),
            equal_to: Some(value.into()),
            start_after: None,
            limit,
        }
    }

    /// Resume the scan strictly after `key`.
    pub fn start_after(mut self, key: impl Into<String>) -> Self {
        self.start_after = Some(key.into());
        self
    }
}
