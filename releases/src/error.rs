use diig_database::DatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    /// Transport or permission failure while reading the taxonomy. Any
    /// previously cached taxonomy stays usable.
    #[error("Failed to fetch taxonomy: {0}")]
    TaxonomyFetchFailed(#[source] DatabaseError),

    /// The database was reachable but holds no taxonomy.
    #[error("No taxonomy data found at {0}")]
    TaxonomyEmpty(String),

    /// Transport or permission failure while fetching a page of releases.
    #[error("Failed to fetch releases page: {0}")]
    PageFetchFailed(#[source] DatabaseError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BrowseError {
    /// Whether repeating the same operation later may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            BrowseError::TaxonomyFetchFailed(_) | BrowseError::PageFetchFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;
