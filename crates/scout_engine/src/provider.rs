use std::path::PathBuf;

use scout_core::{CandidateResult, LibraryItem, SearchFilters};

use crate::{FailureKind, LookupError};

/// Yields the items owned in the library.
#[async_trait::async_trait]
pub trait LibrarySource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_items(&self) -> Result<Vec<LibraryItem>, LookupError>;
}

/// Looks up one library item in an external catalog.
///
/// Implementations are shared across workers and called concurrently.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(
        &self,
        item: &LibraryItem,
        filters: &SearchFilters,
    ) -> Result<Vec<CandidateResult>, LookupError>;
}

/// A fixed list of items, e.g. a named subset picked by the caller.
#[derive(Debug, Clone)]
pub struct StaticLibrarySource {
    name: String,
    items: Vec<LibraryItem>,
}

impl StaticLibrarySource {
    pub fn new(name: impl Into<String>, items: Vec<LibraryItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

#[async_trait::async_trait]
impl LibrarySource for StaticLibrarySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_items(&self) -> Result<Vec<LibraryItem>, LookupError> {
        Ok(self.items.clone())
    }
}

/// Library export stored as a JSON array of items.
#[derive(Debug, Clone)]
pub struct JsonFileLibrarySource {
    name: String,
    path: PathBuf,
}

impl JsonFileLibrarySource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
impl LibrarySource for JsonFileLibrarySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_items(&self) -> Result<Vec<LibraryItem>, LookupError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            LookupError::new(
                FailureKind::Connectivity,
                format!("{}: {err}", self.path.display()),
            )
        })?;
        serde_json::from_slice(&bytes).map_err(|err| {
            LookupError::new(FailureKind::Parse, format!("{}: {err}", self.path.display()))
        })
    }
}
