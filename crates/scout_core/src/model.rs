use serde::{Deserialize, Serialize};

use crate::quality::{DiscFormat, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
    Artist,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
}

impl Album {
    pub fn new(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

/// An entry owned in the personal library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    /// Season numbers present in the library (series only).
    #[serde(default)]
    pub seasons: Vec<u32>,
    /// Albums present in the library (artists only).
    #[serde(default)]
    pub albums: Vec<Album>,
}

impl LibraryItem {
    pub fn movie(title: impl Into<String>, year: i32, resolution: Option<Resolution>) -> Self {
        Self {
            title: title.into(),
            year: Some(year),
            kind: MediaKind::Movie,
            resolution,
            seasons: Vec::new(),
            albums: Vec::new(),
        }
    }

    pub fn series(title: impl Into<String>, year: i32, seasons: Vec<u32>) -> Self {
        Self {
            title: title.into(),
            year: Some(year),
            kind: MediaKind::Series,
            resolution: None,
            seasons,
            albums: Vec::new(),
        }
    }

    pub fn artist(name: impl Into<String>, albums: Vec<Album>) -> Self {
        Self {
            title: name.into(),
            year: None,
            kind: MediaKind::Artist,
            resolution: None,
            seasons: Vec::new(),
            albums,
        }
    }
}

/// One raw hit returned by a search provider for a library item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub formats: Vec<DiscFormat>,
    #[serde(default)]
    pub url: String,
    /// Set only by the reconciler; providers leave it false.
    #[serde(default)]
    pub best_match: bool,
    /// Discography of an artist hit.
    #[serde(default)]
    pub albums: Vec<Album>,
}

impl CandidateResult {
    pub fn new(title: impl Into<String>, year: Option<i32>, formats: Vec<DiscFormat>) -> Self {
        Self {
            title: title.into(),
            year,
            formats,
            url: String::new(),
            best_match: false,
            albums: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_albums(mut self, albums: Vec<Album>) -> Self {
        self.albums = albums;
        self
    }
}

/// Optional narrowing forwarded verbatim to providers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub audio_language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Raw outcome of looking up one library item, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLookup {
    pub item: LibraryItem,
    pub candidates: Vec<CandidateResult>,
    /// The provider call failed; `candidates` is empty.
    pub failed: bool,
}

impl ItemLookup {
    pub fn found(item: LibraryItem, candidates: Vec<CandidateResult>) -> Self {
        Self {
            item,
            candidates,
            failed: false,
        }
    }

    pub fn failed(item: LibraryItem) -> Self {
        Self {
            item,
            candidates: Vec::new(),
            failed: true,
        }
    }
}
