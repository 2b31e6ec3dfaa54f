use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::albums::{remove_older_searched_albums, remove_owned_albums, DEFAULT_ALBUM_RETENTION_YEARS};
use crate::matcher::{mark_best_match, normalize_title, YearWindow, MOVIE_YEAR_WINDOW, SERIES_YEAR_WINDOW};
use crate::model::{CandidateResult, ItemLookup, LibraryItem, MediaKind};
use crate::quality::{disc_beats_library_resolution, DiscFormat};

/// Knobs for turning raw lookups into responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    pub movie_window: YearWindow,
    pub series_window: YearWindow,
    pub album_retention_years: i32,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            movie_window: MOVIE_YEAR_WINDOW,
            series_window: SERIES_YEAR_WINDOW,
            album_retention_years: DEFAULT_ALBUM_RETENTION_YEARS,
        }
    }
}

/// Number of best-match candidates available in each disc tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MatchCounts {
    pub dvd: usize,
    pub blu_ray: usize,
    pub uhd: usize,
}

impl MatchCounts {
    fn record(&mut self, formats: &[DiscFormat]) {
        let distinct: BTreeSet<DiscFormat> = formats.iter().copied().collect();
        for format in distinct {
            match format {
                DiscFormat::Dvd => self.dvd += 1,
                DiscFormat::BluRay => self.blu_ray += 1,
                DiscFormat::Uhd4k => self.uhd += 1,
            }
        }
    }

    fn add(&mut self, other: MatchCounts) {
        self.dvd += other.dvd;
        self.blu_ray += other.blu_ray;
        self.uhd += other.uhd;
    }

    pub fn total(&self) -> usize {
        self.dvd + self.blu_ray + self.uhd
    }
}

/// Final, per-item row of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub item: LibraryItem,
    pub candidates: Vec<CandidateResult>,
    pub matches: MatchCounts,
    pub upgrade_available: bool,
    /// Albums not owned and recent enough to report (artists only).
    pub new_albums: usize,
    pub lookup_failed: bool,
}

/// Displayable summary of a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub provider: String,
    pub responses: Vec<SearchResponse>,
    pub totals: MatchCounts,
    pub upgrades: usize,
    pub new_albums: usize,
    pub failed: usize,
}

/// Runs album dedup and best-match marking, producing one response per surviving lookup.
pub fn reconcile(
    lookups: Vec<ItemLookup>,
    settings: &ReconcileSettings,
    current_year: i32,
) -> Vec<SearchResponse> {
    let lookups = remove_owned_albums(lookups);
    let lookups = remove_older_searched_albums(lookups, current_year, settings.album_retention_years);
    lookups
        .into_iter()
        .map(|lookup| build_response(lookup, settings))
        .collect()
}

pub fn build_response(lookup: ItemLookup, settings: &ReconcileSettings) -> SearchResponse {
    let ItemLookup {
        item,
        mut candidates,
        failed,
    } = lookup;

    match item.kind {
        MediaKind::Movie | MediaKind::Series => {
            let window = if item.kind == MediaKind::Movie {
                settings.movie_window
            } else {
                settings.series_window
            };
            if let Some(year) = item.year {
                mark_best_match(&item.title, &mut candidates, window.bounds(year));
            }
        }
        MediaKind::Artist => {
            let wanted = normalize_title(&item.title);
            for candidate in &mut candidates {
                candidate.best_match = normalize_title(&candidate.title) == wanted;
            }
        }
    }

    let mut matches = MatchCounts::default();
    let mut upgrade_available = false;
    for candidate in candidates.iter().filter(|c| c.best_match) {
        matches.record(&candidate.formats);
        if let Some(resolution) = item.resolution {
            upgrade_available |= disc_beats_library_resolution(resolution, &candidate.formats);
        }
    }
    let new_albums = candidates.iter().map(|c| c.albums.len()).sum();

    SearchResponse {
        item,
        candidates,
        matches,
        upgrade_available,
        new_albums,
        lookup_failed: failed,
    }
}

pub fn aggregate(provider: &str, responses: Vec<SearchResponse>) -> BatchReport {
    let mut totals = MatchCounts::default();
    let mut upgrades = 0;
    let mut new_albums = 0;
    let mut failed = 0;
    for response in &responses {
        totals.add(response.matches);
        upgrades += usize::from(response.upgrade_available);
        new_albums += response.new_albums;
        failed += usize::from(response.lookup_failed);
    }
    BatchReport {
        provider: provider.to_string(),
        responses,
        totals,
        upgrades,
        new_albums,
        failed,
    }
}
