use std::collections::HashSet;

use crate::matcher::normalize_title;
use crate::model::{Album, ItemLookup, MediaKind};

/// How many years back an album still counts as a new release.
pub const DEFAULT_ALBUM_RETENTION_YEARS: i32 = 5;

/// Drops every candidate album whose normalized title matches an album the
/// artist already owns. Years are not compared. Non-artist lookups pass
/// through untouched.
pub fn remove_owned_albums(lookups: Vec<ItemLookup>) -> Vec<ItemLookup> {
    lookups
        .into_iter()
        .map(|mut lookup| {
            if lookup.item.kind != MediaKind::Artist {
                return lookup;
            }
            let owned: HashSet<String> = lookup
                .item
                .albums
                .iter()
                .map(|album| normalize_title(&album.title))
                .collect();
            for candidate in &mut lookup.candidates {
                let to_remove: Vec<Album> = candidate
                    .albums
                    .iter()
                    .filter(|album| owned.contains(&normalize_title(&album.title)))
                    .cloned()
                    .collect();
                candidate.albums = clean_albums(&candidate.albums, &to_remove);
            }
            lookup
        })
        .collect()
}

/// Keeps only candidate albums released in or after `current_year - retention_years`.
///
/// Albums without a year are dropped. Artists with no search hits at all are
/// dropped; artists whose album list ends up empty are kept, and so are
/// artists whose lookup failed.
pub fn remove_older_searched_albums(
    lookups: Vec<ItemLookup>,
    current_year: i32,
    retention_years: i32,
) -> Vec<ItemLookup> {
    let cutoff_year = current_year - retention_years;
    lookups
        .into_iter()
        .filter(|lookup| {
            lookup.item.kind != MediaKind::Artist || lookup.failed || !lookup.candidates.is_empty()
        })
        .map(|mut lookup| {
            if lookup.item.kind == MediaKind::Artist {
                for candidate in &mut lookup.candidates {
                    candidate
                        .albums
                        .retain(|album| album.year.is_some_and(|year| year >= cutoff_year));
                }
            }
            lookup
        })
        .collect()
}

/// Set difference by exact `(title, year)`; order of `original` is preserved.
pub fn clean_albums(original: &[Album], to_remove: &[Album]) -> Vec<Album> {
    let removed: HashSet<(&str, Option<i32>)> = to_remove
        .iter()
        .map(|album| (album.title.as_str(), album.year))
        .collect();
    original
        .iter()
        .filter(|album| !removed.contains(&(album.title.as_str(), album.year)))
        .cloned()
        .collect()
}
