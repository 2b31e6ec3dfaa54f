//! Scout core: pure data model, title matching and result aggregation.
mod aggregate;
mod albums;
mod job;
mod matcher;
mod model;
mod quality;

pub use aggregate::{
    aggregate, build_response, reconcile, BatchReport, MatchCounts, ReconcileSettings,
    SearchResponse,
};
pub use albums::{
    clean_albums, remove_older_searched_albums, remove_owned_albums,
    DEFAULT_ALBUM_RETENTION_YEARS,
};
pub use job::{JobId, JobSnapshot, JobStatus, ProgressView};
pub use matcher::{
    mark_best_match, normalize_title, YearWindow, MOVIE_YEAR_WINDOW, SERIES_YEAR_WINDOW,
};
pub use model::{
    Album, CandidateResult, ItemLookup, LibraryItem, MediaKind, SearchFilters,
};
pub use quality::{disc_beats_library_resolution, DiscFormat, Resolution, UnknownQualityTag};
