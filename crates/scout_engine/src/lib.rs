//! Scout engine: concurrent lookups, job tracking and provider plumbing.
mod catalog;
mod fanout;
mod http;
mod provider;
mod service;
mod tracker;
mod types;

pub use catalog::JsonCatalogProvider;
pub use fanout::{fan_out, DEFAULT_WIDTH};
pub use http::{HttpClient, HttpSettings, TokenCache, TokenCredentials};
pub use provider::{JsonFileLibrarySource, LibrarySource, SearchProvider, StaticLibrarySource};
pub use service::{BatchRequest, ScoutService, ServiceSettings};
pub use tracker::{spawn_cleanup_loop, JobTracker, TrackerSettings};
pub use types::{FailureKind, LookupError, SubmitError};

pub use tokio_util::sync::CancellationToken;
