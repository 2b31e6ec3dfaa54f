use scout_core::{Album, CandidateResult, DiscFormat, LibraryItem, MediaKind, SearchFilters};
use scout_logging::{scout_debug, scout_trace};
use serde::Deserialize;
use url::Url;

use crate::http::{HttpClient, TokenCache, TokenCredentials};
use crate::provider::SearchProvider;
use crate::{FailureKind, LookupError};

/// Catalog reachable through a small JSON search endpoint.
///
/// `GET {base}/search?title=..&year=..&kind=..[&language=..][&region=..]`
/// answers with an array of hits. Site-specific scrapers live behind their
/// own endpoint and are not part of this crate.
#[derive(Debug)]
pub struct JsonCatalogProvider {
    name: String,
    base_url: Url,
    http: HttpClient,
    token: Option<TokenCache>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    formats: Vec<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    albums: Vec<Album>,
}

impl JsonCatalogProvider {
    pub fn new(name: impl Into<String>, base_url: Url, http: HttpClient) -> Result<Self, LookupError> {
        if base_url.cannot_be_a_base() {
            return Err(LookupError::new(
                FailureKind::Parse,
                format!("catalog url {base_url} cannot be a base"),
            ));
        }
        Ok(Self {
            name: name.into(),
            base_url,
            http,
            token: None,
        })
    }

    pub fn with_credentials(mut self, credentials: TokenCredentials) -> Self {
        self.token = Some(TokenCache::new(credentials));
        self
    }

    fn search_url(&self, item: &LibraryItem, filters: &SearchFilters) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("search");
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("title", &item.title);
            if let Some(year) = item.year {
                query.append_pair("year", &year.to_string());
            }
            query.append_pair("kind", kind_label(item.kind));
            if let Some(language) = filters.audio_language.as_deref() {
                query.append_pair("language", language);
            }
            if let Some(region) = filters.region.as_deref() {
                query.append_pair("region", region);
            }
        }
        url
    }
}

fn kind_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "series",
        MediaKind::Artist => "artist",
    }
}

fn into_candidate(wire: WireCandidate) -> CandidateResult {
    let formats = wire
        .formats
        .iter()
        .filter_map(|tag| match DiscFormat::parse(tag) {
            Ok(format) => Some(format),
            Err(err) => {
                scout_trace!("ignoring format for {:?}: {}", wire.title, err);
                None
            }
        })
        .collect();
    CandidateResult::new(wire.title, wire.year, formats)
        .with_url(wire.url)
        .with_albums(wire.albums)
}

#[async_trait::async_trait]
impl SearchProvider for JsonCatalogProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        item: &LibraryItem,
        filters: &SearchFilters,
    ) -> Result<Vec<CandidateResult>, LookupError> {
        let bearer = match &self.token {
            Some(cache) => Some(cache.token(&self.http).await?),
            None => None,
        };
        let url = self.search_url(item, filters);
        let hits: Vec<WireCandidate> = self.http.get_json(url, bearer.as_deref()).await?;
        scout_debug!("{}: {} hits for {:?}", self.name, hits.len(), item.title);
        Ok(hits.into_iter().map(into_candidate).collect())
    }
}
