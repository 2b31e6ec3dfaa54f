use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use scout_logging::scout_debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{FailureKind, LookupError};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Shared transport for catalog providers. Cheap to clone.
///
/// No retries happen here; a failed request surfaces as a [`LookupError`]
/// classified by [`FailureKind`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    settings: HttpSettings,
}

impl HttpClient {
    pub fn new(settings: HttpSettings) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| LookupError::new(FailureKind::Connectivity, err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: Option<&str>,
    ) -> Result<T, LookupError> {
        scout_debug!("GET {}", url);
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        self.read_json(response).await
    }

    /// POSTs `form` url-encoded and decodes a JSON reply.
    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: Url,
        form: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        scout_debug!("POST {}", url);
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter())
            .finish();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, LookupError> {
        check_status(response.status())?;

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(LookupError::new(
                    FailureKind::Parse,
                    format!("response too large ({content_len} bytes)"),
                ));
            }
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.len() as u64 > self.settings.max_bytes {
            return Err(LookupError::new(
                FailureKind::Parse,
                format!("response too large ({} bytes)", bytes.len()),
            ));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| LookupError::new(FailureKind::Parse, err.to_string()))
    }
}

fn check_status(status: StatusCode) -> Result<(), LookupError> {
    if status.is_success() {
        return Ok(());
    }
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Authorization,
        _ => FailureKind::HttpStatus(status.as_u16()),
    };
    Err(LookupError::new(kind, status.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        return LookupError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return LookupError::new(FailureKind::Parse, err.to_string());
    }
    LookupError::new(FailureKind::Connectivity, err.to_string())
}

/// Client-credentials login for a provider that wants a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCredentials {
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: String,
}

/// One lazily fetched bearer token, kept for the lifetime of the cache.
///
/// There is no expiry or refresh. The lock is not held while the token is
/// fetched, so two lookups racing on first use may both log in; the last
/// reply wins and either token is usable.
#[derive(Debug)]
pub struct TokenCache {
    credentials: TokenCredentials,
    cached: RwLock<Option<String>>,
}

impl TokenCache {
    pub fn new(credentials: TokenCredentials) -> Self {
        Self {
            credentials,
            cached: RwLock::new(None),
        }
    }

    pub fn cached(&self) -> Option<String> {
        self.cached.read().ok().and_then(|guard| guard.clone())
    }

    pub async fn token(&self, http: &HttpClient) -> Result<String, LookupError> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];
        let reply: TokenReply = http
            .post_form_json(self.credentials.token_url.clone(), &form)
            .await
            .map_err(|err| match err.kind {
                FailureKind::Connectivity | FailureKind::Timeout => err,
                _ => LookupError::new(
                    FailureKind::Authorization,
                    format!("token request failed: {err}"),
                ),
            })?;

        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(reply.access_token.clone());
        }
        Ok(reply.access_token)
    }
}
