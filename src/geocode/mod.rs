use std::future::Future;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use crate::geocode::model::{FeatureCollection, RawGeocodeProperties};
use crate::utils::{retry_transient, RetryPolicy};

pub mod model;

pub const DEFAULT_BASE_URL: &str = "https://api-adresse.data.gouv.fr";
const SEARCH_PATH: &str = "/search/";
const UA: &str = concat!("carnet/", env!("CARGO_PKG_VERSION"));

/// What the user typed in the "find an address" form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub street_name: String,
    pub zip_code: String,
    pub limit: u32,
    pub autocomplete: bool,
}

impl SearchQuery {
    pub fn new(street_name: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self {
            street_name: street_name.into(),
            zip_code: zip_code.into(),
            limit: 1,
            autocomplete: true,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn params(&self) -> [(&'static str, String); 4] {
        [
            ("q", self.street_name.clone()),
            ("postcode", self.zip_code.clone()),
            ("limit", self.limit.to_string()),
            ("autocomplete", u8::from(self.autocomplete).to_string()),
        ]
    }
}

/// Result of one lookup. "Nothing matched" is a valid answer, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Vec<RawGeocodeProperties>),
    NotFound,
    TransportError(String),
}

impl From<FeatureCollection> for LookupOutcome {
    fn from(collection: FeatureCollection) -> Self {
        if collection.status.as_deref() == Some("error") {
            return LookupOutcome::TransportError(
                collection.errormessage.unwrap_or_else(|| "service reported an error".to_string())
            );
        }
        if collection.features.is_empty() {
            LookupOutcome::NotFound
        } else {
            LookupOutcome::Found(collection.features.into_iter().map(|f| f.properties).collect())
        }
    }
}

/// Anything able to turn a search query into geocoder results
pub trait AddressLookup {
    fn lookup(&self, query: &SearchQuery) -> impl Future<Output = LookupOutcome>;
}

/// HTTP client for the national address API
pub struct Geocoder {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> color_eyre::Result<Self> {
        Ok(
            Self {
                client: Client::builder()
                    .default_headers(Self::default_headers())
                    .build()?,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                retry,
            }
        )
    }

    fn default_headers() -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(USER_AGENT, HeaderValue::from_static(UA));
        map
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }

    /// fetch and decode one search page, retrying transient failures
    async fn search(&self, query: &SearchQuery) -> Result<FeatureCollection, reqwest::Error> {
        let url = self.search_url();
        let params = query.params();
        retry_transient(&self.retry, is_transient, || async {
            self.client
                .get(&url)
                .query(&params)
                .send()
                .await?
                .error_for_status()?
                .json::<FeatureCollection>()
                .await
        })
            .await
    }
}

impl AddressLookup for Geocoder {
    #[tracing::instrument(skip(self), fields(street = %query.street_name, postcode = %query.zip_code))]
    async fn lookup(&self, query: &SearchQuery) -> LookupOutcome {
        match self.search(query).await {
            Ok(collection) => {
                let outcome = LookupOutcome::from(collection);
                if let LookupOutcome::Found(results) = &outcome {
                    info!("geocoder returned [{}] result(s) for [{}, {}]", results.len(), query.street_name, query.zip_code);
                }
                outcome
            }
            Err(e) => {
                warn!("geocoder lookup failed for [{}, {}]: {:?}", query.street_name, query.zip_code, e);
                LookupOutcome::TransportError(e.to_string())
            }
        }
    }
}

/// client errors will fail the same way again, everything else may not
fn is_transient(err: &reqwest::Error) -> bool {
    match err.status() {
        Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        None => !err.is_decode(),
    }
}
