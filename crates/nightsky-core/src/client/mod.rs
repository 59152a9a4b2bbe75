//! Batch fetcher: one page request against the data API.
//!
//! Uses the curl crate (libcurl) in a blocking task per request. Parameters
//! are validated before anything goes on the wire, so an invalid request
//! fails exactly like an endpoint 400 would. Failures are returned as-is;
//! there is no retry at this layer.

mod response;
mod transport;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::{BioGroup, LightDataRecord, SightingRecord};
use crate::config::NightskyConfig;
use crate::error::FetchError;
use crate::params::{FetchParameters, PageWindow, LIGHT_DATA_MAX_LIMIT};
use crate::source::Page;

pub const LIGHT_DATA_ENDPOINT: &str = "/light-data";
pub const SIGHTINGS_ENDPOINT: &str = "/tbia-data";

/// Filter keys understood by the sightings endpoint.
pub const SIGHTING_FILTERS: [&str; 5] = [
    "bio_group",
    "common_name_c",
    "county",
    "municipality",
    "locality",
];

/// HTTP client for the paged data endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Url::parse(base_url).with_context(|| format!("invalid base URL: {}", base_url))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
        })
    }

    pub fn from_config(cfg: &NightskyConfig) -> anyhow::Result<Self> {
        Ok(Self::new(&cfg.api_base_url)?
            .with_timeouts(cfg.connect_timeout(), cfg.request_timeout()))
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `endpoint` with the given query pairs.
    pub fn endpoint_url(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| FetchError::validation(format!("invalid endpoint URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query.iter().filter(|(_, v)| !v.is_empty()) {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// One page of brightness samples.
    pub async fn get_light_page(
        &self,
        params: &FetchParameters,
        window: PageWindow,
        cancel: &CancellationToken,
    ) -> Result<Page<LightDataRecord>, FetchError> {
        params.validate()?;
        window.validate(Some(LIGHT_DATA_MAX_LIMIT))?;
        self.get_page(LIGHT_DATA_ENDPOINT, params.query_pairs(window), cancel)
            .await
    }

    /// One page of animal sightings.
    pub async fn get_sighting_page(
        &self,
        params: &FetchParameters,
        window: PageWindow,
        cancel: &CancellationToken,
    ) -> Result<Page<SightingRecord>, FetchError> {
        params.validate()?;
        window.validate(None)?;
        if let Some(group) = params.filter("bio_group") {
            if BioGroup::from_label(group).is_none() {
                let known: Vec<&str> = BioGroup::ALL.iter().map(|g| g.label()).collect();
                return Err(FetchError::validation(format!(
                    "bio_group must be one of {}",
                    known.join(", ")
                )));
            }
        }
        self.get_page(SIGHTINGS_ENDPOINT, params.query_pairs(window), cancel)
            .await
    }

    async fn get_page<R>(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
        cancel: &CancellationToken,
    ) -> Result<Page<R>, FetchError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint_url(endpoint, &query)?;
        let connect_timeout = self.connect_timeout;
        let request_timeout = self.request_timeout;
        let cancel = cancel.clone();
        tracing::trace!(url = %url, "page request");

        let raw = tokio::task::spawn_blocking(move || {
            transport::get(url.as_str(), connect_timeout, request_timeout, &cancel)
        })
        .await
        .map_err(|e| FetchError::network(format!("request task join: {}", e)))??;

        response::decode_page(raw)
    }
}
