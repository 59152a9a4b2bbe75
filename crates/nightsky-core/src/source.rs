//! Page sources: the seam between the progressive loader and the batch fetcher.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::api::{LightDataRecord, PagedResponse, SightingRecord};
use crate::client::ApiClient;
use crate::error::FetchError;
use crate::params::{FetchParameters, PageWindow};

/// One fetched slice of the result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub records: Vec<R>,
    /// Total matching records, if the endpoint reported it.
    pub total: Option<u64>,
    pub has_more: bool,
}

impl<R> From<PagedResponse<R>> for Page<R> {
    fn from(r: PagedResponse<R>) -> Self {
        Self {
            records: r.data,
            total: r.pagination.total,
            has_more: r.pagination.has_more,
        }
    }
}

/// Fetches exactly one page for a parameter set.
///
/// Implementations should return `FetchError::Cancelled` once `cancel` fires,
/// but the loader does not rely on it: it stops awaiting on its own.
pub trait PageSource: Send + Sync + 'static {
    type Record: Clone + Send + Sync + 'static;

    fn fetch_page(
        &self,
        params: &FetchParameters,
        window: PageWindow,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Page<Self::Record>, FetchError>> + Send;
}

/// Brightness samples from `/light-data`.
#[derive(Debug, Clone)]
pub struct LightDataSource {
    client: ApiClient,
}

impl LightDataSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl PageSource for LightDataSource {
    type Record = LightDataRecord;

    async fn fetch_page(
        &self,
        params: &FetchParameters,
        window: PageWindow,
        cancel: &CancellationToken,
    ) -> Result<Page<LightDataRecord>, FetchError> {
        self.client.get_light_page(params, window, cancel).await
    }
}

/// Animal sightings from `/tbia-data`.
#[derive(Debug, Clone)]
pub struct SightingSource {
    client: ApiClient,
}

impl SightingSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl PageSource for SightingSource {
    type Record = SightingRecord;

    async fn fetch_page(
        &self,
        params: &FetchParameters,
        window: PageWindow,
        cancel: &CancellationToken,
    ) -> Result<Page<SightingRecord>, FetchError> {
        self.client.get_sighting_page(params, window, cancel).await
    }
}
