//! Blocking GET over libcurl with cooperative cancellation.

use std::str;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

/// Status, reason phrase and body of a completed GET.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub(crate) status: u32,
    pub(crate) reason: Option<String>,
    pub(crate) body: Vec<u8>,
}

fn curl_error(e: curl::Error) -> FetchError {
    if e.is_aborted_by_callback() {
        return FetchError::Cancelled;
    }
    FetchError::network(e.to_string())
}

/// Performs a GET and collects the whole body.
///
/// Runs in the current thread; call from `spawn_blocking` when used from async code.
/// The transfer is aborted from the progress callback once `cancel` fires.
pub(crate) fn get(
    url: &str,
    connect_timeout: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<RawResponse, FetchError> {
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }

    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_error)?;
    easy.follow_location(true).map_err(curl_error)?;
    easy.max_redirections(5).map_err(curl_error)?;
    easy.connect_timeout(connect_timeout).map_err(curl_error)?;
    easy.timeout(timeout).map_err(curl_error)?;
    easy.progress(true).map_err(curl_error)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json").map_err(curl_error)?;
    easy.http_headers(list).map_err(curl_error)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(curl_error)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(curl_error)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(curl_error)?;
        transfer.perform().map_err(curl_error)?;
    }

    let status = easy.response_code().map_err(curl_error)?;
    Ok(RawResponse {
        status,
        reason: super::response::status_reason(&headers),
        body,
    })
}
