//! Turn a raw HTTP response into a page or a `FetchError`.

use serde::de::DeserializeOwned;

use super::transport::RawResponse;
use crate::api::{ApiErrorBody, PagedResponse};
use crate::error::FetchError;
use crate::source::Page;

/// Reason phrase of the last status line (the final hop after redirects).
pub(crate) fn status_reason(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| l.starts_with("HTTP/"))
        .and_then(|l| {
            let mut parts = l.splitn(3, ' ');
            parts.next()?;
            parts.next()?;
            parts.next().map(|r| r.trim().to_string())
        })
        .filter(|r| !r.is_empty())
}

/// Non-2xx responses become `FetchError::Api` carrying the body's `error`
/// string, or `HTTP <status>: <reason>` when the body is not an error object.
pub(crate) fn decode_page<R: DeserializeOwned>(raw: RawResponse) -> Result<Page<R>, FetchError> {
    if !(200..300).contains(&raw.status) {
        let message = match serde_json::from_slice::<ApiErrorBody>(&raw.body) {
            Ok(body) => body.error,
            Err(_) => format!(
                "HTTP {}: {}",
                raw.status,
                raw.reason.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string(),
        };
        return Err(FetchError::Api {
            status: raw.status as u16,
            message,
        });
    }

    let response: PagedResponse<R> =
        serde_json::from_slice(&raw.body).map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })?;
    Ok(Page::from(response))
}
