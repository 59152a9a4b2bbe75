//! `nightsky page` – one light-data page request.

use anyhow::Result;
use nightsky_core::client::ApiClient;
use nightsky_core::params::{FetchParameters, PageWindow};
use tokio_util::sync::CancellationToken;

pub async fn run_page(
    client: &ApiClient,
    params: &FetchParameters,
    limit: u32,
    offset: u64,
) -> Result<()> {
    let window = PageWindow { limit, offset };
    let page = client
        .get_light_page(params, window, &CancellationToken::new())
        .await?;
    let total = page
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{:<10} {:<10} {:<10} {:<10} {}", "OFFSET", "LIMIT", "RECORDS", "TOTAL", "HAS_MORE");
    println!(
        "{:<10} {:<10} {:<10} {:<10} {}",
        offset,
        limit,
        page.records.len(),
        total,
        page.has_more
    );
    Ok(())
}
