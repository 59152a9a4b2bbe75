//! `nightsky light` – progressive load of brightness readings.

use anyhow::Result;
use nightsky_core::client::ApiClient;
use nightsky_core::config::NightskyConfig;
use nightsky_core::geojson;
use nightsky_core::loader::ProgressiveLoader;
use nightsky_core::params::FetchParameters;
use nightsky_core::source::LightDataSource;

use super::output::write_output;
use super::progress::{check_outcome, load_with_progress, loader_options};
use crate::cli::{OutputArgs, OutputFormat};

pub async fn run_light(
    client: ApiClient,
    cfg: &NightskyConfig,
    params: FetchParameters,
    batch_size: Option<u32>,
    output: &OutputArgs,
) -> Result<()> {
    let mut loader = ProgressiveLoader::new(
        LightDataSource::new(client),
        loader_options(cfg, batch_size),
    );
    eprintln!(
        "Loading light data {} .. {}",
        params.start_time, params.end_time
    );
    let snap = load_with_progress(&mut loader, params, "light").await;

    match geojson::brightness_range(&snap.data) {
        Some((min, max)) => eprintln!("Brightness range: {:.3} .. {:.3}", min, max),
        None => eprintln!("No brightness readings in range."),
    }
    if !snap.data.is_empty() {
        match output.format {
            OutputFormat::Geojson => {
                let fc = geojson::light_feature_collection(&snap.data);
                if fc.skipped > 0 {
                    eprintln!("{} readings with invalid coordinates skipped.", fc.skipped);
                }
                write_output(&fc, output)?
            }
            OutputFormat::Json => write_output(snap.data.as_slice(), output)?,
        }
    }
    check_outcome(&snap)
}
