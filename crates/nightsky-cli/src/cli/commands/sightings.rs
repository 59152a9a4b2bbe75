//! `nightsky sightings` – progressive load of animal sightings.

use anyhow::Result;
use nightsky_core::client::ApiClient;
use nightsky_core::config::NightskyConfig;
use nightsky_core::geojson;
use nightsky_core::loader::ProgressiveLoader;
use nightsky_core::params::FetchParameters;
use nightsky_core::source::SightingSource;

use super::output::write_output;
use super::progress::{check_outcome, load_with_progress, loader_options};
use crate::cli::{OutputArgs, OutputFormat};

pub async fn run_sightings(
    client: ApiClient,
    cfg: &NightskyConfig,
    params: FetchParameters,
    batch_size: Option<u32>,
    output: &OutputArgs,
) -> Result<()> {
    let mut loader = ProgressiveLoader::new(
        SightingSource::new(client),
        loader_options(cfg, batch_size),
    );
    eprintln!(
        "Loading sightings {} .. {}",
        params.start_time, params.end_time
    );
    let snap = load_with_progress(&mut loader, params, "sightings").await;

    if !snap.data.is_empty() {
        match output.format {
            OutputFormat::Geojson => {
                let fc = geojson::sighting_feature_collection(&snap.data);
                if fc.skipped > 0 {
                    eprintln!(
                        "{} sightings without coordinates in Taiwan left out of the map.",
                        fc.skipped
                    );
                }
                write_output(&fc, output)?
            }
            OutputFormat::Json => write_output(snap.data.as_slice(), output)?,
        }
    } else {
        eprintln!("No sightings in range.");
    }
    check_outcome(&snap)
}
