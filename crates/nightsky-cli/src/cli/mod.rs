//! CLI for the nightsky dashboard data loader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nightsky_core::client::ApiClient;
use nightsky_core::config::{self, NightskyConfig};
use nightsky_core::params::FetchParameters;
use nightsky_core::time_range;
use std::path::PathBuf;

use commands::{run_light, run_page, run_sightings, run_years};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "nightsky")]
#[command(about = "Progressive loader for light-pollution and biodiversity data", long_about = None)]
pub struct Cli {
    /// Data API base URL (overrides `api_base_url` from the config file).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Time window: a calendar month, or an explicit start/end pair.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Calendar month to load, e.g. 2024-01.
    #[arg(long, value_name = "YYYY-MM", conflicts_with_all = ["start", "end"], required_unless_present = "start")]
    pub month: Option<String>,

    /// Range start (ISO 8601).
    #[arg(long, value_name = "TIME", requires = "end")]
    pub start: Option<String>,

    /// Range end (ISO 8601, exclusive).
    #[arg(long, value_name = "TIME", requires = "start")]
    pub end: Option<String>,
}

impl RangeArgs {
    pub fn to_params(&self) -> Result<FetchParameters> {
        let params = match (&self.month, &self.start, &self.end) {
            (Some(month), _, _) => time_range::parse_month(month)?,
            (None, Some(start), Some(end)) => FetchParameters::parse(start, end)?,
            _ => anyhow::bail!("either --month or both --start and --end are required"),
        };
        Ok(params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// GeoJSON FeatureCollection of points.
    Geojson,
    /// Raw record array.
    Json,
}

/// Where and how to write the loaded records.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Write to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Geojson)]
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Progressively load light-pollution readings for a time window.
    Light {
        #[command(flatten)]
        range: RangeArgs,
        /// Records per page (default from config).
        #[arg(long, value_name = "N")]
        batch_size: Option<u32>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Progressively load animal sightings for a time window.
    Sightings {
        #[command(flatten)]
        range: RangeArgs,
        /// Taxonomic group label, e.g. 鳥類.
        #[arg(long, value_name = "GROUP")]
        bio_group: Option<String>,
        #[arg(long, value_name = "NAME")]
        common_name: Option<String>,
        #[arg(long)]
        county: Option<String>,
        #[arg(long)]
        municipality: Option<String>,
        #[arg(long)]
        locality: Option<String>,
        /// Records per page (default from config).
        #[arg(long, value_name = "N")]
        batch_size: Option<u32>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch a single page of light data and print its pagination.
    Page {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value = "100", value_name = "N")]
        limit: u32,
        #[arg(long, default_value = "0", value_name = "N")]
        offset: u64,
    },

    /// List the years with data.
    Years,
}

fn load_config(cli: &Cli) -> Result<NightskyConfig> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    if let Some(url) = &cli.base_url {
        cfg.api_base_url = url.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Years = cli.command {
            run_years();
            return Ok(());
        }
        let cfg = load_config(&cli)?;
        tracing::debug!("loaded config: {:?}", cfg);
        let client = ApiClient::from_config(&cfg)?;

        match cli.command {
            CliCommand::Light {
                range,
                batch_size,
                output,
            } => run_light(client, &cfg, range.to_params()?, batch_size, &output).await?,
            CliCommand::Sightings {
                range,
                bio_group,
                common_name,
                county,
                municipality,
                locality,
                batch_size,
                output,
            } => {
                let params = range
                    .to_params()?
                    .with_filter("bio_group", bio_group.unwrap_or_default())
                    .with_filter("common_name_c", common_name.unwrap_or_default())
                    .with_filter("county", county.unwrap_or_default())
                    .with_filter("municipality", municipality.unwrap_or_default())
                    .with_filter("locality", locality.unwrap_or_default());
                run_sightings(client, &cfg, params, batch_size, &output).await?
            }
            CliCommand::Page {
                range,
                limit,
                offset,
            } => run_page(&client, &range.to_params()?, limit, offset).await?,
            CliCommand::Years => run_years(),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
