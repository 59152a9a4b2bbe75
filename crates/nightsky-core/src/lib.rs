pub mod config;
pub mod logging;

pub mod api;
pub mod client;
pub mod error;
pub mod geojson;
pub mod loader;
pub mod params;
pub mod session;
pub mod source;
pub mod time_range;
