//! CLI command handlers, one file per subcommand.

mod light;
mod output;
mod page;
mod progress;
mod sightings;
mod years;

pub use light::run_light;
pub use page::run_page;
pub use sightings::run_sightings;
pub use years::run_years;
