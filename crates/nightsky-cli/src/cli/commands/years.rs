//! `nightsky years` – years with data, newest first.

use nightsky_core::time_range::TimeRangeConfig;

pub fn run_years() {
    for year in TimeRangeConfig::default().available_years() {
        println!("{}", year);
    }
}
