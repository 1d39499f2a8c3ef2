//! Slice-of-day resource adequacy (RA) position optimiser.
//!
//! Given a generation portfolio and an hourly RA requirement for a representative day of each
//! month, `sodra` works out how much always-available RA product has to be procured each month
//! and how storage should be shifted between hours to close the hourly positions at least cost.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod calendar;
pub mod cli;
pub mod example;
pub mod generator;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod position;
pub mod settings;
pub mod tables;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// On Linux, this is `~/.config/sodra`.
pub fn get_sodra_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No sensible place to put config files, so just use the current directory
        return PathBuf::default();
    };

    config_dir.push("sodra");
    config_dir
}
