//! Code for reading the hourly RA requirement CSV file.
use super::{input_err_msg, read_csv, try_insert};
use crate::calendar::{Hour, IndexDomains, Month, Period};
use crate::tables::RequirementMap;
use crate::units::Capacity;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const REQUIREMENT_FILE_NAME: &str = "ra_sod_requirement.csv";

/// Represents a row of the RA requirement CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct RequirementRaw {
    period: Period,
    month: Month,
    hour: Hour,
    ra_requirement: Capacity,
}

/// Read the hourly RA requirement from the specified model directory.
///
/// The requirement must be given for every period, month and hour of the model.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `domains` - The model's index domains
///
/// # Returns
///
/// A map of requirements keyed by period, month and hour, or an error.
pub fn read_requirements(model_dir: &Path, domains: &IndexDomains) -> Result<RequirementMap> {
    let file_path = model_dir.join(REQUIREMENT_FILE_NAME);
    let requirements_csv = read_csv(&file_path)?;
    read_requirements_from_iter(requirements_csv, domains)
        .with_context(|| input_err_msg(&file_path))
}

fn read_requirements_from_iter<I>(iter: I, domains: &IndexDomains) -> Result<RequirementMap>
where
    I: Iterator<Item = RequirementRaw>,
{
    let mut map = RequirementMap::new();
    for raw in iter {
        // Tables commonly cover more periods than a given run
        if !domains.periods().contains(&raw.period) {
            continue;
        }
        domains.check_period_month_hour(raw.period, raw.month, raw.hour)?;
        let key = (raw.period, raw.month, raw.hour);

        // Negative requirements are allowed
        ensure!(
            raw.ra_requirement.is_finite(),
            "RA requirement for period {}, month {}, hour {} must be finite",
            key.0,
            key.1,
            key.2
        );
        try_insert(&mut map, key, raw.ra_requirement)?;
    }

    for (period, month, hour) in domains.iter_period_month_hours() {
        ensure!(
            map.contains_key(&(period, month, hour)),
            "Missing RA requirement for period {period}, month {month}, hour {hour}"
        );
    }

    Ok(map)
}
