//! Code for reading the monthly RA cost CSV file.
use super::{check_non_negative, input_err_msg, read_csv, try_insert};
use crate::calendar::{IndexDomains, Month, Period};
use crate::tables::{RaCost, RaCostMap};
use crate::units::MoneyPerCapacity;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const RA_COSTS_FILE_NAME: &str = "ra_sod_costs.csv";

/// Represents a row of the RA costs CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct RaCostRaw {
    period: Period,
    month: Month,
    ra_cost: MoneyPerCapacity,
    #[serde(default)]
    ra_resell_value: Option<MoneyPerCapacity>,
}

/// Read the monthly cost and resale value of RA product.
///
/// A cost must be given for every period and month of the model. Resale values default to zero.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `domains` - The model's index domains
///
/// # Returns
///
/// A map of [`RaCost`]s keyed by period and month, or an error.
pub fn read_ra_costs(model_dir: &Path, domains: &IndexDomains) -> Result<RaCostMap> {
    let file_path = model_dir.join(RA_COSTS_FILE_NAME);
    let costs_csv = read_csv(&file_path)?;
    read_ra_costs_from_iter(costs_csv, domains).with_context(|| input_err_msg(&file_path))
}

fn read_ra_costs_from_iter<I>(iter: I, domains: &IndexDomains) -> Result<RaCostMap>
where
    I: Iterator<Item = RaCostRaw>,
{
    let mut map = RaCostMap::new();
    for raw in iter {
        if !domains.periods().contains(&raw.period) {
            continue;
        }
        domains.check_period_month(raw.period, raw.month)?;

        let key_desc = format!("period {}, month {}", raw.period, raw.month);
        let resale_value = raw.ra_resell_value.unwrap_or_default();
        check_non_negative("ra_cost", raw.ra_cost.value(), &key_desc)?;
        check_non_negative("ra_resell_value", resale_value.value(), &key_desc)?;

        let cost = RaCost {
            cost: raw.ra_cost,
            resale_value,
        };
        try_insert(&mut map, (raw.period, raw.month), cost)?;
    }

    for (period, month) in domains.iter_period_months() {
        ensure!(
            map.contains_key(&(period, month)),
            "Missing RA cost for period {period}, month {month}"
        );
    }

    Ok(map)
}
