//! Code for reading monthly NQC values for hydro resources.
use super::{check_non_negative, input_err_msg, read_csv_optional, try_insert};
use crate::calendar::{IndexDomains, Month, Period};
use crate::tables::NqcMap;
use crate::units::Capacity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const NQC_FILE_NAME: &str = "ra_nqc_values.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct NqcRaw {
    period: Period,
    month: Month,
    resource_id_sod: String,
    nqc: Capacity,
}

/// Read monthly NQC values from the specified model directory.
///
/// The file is optional, as not every portfolio contains hydro resources.
pub fn read_nqc_values(model_dir: &Path, domains: &IndexDomains) -> Result<NqcMap> {
    let file_path = model_dir.join(NQC_FILE_NAME);
    let nqc_csv = read_csv_optional(&file_path)?;
    read_nqc_values_from_iter(nqc_csv, domains).with_context(|| input_err_msg(&file_path))
}

fn read_nqc_values_from_iter<I>(iter: I, domains: &IndexDomains) -> Result<NqcMap>
where
    I: Iterator<Item = NqcRaw>,
{
    let mut map = NqcMap::new();
    for raw in iter {
        if !domains.periods().contains(&raw.period) {
            continue;
        }
        domains.check_period_month(raw.period, raw.month)?;
        check_non_negative("nqc", raw.nqc.value(), &raw.resource_id_sod)?;
        try_insert(
            &mut map,
            (raw.period, raw.month, raw.resource_id_sod.into()),
            raw.nqc,
        )?;
    }

    Ok(map)
}
