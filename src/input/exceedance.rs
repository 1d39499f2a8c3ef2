//! Code for reading exceedance values for variable generation.
use super::{input_err_msg, read_csv_optional, try_insert};
use crate::calendar::{Hour, IndexDomains, Month, Period};
use crate::tables::ExceedanceMap;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const EXCEEDANCE_FILE_NAME: &str = "ra_exceedance_values.csv";

/// Represents a row of the exceedance values CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct ExceedanceRaw {
    period: Period,
    month: Month,
    hour: Hour,
    gen_tech_sod: String,
    region_sod: String,
    exceedance_val: Dimensionless,
}

/// Read exceedance values from the specified model directory.
///
/// The file is optional, as portfolios without variable generation do not need it. Values are
/// looked up when qualifying capacities are calculated, so gaps are reported then.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `domains` - The model's index domains
///
/// # Returns
///
/// A map of exceedance factors keyed by period, month, hour, technology and region.
pub fn read_exceedance_values(model_dir: &Path, domains: &IndexDomains) -> Result<ExceedanceMap> {
    let file_path = model_dir.join(EXCEEDANCE_FILE_NAME);
    let exceedance_csv = read_csv_optional(&file_path)?;
    read_exceedance_values_from_iter(exceedance_csv, domains)
        .with_context(|| input_err_msg(&file_path))
}

fn read_exceedance_values_from_iter<I>(iter: I, domains: &IndexDomains) -> Result<ExceedanceMap>
where
    I: Iterator<Item = ExceedanceRaw>,
{
    let mut map = ExceedanceMap::new();
    for raw in iter {
        // Tables commonly cover more periods than a given run
        if !domains.periods().contains(&raw.period) {
            continue;
        }
        domains.check_period_month_hour(raw.period, raw.month, raw.hour)?;

        ensure!(
            raw.exceedance_val.is_finite()
                && raw.exceedance_val >= Dimensionless(0.0)
                && raw.exceedance_val <= Dimensionless(1.0),
            "Exceedance value for technology {} in region {} must be between 0 and 1",
            raw.gen_tech_sod,
            raw.region_sod
        );

        let key = (
            raw.period,
            raw.month,
            raw.hour,
            raw.gen_tech_sod.into(),
            raw.region_sod.into(),
        );
        try_insert(&mut map, key, raw.exceedance_val)?;
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, domains};
    use rstest::rstest;

    fn exceedance(period: Period, hour: Hour, value: f64) -> ExceedanceRaw {
        ExceedanceRaw {
            period,
            month: 1,
            hour,
            gen_tech_sod: "Solar".into(),
            region_sod: "North".into(),
            exceedance_val: Dimensionless(value),
        }
    }

    #[rstest]
    fn read_exceedance_values_from_iter_valid(domains: IndexDomains) {
        let raws = [
            exceedance(2025, 1, 0.0),
            exceedance(2025, 2, 0.4),
            exceedance(2030, 2, 0.3), // other period: skipped
        ];
        let map = read_exceedance_values_from_iter(raws.into_iter(), &domains).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map[&(2025, 1, 2, "Solar".into(), "North".into())],
            Dimensionless(0.4)
        );
    }

    #[rstest]
    #[case(1.5)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    fn read_exceedance_values_from_iter_bad_value(domains: IndexDomains, #[case] value: f64) {
        assert_error!(
            read_exceedance_values_from_iter([exceedance(2025, 1, value)].into_iter(), &domains),
            "Exceedance value for technology Solar in region North must be between 0 and 1"
        );
    }

    #[rstest]
    fn read_exceedance_values_from_iter_bad_hour(domains: IndexDomains) {
        assert!(
            read_exceedance_values_from_iter([exceedance(2025, 5, 0.5)].into_iter(), &domains)
                .is_err()
        );
    }
}
