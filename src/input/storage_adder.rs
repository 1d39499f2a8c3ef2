//! Code for reading storage capacity adders, i.e. storage RA held outside the portfolio (e.g.
//! through contracts or cost allocation mechanisms).
use super::{check_non_negative, input_err_msg, read_csv_optional, try_insert};
use crate::calendar::{IndexDomains, Month, Period};
use crate::tables::StorageAdderMap;
use crate::units::Capacity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const STORAGE_ADDERS_FILE_NAME: &str = "ra_sod_storage_adders.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct StorageAdderRaw {
    period: Period,
    month: Month,
    storage_ra_adders: Capacity,
}

/// Read monthly storage capacity adders.
///
/// The file is optional and months without an entry have no additional storage.
pub fn read_storage_adders(model_dir: &Path, domains: &IndexDomains) -> Result<StorageAdderMap> {
    let file_path = model_dir.join(STORAGE_ADDERS_FILE_NAME);
    let adders_csv = read_csv_optional(&file_path)?;
    read_storage_adders_from_iter(adders_csv, domains).with_context(|| input_err_msg(&file_path))
}

fn read_storage_adders_from_iter<I>(iter: I, domains: &IndexDomains) -> Result<StorageAdderMap>
where
    I: Iterator<Item = StorageAdderRaw>,
{
    let mut map = StorageAdderMap::new();
    for raw in iter {
        if !domains.periods().contains(&raw.period) {
            continue;
        }
        domains.check_period_month(raw.period, raw.month)?;
        check_non_negative(
            "storage_ra_adders",
            raw.storage_ra_adders.value(),
            format!("period {}, month {}", raw.period, raw.month),
        )?;
        try_insert(&mut map, (raw.period, raw.month), raw.storage_ra_adders)?;
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::domains;
    use rstest::rstest;

    fn adder(month: Month, value: f64) -> StorageAdderRaw {
        StorageAdderRaw {
            period: 2025,
            month,
            storage_ra_adders: Capacity(value),
        }
    }

    #[rstest]
    fn read_storage_adders_from_iter_valid(domains: IndexDomains) {
        let map = read_storage_adders_from_iter([adder(1, 5.0)].into_iter(), &domains).unwrap();
        assert_eq!(map[&(2025, 1)], Capacity(5.0));
    }

    #[rstest]
    #[case(adder(1, -5.0))]
    #[case(adder(3, 5.0))]
    fn read_storage_adders_from_iter_invalid(domains: IndexDomains, #[case] raw: StorageAdderRaw) {
        assert!(read_storage_adders_from_iter([raw].into_iter(), &domains).is_err());
    }
}
