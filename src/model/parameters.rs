//! Read and validate model parameters from `model.toml`.
//!
//! This module defines the `ModelParameters` struct and helpers for loading and validating the
//! `model.toml` configuration used by the model.
use crate::calendar::{Hour, IndexDomains, Month, Period, VALID_HOURS, VALID_MONTHS};
use crate::generator::TechnologyID;
use crate::input::{input_err_msg, read_toml};
use crate::units::{Dimensionless, Hours};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_storage_round_trip_efficiency, Dimensionless, 0.8);
define_unit_param_default!(default_storage_adder_duration, Hours, 4.0);
define_param_default!(default_months, Vec<Month>, VALID_MONTHS.collect());
define_param_default!(default_hours, Vec<Hour>, VALID_HOURS.collect());
define_param_default!(
    default_small_hydro_technology,
    TechnologyID,
    "Small Hydro".into()
);

/// Whether excess RA may be sold
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, DeserializeLabeledStringEnum)]
pub enum SellExcessRA {
    /// Procurement is floored at zero
    #[default]
    #[string = "none"]
    None,
    /// Procurement may go negative, representing the sale of surplus RA
    #[string = "sell"]
    Sell,
}

/// Model parameters as defined in the `model.toml` file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Planning periods
    pub periods: Vec<Period>,
    /// Months modelled in each period. Defaults to all twelve.
    #[serde(default = "default_months")]
    pub months: Vec<Month>,
    /// Hours of the representative day. Defaults to 1 to 24.
    #[serde(default = "default_hours")]
    pub hours: Vec<Hour>,
    /// Whether surplus RA may be sold
    #[serde(default)]
    pub sell_excess_ra: SellExcessRA,
    /// Fraction of the energy used for charging which is recovered on discharge
    #[serde(default = "default_storage_round_trip_efficiency")]
    pub storage_round_trip_efficiency: Dimensionless,
    /// Duration assumed for storage capacity adders, which have no energy-to-power ratio of
    /// their own
    #[serde(default = "default_storage_adder_duration")]
    pub storage_adder_duration: Hours,
    /// The technology whose qualifying capacity comes from monthly NQC values
    #[serde(default = "default_small_hydro_technology")]
    pub small_hydro_technology: TechnologyID,
}

/// Check that the `storage_round_trip_efficiency` parameter is valid
fn check_storage_round_trip_efficiency(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(0.0) && value <= Dimensionless(1.0),
        "storage_round_trip_efficiency must be greater than zero and less than or equal to one"
    );

    Ok(())
}

/// Check that the `storage_adder_duration` parameter is valid
fn check_storage_adder_duration(value: Hours) -> Result<()> {
    ensure!(
        value.is_finite() && value > Hours(0.0),
        "storage_adder_duration must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// The index domains described by these parameters
    pub fn index_domains(&self) -> Result<IndexDomains> {
        IndexDomains::new(
            self.periods.clone(),
            self.months.clone(),
            self.hours.clone(),
        )
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // periods, months and hours
        self.index_domains()?;

        // storage_round_trip_efficiency
        check_storage_round_trip_efficiency(self.storage_round_trip_efficiency)?;

        // storage_adder_duration
        check_storage_adder_duration(self.storage_adder_duration)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_model_toml(dir: &Path, contents: &str) {
        let mut file = File::create(dir.join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
        write!(file, "{contents}").unwrap();
    }

    #[test]
    fn model_params_from_path_defaults() {
        let dir = tempdir().unwrap();
        write_model_toml(dir.path(), "periods = [2025, 2026]\n");

        let params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(params.periods, [2025, 2026]);
        assert_eq!(params.months, (1..=12).collect::<Vec<_>>());
        assert_eq!(params.hours, (1..=24).collect::<Vec<_>>());
        assert_eq!(params.sell_excess_ra, SellExcessRA::None);
        assert_eq!(params.storage_round_trip_efficiency, Dimensionless(0.8));
        assert_eq!(params.storage_adder_duration, Hours(4.0));
        assert_eq!(params.small_hydro_technology, "Small Hydro".into());
    }

    #[test]
    fn model_params_from_path_all_options() {
        let dir = tempdir().unwrap();
        write_model_toml(
            dir.path(),
            "periods = [2025]\n\
            months = [7]\n\
            hours = [1, 2, 3]\n\
            sell_excess_ra = \"sell\"\n\
            storage_round_trip_efficiency = 0.85\n\
            storage_adder_duration = 2.0\n\
            small_hydro_technology = \"Hydro\"\n",
        );

        let params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(params.months, [7]);
        assert_eq!(params.hours, [1, 2, 3]);
        assert_eq!(params.sell_excess_ra, SellExcessRA::Sell);
        assert_eq!(params.storage_round_trip_efficiency, Dimensionless(0.85));
        assert_eq!(params.storage_adder_duration, Hours(2.0));
        assert_eq!(params.small_hydro_technology, "Hydro".into());
    }

    #[test]
    fn model_params_from_path_bad_hours() {
        let dir = tempdir().unwrap();
        write_model_toml(dir.path(), "periods = [2025]\nhours = [0, 1]\n");
        assert!(ModelParameters::from_path(dir.path()).is_err());
    }

    #[rstest]
    #[case(0.8, true)]
    #[case(1.0, true)]
    #[case(1e-6, true)]
    #[case(0.0, false)]
    #[case(-0.5, false)]
    #[case(1.1, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn check_storage_round_trip_efficiency_works(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(
            check_storage_round_trip_efficiency(Dimensionless(value)).is_ok(),
            valid
        );
    }

    #[rstest]
    #[case(4.0, true)]
    #[case(0.5, true)]
    #[case(0.0, false)]
    #[case(-4.0, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn check_storage_adder_duration_works(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(check_storage_adder_duration(Hours(value)).is_ok(), valid);
    }
}
