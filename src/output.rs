//! The module responsible for writing output data to disk.
use crate::calendar::{Hour, Month, Period};
use crate::generator::GeneratorID;
use crate::model::Model;
use crate::position::optimisation::Solution;
use crate::units::{Capacity, Money};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::izip;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The output file name for the hourly RA summary
const RA_SUMMARY_FILE_NAME: &str = "ra_summary.csv";

/// The output file name for procurement costs by period
const PERIOD_COSTS_FILE_NAME: &str = "ra_period_costs.csv";

/// The output file name for the qualifying capacity of each generator
const HOURLY_QC_FILE_NAME: &str = "debug_hourly_qc.csv";

/// Get the default output directory for the model
pub fn get_output_dir(model_dir: &Path, results_root: PathBuf) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([results_root, model_name.into()].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// `true` if the output dir contained existing data that was deleted, `false` if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass \
            the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the hourly RA summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RaSummaryRow {
    period: Period,
    month: Month,
    hour: Hour,
    ra_requirement_mw: Capacity,
    available_ra_capacity_mw: Capacity,
    ra_position_mw: Capacity,
    storage_discharge_mw: Capacity,
    storage_charge_mw: Capacity,
    new_ra_mw: Capacity,
    new_ra_cost: Money,
    net_position_mw: Capacity,
}

/// Represents a row in the period costs CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PeriodCostRow {
    period: Period,
    ra_cost: Money,
}

/// Represents a row in the debug hourly qualifying capacity CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct HourlyQCRow {
    generator_id: GeneratorID,
    period: Period,
    month: Month,
    hour: Hour,
    qualifying_capacity_mw: Capacity,
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    hourly_qc_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name: &str| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            hourly_qc_writer: new_writer(HOURLY_QC_FILE_NAME)?,
        })
    }

    /// Write the qualifying capacity of every generator in every hour
    fn write_hourly_qc(&mut self, solution: &Solution) -> Result<()> {
        for (generator_id, period, month, hour, qc) in solution.qualifying().iter_hourly_qc() {
            let row = HourlyQCRow {
                generator_id: generator_id.clone(),
                period,
                month,
                hour,
                qualifying_capacity_mw: qc,
            };
            self.hourly_qc_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.hourly_qc_writer.flush()?;

        Ok(())
    }
}

/// An object for writing the results of a run to file
pub struct DataWriter {
    ra_summary_writer: csv::Writer<File>,
    period_costs_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model_path` - Path to input model
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, model_path: &Path, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name: &str| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files and record details of the run
            write_metadata(output_path, model_path).context("Failed to save metadata")?;
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            ra_summary_writer: new_writer(RA_SUMMARY_FILE_NAME)?,
            period_costs_writer: new_writer(PERIOD_COSTS_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write the hourly RA summary for a solved model
    pub fn write_ra_summary(&mut self, model: &Model, solution: &Solution) -> Result<()> {
        let new_ra: IndexMap<_, _> = solution
            .iter_new_ra()
            .map(|(period, month, capacity)| ((period, month), capacity))
            .collect();

        for (
            (period, month, hour, discharge),
            (_, _, _, charge),
            (_, _, _, balance_activity),
        ) in izip!(
            solution.iter_discharge(),
            solution.iter_charge(),
            solution.iter_balance_activity()
        ) {
            let requirement = model.tables.requirement(period, month, hour)?;
            let energy_nqc = solution.qualifying().energy_nqc(period, month, hour)?;
            let new_ra_mw = new_ra[&(period, month)];
            let row = RaSummaryRow {
                period,
                month,
                hour,
                ra_requirement_mw: requirement,
                available_ra_capacity_mw: energy_nqc,
                ra_position_mw: energy_nqc - requirement,
                storage_discharge_mw: discharge,
                storage_charge_mw: charge,
                new_ra_mw,
                new_ra_cost: solution.monthly_cost(period, month, new_ra_mw),
                net_position_mw: energy_nqc + balance_activity - requirement,
            };
            self.ra_summary_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the total cost of RA procurement for each period
    pub fn write_period_costs(&mut self, solution: &Solution) -> Result<()> {
        for (period, ra_cost) in solution.period_costs() {
            self.period_costs_writer
                .serialize(PeriodCostRow { period, ra_cost })?;
        }

        Ok(())
    }

    /// Write additional information about the solution, if debug output is enabled
    pub fn write_debug_info(&mut self, solution: &Solution) -> Result<()> {
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_hourly_qc(solution)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.ra_summary_writer.flush()?;
        self.period_costs_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
