//! Functionality for calculating and optimising the RA position of a portfolio.
use crate::model::Model;
use crate::output::DataWriter;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

pub mod cost;
pub mod optimisation;
use optimisation::PositionProblem;
pub mod qualifying;
pub mod storage;

/// Optimise the RA position for the model and write the results to file.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. qualifying capacities) to
///   output files
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    let mut writer = DataWriter::create(output_path, &model.model_path, debug_model)?;

    info!("Calculating qualifying and storage capacities...");
    let problem = PositionProblem::new(model)?;

    info!("Running RA position optimisation...");
    let solution = problem
        .solve()
        .context("Failed to optimise RA position")?;

    for (period, cost) in solution.period_costs() {
        info!("Cost of new RA for period {period}: {cost}");
    }

    writer.write_ra_summary(model, &solution)?;
    writer.write_period_costs(&solution)?;
    writer.write_debug_info(&solution)?;
    writer.flush()?;

    Ok(())
}
