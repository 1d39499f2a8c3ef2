//! Qualifying capacity accounting.
//!
//! Translates each generator into its hourly contribution towards the RA requirement and sums the
//! contributions of everything except storage into the system's firm qualifying capacity.
use crate::calendar::{Hour, Month, Period};
use crate::generator::{Generator, GeneratorID, GeneratorIterator, TechnologyID};
use crate::model::Model;
use crate::tables::RaTables;
use crate::units::Capacity;
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Hourly qualifying capacity of each generator, keyed by generator, period, month and hour
pub type HourlyQCMap = IndexMap<(GeneratorID, Period, Month, Hour), Capacity>;

/// Calculate the qualifying capacity a generator contributes in a given hour.
///
/// The rules are applied in order:
///
/// 1. Generators which are not RA eligible contribute nothing
/// 2. Variable generation contributes its capacity scaled by the exceedance value for its
///    technology and region
/// 3. Small hydro contributes the monthly NQC for its resource ID, in every hour of the month
/// 4. Anything else contributes its full capacity
///
/// # Arguments
///
/// * `generator` - The generator
/// * `tables` - RA parameter tables
/// * `small_hydro_technology` - The technology which is valued with monthly NQCs
/// * `period`, `month`, `hour` - The hour to calculate the contribution for
pub fn hourly_qualifying_capacity(
    generator: &Generator,
    tables: &RaTables,
    small_hydro_technology: &TechnologyID,
    period: Period,
    month: Month,
    hour: Hour,
) -> Result<Capacity> {
    if !generator.ra_eligible {
        return Ok(Capacity(0.0));
    }

    if generator.is_variable {
        let exceedance = tables
            .exceedance(
                period,
                month,
                hour,
                &generator.technology,
                &generator.region,
            )
            .with_context(|| {
                format!(
                    "Could not calculate qualifying capacity of generator {}",
                    generator.id
                )
            })?;
        return Ok(generator.capacity_for_period(period) * exceedance);
    }

    if generator.technology == *small_hydro_technology {
        let resource_id = generator.resource_id.as_ref().with_context(|| {
            format!(
                "Generator {} has technology {} but no resource ID to look up its NQC",
                generator.id, generator.technology
            )
        })?;
        return tables.nqc(period, month, resource_id).with_context(|| {
            format!(
                "Could not calculate qualifying capacity of generator {}",
                generator.id
            )
        });
    }

    // NB: Storage is counted at face value here, but is excluded from the system total
    Ok(generator.capacity_for_period(period))
}

/// Sum the hourly qualifying capacity of all non-storage generators in the model
pub fn energy_nqc(model: &Model, period: Period, month: Month, hour: Hour) -> Result<Capacity> {
    model
        .iter_generators()
        .filter_non_storage()
        .map(|generator| {
            hourly_qualifying_capacity(
                generator,
                &model.tables,
                &model.parameters.small_hydro_technology,
                period,
                month,
                hour,
            )
        })
        .sum()
}

/// Qualifying capacities for every hour of the model
#[derive(Debug, PartialEq)]
pub struct QualifyingCapacityMap {
    /// Contribution of every generator (including storage)
    hourly_qc: HourlyQCMap,
    /// System qualifying capacity, excluding storage
    energy_nqc: IndexMap<(Period, Month, Hour), Capacity>,
}

impl QualifyingCapacityMap {
    /// Calculate qualifying capacities for every generator and hour in the model.
    ///
    /// Fails if any parameter needed for the calculation is missing.
    pub fn calculate(model: &Model) -> Result<Self> {
        let small_hydro = &model.parameters.small_hydro_technology;
        let mut hourly_qc = HourlyQCMap::new();
        let mut energy_nqc = IndexMap::new();
        for (period, month, hour) in model.domains.iter_period_month_hours() {
            for generator in model.iter_generators() {
                let qc = hourly_qualifying_capacity(
                    generator,
                    &model.tables,
                    small_hydro,
                    period,
                    month,
                    hour,
                )?;
                hourly_qc.insert((generator.id.clone(), period, month, hour), qc);
            }
            energy_nqc.insert(
                (period, month, hour),
                self::energy_nqc(model, period, month, hour)?,
            );
        }

        Ok(Self {
            hourly_qc,
            energy_nqc,
        })
    }

    /// Firm qualifying capacity of the system in the given hour
    pub fn energy_nqc(&self, period: Period, month: Month, hour: Hour) -> Result<Capacity> {
        self.energy_nqc
            .get(&(period, month, hour))
            .copied()
            .with_context(|| {
                format!(
                    "No qualifying capacity calculated for period {period}, month {month}, \
                    hour {hour}"
                )
            })
    }

    /// Iterate over the qualifying capacity of each generator in each hour
    pub fn iter_hourly_qc(
        &self,
    ) -> impl Iterator<Item = (&GeneratorID, Period, Month, Hour, Capacity)> {
        self.hourly_qc
            .iter()
            .map(|((id, period, month, hour), qc)| (id, *period, *month, *hour, *qc))
    }
}
