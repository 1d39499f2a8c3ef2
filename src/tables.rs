//! Parameter tables for the slice-of-day RA formulation.
//!
//! Lookups fail with an error naming the missing key, so that an incomplete input table is
//! reported at the point where the model first needs the value.
use crate::calendar::{Hour, Month, Period};
use crate::generator::{RegionID, ResourceID, TechnologyID};
use crate::units::{Capacity, Dimensionless, MoneyPerCapacity};
use anyhow::{Context, Result};
use std::collections::HashMap;

/// Hourly RA requirement, keyed by period, month and hour
pub type RequirementMap = HashMap<(Period, Month, Hour), Capacity>;

/// Exceedance factors for variable generation, keyed by period, month, hour, technology and region
pub type ExceedanceMap = HashMap<(Period, Month, Hour, TechnologyID, RegionID), Dimensionless>;

/// Monthly net qualifying capacity of hydro resources, keyed by period, month and resource ID
pub type NqcMap = HashMap<(Period, Month, ResourceID), Capacity>;

/// Monthly price of the always-available RA product, keyed by period and month
pub type RaCostMap = HashMap<(Period, Month), RaCost>;

/// Additional storage power capacity outside the portfolio, keyed by period and month
pub type StorageAdderMap = HashMap<(Period, Month), Capacity>;

/// The price at which RA product can be bought and sold in a given month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaCost {
    /// Cost of procuring RA
    pub cost: MoneyPerCapacity,
    /// Value of reselling RA
    pub resale_value: MoneyPerCapacity,
}

/// All the parameter tables used to build the RA position problem
#[derive(Debug, Default, PartialEq)]
pub struct RaTables {
    /// Hourly RA requirement
    pub requirements: RequirementMap,
    /// Exceedance factors for variable generation
    pub exceedance: ExceedanceMap,
    /// Monthly NQC values for hydro resources
    pub nqc: NqcMap,
    /// Monthly RA costs
    pub costs: RaCostMap,
    /// Monthly storage capacity adders
    pub storage_adders: StorageAdderMap,
}

impl RaTables {
    /// The RA requirement for the given hour
    pub fn requirement(&self, period: Period, month: Month, hour: Hour) -> Result<Capacity> {
        self.requirements
            .get(&(period, month, hour))
            .copied()
            .with_context(|| {
                format!("No RA requirement for period {period}, month {month}, hour {hour}")
            })
    }

    /// The exceedance factor for a technology in a region at the given hour
    pub fn exceedance(
        &self,
        period: Period,
        month: Month,
        hour: Hour,
        technology: &TechnologyID,
        region: &RegionID,
    ) -> Result<Dimensionless> {
        self.exceedance
            .get(&(period, month, hour, technology.clone(), region.clone()))
            .copied()
            .with_context(|| {
                format!(
                    "No exceedance value for technology {technology} in region {region} \
                    (period {period}, month {month}, hour {hour})"
                )
            })
    }

    /// The monthly NQC of a hydro resource
    pub fn nqc(&self, period: Period, month: Month, resource_id: &ResourceID) -> Result<Capacity> {
        self.nqc
            .get(&(period, month, resource_id.clone()))
            .copied()
            .with_context(|| {
                format!("No NQC value for resource {resource_id} (period {period}, month {month})")
            })
    }

    /// The RA price for the given month
    pub fn cost(&self, period: Period, month: Month) -> Result<RaCost> {
        self.costs
            .get(&(period, month))
            .copied()
            .with_context(|| format!("No RA cost for period {period}, month {month}"))
    }

    /// The storage power adder for the given month.
    ///
    /// The adders table is optional, so a missing entry means no additional capacity.
    pub fn storage_adder(&self, period: Period, month: Month) -> Capacity {
        self.storage_adders
            .get(&(period, month))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;

    #[test]
    fn requirement_lookup() {
        let mut tables = RaTables::default();
        tables.requirements.insert((2025, 1, 1), Capacity(100.0));
        assert_eq!(tables.requirement(2025, 1, 1).unwrap(), Capacity(100.0));
        assert_error!(
            tables.requirement(2025, 1, 2),
            "No RA requirement for period 2025, month 1, hour 2"
        );
    }

    #[test]
    fn exceedance_lookup_names_key() {
        let tables = RaTables::default();
        assert_error!(
            tables.exceedance(2025, 7, 18, &"Solar".into(), &"North".into()),
            "No exceedance value for technology Solar in region North (period 2025, month 7, \
            hour 18)"
        );
    }

    #[test]
    fn storage_adder_defaults_to_zero() {
        let mut tables = RaTables::default();
        tables.storage_adders.insert((2025, 1), Capacity(5.0));
        assert_eq!(tables.storage_adder(2025, 1), Capacity(5.0));
        assert_eq!(tables.storage_adder(2025, 2), Capacity(0.0));
    }
}
