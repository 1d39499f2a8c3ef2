//! Generators are the resources in the portfolio which may count towards resource adequacy.
use crate::calendar::Period;
use crate::id::define_id_type;
use crate::units::{Capacity, Hours};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

define_id_type! {GeneratorID}
define_id_type! {TechnologyID}
define_id_type! {RegionID}
define_id_type! {ResourceID}

/// A map of [`Generator`]s, keyed by generator ID
pub type GeneratorMap = IndexMap<GeneratorID, Rc<Generator>>;

/// Installed capacity of a generator in each period
pub type CapacityMap = HashMap<Period, Capacity>;

/// A resource in the portfolio
#[derive(PartialEq, Debug, Clone)]
pub struct Generator {
    /// Unique identifier for the generator
    pub id: GeneratorID,
    /// Whether the generator may count towards RA at all
    pub ra_eligible: bool,
    /// Whether the output of the generator is weather-dependent (e.g. solar or wind)
    pub is_variable: bool,
    /// Whether the generator is an energy storage asset
    pub is_storage: bool,
    /// Technology category used for looking up exceedance values
    pub technology: TechnologyID,
    /// Region category used for looking up exceedance values
    pub region: RegionID,
    /// Identifier used for looking up monthly NQC values (hydro resources only)
    pub resource_id: Option<ResourceID>,
    /// Installed capacity by period.
    ///
    /// Periods without an entry have zero capacity.
    pub capacity: CapacityMap,
    /// Ratio of energy (MWh) to power (MW) for storage assets
    pub energy_to_power_ratio: Option<Hours>,
}

impl Generator {
    /// The installed capacity of this generator in the given period
    pub fn capacity_for_period(&self, period: Period) -> Capacity {
        self.capacity.get(&period).copied().unwrap_or_default()
    }
}

/// Iterator adaptors for collections of generators
pub trait GeneratorIterator<'a>: Iterator<Item = &'a Rc<Generator>> + Sized {
    /// Only storage assets
    fn filter_storage(self) -> impl Iterator<Item = &'a Rc<Generator>> {
        self.filter(|generator| generator.is_storage)
    }

    /// Everything except storage assets
    fn filter_non_storage(self) -> impl Iterator<Item = &'a Rc<Generator>> {
        self.filter(|generator| !generator.is_storage)
    }
}

impl<'a, I> GeneratorIterator<'a> for I where I: Iterator<Item = &'a Rc<Generator>> {}
