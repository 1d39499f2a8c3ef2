//! Aggregate storage capacity available for shifting energy within the representative day.
use crate::calendar::{Month, Period};
use crate::generator::GeneratorIterator;
use crate::model::Model;
use crate::units::{Capacity, Energy};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Combined power and energy capacity of the portfolio's storage in a given month
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StorageCapacity {
    /// Maximum charge or discharge rate
    pub power: Capacity,
    /// Maximum energy discharged over the day
    pub energy: Energy,
}

impl StorageCapacity {
    /// Whether there is any storage to dispatch
    pub fn is_empty(&self) -> bool {
        self.power <= Capacity(0.0)
    }
}

/// Storage capacity for each period and month
pub type StorageCapacityMap = IndexMap<(Period, Month), StorageCapacity>;

/// Calculate the aggregate storage capacity for every period and month in the model.
///
/// Power capacity is the installed capacity of storage generators plus the month's storage adder.
/// Energy capacity is each generator's capacity multiplied by its energy-to-power ratio, plus the
/// adder multiplied by the configured adder duration.
pub fn calculate_storage_capacities(model: &Model) -> Result<StorageCapacityMap> {
    let adder_duration = model.parameters.storage_adder_duration;
    let mut map = StorageCapacityMap::new();
    for (period, month) in model.domains.iter_period_months() {
        let adder = model.tables.storage_adder(period, month);
        let mut capacity = StorageCapacity {
            power: adder,
            energy: adder * adder_duration,
        };

        for generator in model.iter_generators().filter_storage() {
            let ratio = generator.energy_to_power_ratio.with_context(|| {
                format!(
                    "Storage generator {} has no energy-to-power ratio",
                    generator.id
                )
            })?;
            let power = generator.capacity_for_period(period);
            capacity.power += power;
            capacity.energy = capacity.energy + power * ratio;
        }

        map.insert((period, month), capacity);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model, storage_generator};
    use crate::generator::Generator;
    use crate::units::Hours;
    use rstest::rstest;
    use std::rc::Rc;

    #[rstest]
    fn no_storage(model: Model) {
        let map = calculate_storage_capacities(&model).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map[&(2025, 1)].is_empty());
        assert_eq!(map[&(2025, 1)], StorageCapacity::default());
    }

    #[rstest]
    fn storage_generator_and_adder(mut model: Model, storage_generator: Generator) {
        model
            .generators
            .insert(storage_generator.id.clone(), Rc::new(storage_generator));
        model.tables.storage_adders.insert((2025, 1), Capacity(5.0));

        let map = calculate_storage_capacities(&model).unwrap();
        assert_eq!(
            map[&(2025, 1)],
            StorageCapacity {
                // 20 MW battery plus 5 MW adder
                power: Capacity(25.0),
                // 20 MW * 2 h + 5 MW * 4 h
                energy: Energy(60.0),
            }
        );
    }

    #[rstest]
    fn adder_duration_is_configurable(mut model: Model) {
        model.parameters.storage_adder_duration = Hours(1.5);
        model.tables.storage_adders.insert((2025, 1), Capacity(10.0));
        let map = calculate_storage_capacities(&model).unwrap();
        assert_eq!(map[&(2025, 1)].energy, Energy(15.0));
    }

    #[rstest]
    fn storage_generator_without_ratio(mut model: Model, mut storage_generator: Generator) {
        storage_generator.energy_to_power_ratio = None;
        model
            .generators
            .insert(storage_generator.id.clone(), Rc::new(storage_generator));
        assert_error!(
            calculate_storage_capacities(&model),
            "Storage generator battery has no energy-to-power ratio"
        );
    }
}
