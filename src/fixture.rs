//! Fixtures for tests
use crate::calendar::IndexDomains;
use crate::generator::{CapacityMap, Generator, GeneratorMap};
use crate::model::{Model, ModelParameters, SellExcessRA};
use crate::tables::{RaCost, RaTables};
use crate::units::{Capacity, Dimensionless, Hours, MoneyPerCapacity};
use rstest::fixture;
use std::path::PathBuf;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a generator with the given capacity in 2025
fn generator(id: &str, technology: &str, capacity: f64) -> Generator {
    Generator {
        id: id.into(),
        ra_eligible: true,
        is_variable: false,
        is_storage: false,
        technology: technology.into(),
        region: "North".into(),
        resource_id: None,
        capacity: CapacityMap::from([(2025, Capacity(capacity))]),
        energy_to_power_ratio: None,
    }
}

#[fixture]
pub fn domains() -> IndexDomains {
    IndexDomains::new(vec![2025], vec![1], vec![1, 2, 3]).unwrap()
}

#[fixture]
pub fn firm_generator() -> Generator {
    generator("gas", "Gas", 80.0)
}

#[fixture]
pub fn solar_generator() -> Generator {
    Generator {
        is_variable: true,
        ..generator("solar", "Solar", 100.0)
    }
}

#[fixture]
pub fn hydro_generator() -> Generator {
    Generator {
        resource_id: Some("HYDRO_1".into()),
        ..generator("hydro", "Small Hydro", 10.0)
    }
}

#[fixture]
pub fn storage_generator() -> Generator {
    Generator {
        is_storage: true,
        energy_to_power_ratio: Some(Hours(2.0)),
        ..generator("battery", "Battery", 20.0)
    }
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters {
        periods: vec![2025],
        months: vec![1],
        hours: vec![1, 2, 3],
        sell_excess_ra: SellExcessRA::None,
        storage_round_trip_efficiency: Dimensionless(0.8),
        storage_adder_duration: Hours(4.0),
        small_hydro_technology: "Small Hydro".into(),
    }
}

/// A model with one firm generator, a flat requirement of 100 MW and an RA price of 5 $/kW-month
#[fixture]
pub fn model(
    model_parameters: ModelParameters,
    domains: IndexDomains,
    firm_generator: Generator,
) -> Model {
    let mut tables = RaTables::default();
    for &hour in domains.hours() {
        tables.requirements.insert((2025, 1, hour), Capacity(100.0));
    }
    tables.costs.insert(
        (2025, 1),
        RaCost {
            cost: MoneyPerCapacity(5.0),
            resale_value: MoneyPerCapacity(0.0),
        },
    );

    let generators: GeneratorMap = [(firm_generator.id.clone(), Rc::new(firm_generator))]
        .into_iter()
        .collect();

    Model {
        model_path: PathBuf::from("model"),
        parameters: model_parameters,
        domains,
        generators,
        tables,
    }
}
