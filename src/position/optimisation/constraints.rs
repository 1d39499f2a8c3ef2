//! Code for adding constraints to the RA position problem.
use super::VariableMap;
use crate::calendar::{Hour, Month, Period};
use crate::model::Model;
use crate::position::qualifying::QualifyingCapacityMap;
use crate::position::storage::StorageCapacityMap;
use crate::units::UnitType;
use anyhow::Result;
use highs::RowProblem as Problem;

/// Corresponding variables for a constraint along with the row offset in the solution
pub struct KeysWithOffset<T> {
    offset: usize,
    keys: Vec<T>,
}

impl<T> KeysWithOffset<T> {
    /// Zip the keys with the corresponding row values in the solution, accounting for the offset
    pub fn zip_rows<'a, U>(&'a self, rows: &'a [f64]) -> impl Iterator<Item = (&'a T, U)>
    where
        U: UnitType,
    {
        assert!(
            self.offset + self.keys.len() <= rows.len(),
            "Bad constraint keys: rows out of range"
        );

        self.keys
            .iter()
            .zip(rows[self.offset..].iter().copied().map(U::new))
    }
}

/// Indicates the hour covered by each RA balance constraint
pub type BalanceKeys = KeysWithOffset<(Period, Month, Hour)>;

/// Indicates the month covered by each monthly storage constraint
pub type MonthKeys = KeysWithOffset<(Period, Month)>;

/// Indicates the hour covered by each hourly storage constraint
pub type HourKeys = KeysWithOffset<(Period, Month, Hour)>;

/// The keys for different constraints
pub struct ConstraintKeys {
    /// Keys for hourly RA balance constraints
    pub balance_keys: BalanceKeys,
    /// Keys for the daily storage energy limit
    pub energy_keys: MonthKeys,
    /// Keys for the round-trip efficiency constraints
    pub efficiency_keys: MonthKeys,
    /// Keys for charge and discharge power limits (two rows per hour: charge then discharge)
    pub power_keys: HourKeys,
    /// Keys for the charge/discharge exclusivity constraints (two rows per hour)
    pub exclusivity_keys: HourKeys,
}

/// Add constraints for the RA position model.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `model` - The model
/// * `qualifying` - Qualifying capacity of the system in each hour
/// * `storage` - Storage capacity in each month
///
/// # Returns
///
/// Keys for the different constraints.
pub fn add_model_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    qualifying: &QualifyingCapacityMap,
    storage: &StorageCapacityMap,
) -> Result<ConstraintKeys> {
    let balance_keys = add_balance_constraints(problem, variables, model, qualifying)?;
    let energy_keys = add_energy_constraints(problem, variables, model, storage);
    let efficiency_keys = add_efficiency_constraints(problem, variables, model);
    let power_keys = add_power_constraints(problem, variables, model, storage);
    let exclusivity_keys = add_exclusivity_constraints(problem, variables, model, storage);

    Ok(ConstraintKeys {
        balance_keys,
        energy_keys,
        efficiency_keys,
        power_keys,
        exclusivity_keys,
    })
}

/// Add hourly RA balance constraints.
///
/// New RA plus storage discharge plus the system's qualifying capacity must cover the requirement
/// plus any energy used to charge storage:
///
/// ```text
/// new_ra + discharge - charge >= requirement - energy_nqc
/// ```
fn add_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    qualifying: &QualifyingCapacityMap,
) -> Result<BalanceKeys> {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let mut keys = Vec::new();
    for (period, month, hour) in model.domains.iter_period_month_hours() {
        let requirement = model.tables.requirement(period, month, hour)?;
        let energy_nqc = qualifying.energy_nqc(period, month, hour)?;
        let terms = [
            (variables.get_new_ra_var(period, month), 1.0),
            (variables.get_discharge_var(period, month, hour), 1.0),
            (variables.get_charge_var(period, month, hour), -1.0),
        ];
        problem.add_row((requirement - energy_nqc).value().., terms);
        keys.push((period, month, hour));
    }

    Ok(BalanceKeys { offset, keys })
}

/// Limit the energy discharged over the day to the storage energy capacity
fn add_energy_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    storage: &StorageCapacityMap,
) -> MonthKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let mut keys = Vec::new();
    for (period, month) in model.domains.iter_period_months() {
        let energy = storage[&(period, month)].energy;
        let terms = model
            .domains
            .hours()
            .iter()
            .map(|&hour| (variables.get_discharge_var(period, month, hour), 1.0));
        problem.add_row(..=energy.value(), terms);
        keys.push((period, month));
    }

    MonthKeys { offset, keys }
}

/// Discharged energy must equal charged energy scaled by the round-trip efficiency
fn add_efficiency_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
) -> MonthKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let efficiency = model.parameters.storage_round_trip_efficiency.value();
    let mut keys = Vec::new();
    let mut terms = Vec::new();
    for (period, month) in model.domains.iter_period_months() {
        for &hour in model.domains.hours() {
            terms.push((variables.get_discharge_var(period, month, hour), 1.0));
            terms.push((variables.get_charge_var(period, month, hour), -efficiency));
        }
        problem.add_row(0.0..=0.0, terms.drain(..));
        keys.push((period, month));
    }

    MonthKeys { offset, keys }
}

/// Limit hourly charge and discharge to the storage power capacity
fn add_power_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    storage: &StorageCapacityMap,
) -> HourKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let mut keys = Vec::new();
    for (period, month, hour) in model.domains.iter_period_month_hours() {
        let power = storage[&(period, month)].power.value();
        let charge_var = variables.get_charge_var(period, month, hour);
        let discharge_var = variables.get_discharge_var(period, month, hour);
        problem.add_row(..=power, [(charge_var, 1.0)]);
        problem.add_row(..=power, [(discharge_var, 1.0)]);
        keys.push((period, month, hour));
        keys.push((period, month, hour));
    }

    HourKeys { offset, keys }
}

/// Prevent storage from charging and discharging in the same hour.
///
/// Uses a big-M formulation with the storage power capacity as M. When the state variable is 1,
/// storage may discharge but not charge; when it is 0, the reverse:
///
/// ```text
/// charge + M * state <= M
/// discharge - M * state <= 0
/// ```
fn add_exclusivity_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    storage: &StorageCapacityMap,
) -> HourKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let mut keys = Vec::new();
    for (period, month, hour) in model.domains.iter_period_month_hours() {
        let big_m = storage[&(period, month)].power.value();
        let charge_var = variables.get_charge_var(period, month, hour);
        let discharge_var = variables.get_discharge_var(period, month, hour);
        let state_var = variables.get_state_var(period, month, hour);
        problem.add_row(..=big_m, [(charge_var, 1.0), (state_var, big_m)]);
        problem.add_row(..=0.0, [(discharge_var, 1.0), (state_var, -big_m)]);
        keys.push((period, month, hour));
        keys.push((period, month, hour));
    }

    HourKeys { offset, keys }
}
