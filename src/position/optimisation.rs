//! Code for building and solving the RA position problem.
//!
//! The problem chooses how much always-available RA product to buy (or sell) in each month and
//! how to dispatch storage across the hours of the representative day so that every hour's
//! requirement is covered at minimum cost.
use super::cost::CostContribution;
use super::qualifying::QualifyingCapacityMap;
use super::storage::{StorageCapacityMap, calculate_storage_capacities};
use crate::calendar::{Hour, Month, Period};
use crate::model::Model;
use crate::units::{Capacity, Money};
use anyhow::Result;
use highs::{HighsModelStatus, HighsStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;
use log::{Level, debug, log_enabled};
use std::error::Error;
use std::fmt;
use std::ops::Range;

pub mod constraints;
use constraints::{ConstraintKeys, add_model_constraints};

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
type Variable = highs::Col;

/// Variables for new RA procured in each month
type NewRAVariableMap = IndexMap<(Period, Month), Variable>;

/// Variables for storage operation in each hour
type HourlyVariableMap = IndexMap<(Period, Month, Hour), Variable>;

/// A map for easy lookup of variables in the problem.
///
/// Each group of variables occupies a contiguous range of columns, so that values can be read
/// back from the solution in the same order as the keys.
pub struct VariableMap {
    new_ra_vars: NewRAVariableMap,
    new_ra_var_idx: Range<usize>,
    charge_vars: HourlyVariableMap,
    charge_var_idx: Range<usize>,
    discharge_vars: HourlyVariableMap,
    discharge_var_idx: Range<usize>,
    state_vars: HourlyVariableMap,
    state_var_idx: Range<usize>,
}

impl VariableMap {
    /// Add all variables for the RA position problem.
    ///
    /// # Arguments
    ///
    /// * `problem` - The optimisation problem
    /// * `model` - The model
    /// * `cost` - Objective coefficients for new RA
    fn new(problem: &mut Problem, model: &Model, cost: &CostContribution) -> Self {
        let mut new_ra_vars = NewRAVariableMap::new();
        let new_ra_var_idx = add_new_ra_variables(problem, &mut new_ra_vars, model, cost);

        let mut charge_vars = HourlyVariableMap::new();
        let charge_var_idx = add_hourly_variables(problem, &mut charge_vars, model, false);
        let mut discharge_vars = HourlyVariableMap::new();
        let discharge_var_idx = add_hourly_variables(problem, &mut discharge_vars, model, false);
        let mut state_vars = HourlyVariableMap::new();
        let state_var_idx = add_hourly_variables(problem, &mut state_vars, model, true);

        Self {
            new_ra_vars,
            new_ra_var_idx,
            charge_vars,
            charge_var_idx,
            discharge_vars,
            discharge_var_idx,
            state_vars,
            state_var_idx,
        }
    }

    /// Get the new RA [`Variable`] for the given month
    fn get_new_ra_var(&self, period: Period, month: Month) -> Variable {
        *self
            .new_ra_vars
            .get(&(period, month))
            .expect("No new RA variable found for given params")
    }

    /// Get the storage charge [`Variable`] for the given hour
    fn get_charge_var(&self, period: Period, month: Month, hour: Hour) -> Variable {
        *self
            .charge_vars
            .get(&(period, month, hour))
            .expect("No charge variable found for given params")
    }

    /// Get the storage discharge [`Variable`] for the given hour
    fn get_discharge_var(&self, period: Period, month: Month, hour: Hour) -> Variable {
        *self
            .discharge_vars
            .get(&(period, month, hour))
            .expect("No discharge variable found for given params")
    }

    /// Get the binary storage state [`Variable`] for the given hour
    fn get_state_var(&self, period: Period, month: Month, hour: Hour) -> Variable {
        *self
            .state_vars
            .get(&(period, month, hour))
            .expect("No storage state variable found for given params")
    }
}

/// Add new RA variables to the problem.
///
/// When selling excess RA is enabled the variables have no lower bound, with negative values
/// representing sales.
fn add_new_ra_variables(
    problem: &mut Problem,
    variables: &mut NewRAVariableMap,
    model: &Model,
    cost: &CostContribution,
) -> Range<usize> {
    // This line **must** come before we add more variables
    let start = problem.num_cols();

    let lower = if model.sell_excess_ra() {
        f64::NEG_INFINITY
    } else {
        0.0
    };
    for (period, month) in model.domains.iter_period_months() {
        let coeff = cost.objective_coefficient(period, month);
        let var = problem.add_column(coeff, lower..);
        let existing = variables.insert((period, month), var).is_some();
        assert!(!existing, "Duplicate entry for var");
    }

    start..problem.num_cols()
}

/// Add one variable per hour, either continuous and non-negative or binary
fn add_hourly_variables(
    problem: &mut Problem,
    variables: &mut HourlyVariableMap,
    model: &Model,
    binary: bool,
) -> Range<usize> {
    // This line **must** come before we add more variables
    let start = problem.num_cols();

    for key in model.domains.iter_period_month_hours() {
        let var = if binary {
            problem.add_integer_column(0.0, 0.0..=1.0)
        } else {
            problem.add_column(0.0, 0.0..)
        };
        let existing = variables.insert(key, var).is_some();
        assert!(!existing, "Duplicate entry for var");
    }

    start..problem.num_cols()
}

/// The variables, constraints and costs added to a problem for the RA position
pub struct PositionFormulation {
    /// Variables in the problem
    pub variables: VariableMap,
    /// Keys for the constraints in the problem
    pub constraint_keys: ConstraintKeys,
    /// The contribution of RA procurement to the objective
    pub cost: CostContribution,
}

/// Add the RA position variables and constraints to an optimisation problem.
///
/// The problem may already contain other variables and constraints; the column and row offsets of
/// everything added here are recorded in the returned [`PositionFormulation`].
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `model` - The model
/// * `qualifying` - Qualifying capacity of the system in each hour
/// * `storage` - Storage capacity in each month
pub fn add_position_formulation(
    problem: &mut Problem,
    model: &Model,
    qualifying: &QualifyingCapacityMap,
    storage: &StorageCapacityMap,
) -> Result<PositionFormulation> {
    let cost = CostContribution::from_model(model)?;
    let variables = VariableMap::new(problem, model, &cost);
    let constraint_keys = add_model_constraints(problem, &variables, model, qualifying, storage)?;

    Ok(PositionFormulation {
        variables,
        constraint_keys,
        cost,
    })
}

/// The solution to the RA position problem
pub struct Solution {
    solution: highs::Solution,
    formulation: PositionFormulation,
    qualifying: QualifyingCapacityMap,
    storage: StorageCapacityMap,
    /// The objective value for the solution
    pub objective_value: Money,
}

impl Solution {
    /// Read values for a contiguous group of variables
    fn iter_values<'a, K>(
        &'a self,
        keys: indexmap::map::Keys<'a, K, Variable>,
        idx: &Range<usize>,
    ) -> impl Iterator<Item = (&'a K, f64)> {
        keys.zip(self.solution.columns()[idx.clone()].iter().copied())
    }

    /// New RA procured in each month. Negative values are sales.
    pub fn iter_new_ra(&self) -> impl Iterator<Item = (Period, Month, Capacity)> + '_ {
        let variables = &self.formulation.variables;
        self.iter_values(variables.new_ra_vars.keys(), &variables.new_ra_var_idx)
            .map(|(&(period, month), value)| (period, month, Capacity(value)))
    }

    /// Storage charge in each hour
    pub fn iter_charge(&self) -> impl Iterator<Item = (Period, Month, Hour, Capacity)> + '_ {
        let variables = &self.formulation.variables;
        self.iter_values(variables.charge_vars.keys(), &variables.charge_var_idx)
            .map(|(&(period, month, hour), value)| (period, month, hour, Capacity(value)))
    }

    /// Storage discharge in each hour
    pub fn iter_discharge(&self) -> impl Iterator<Item = (Period, Month, Hour, Capacity)> + '_ {
        let variables = &self.formulation.variables;
        self.iter_values(variables.discharge_vars.keys(), &variables.discharge_var_idx)
            .map(|(&(period, month, hour), value)| (period, month, hour, Capacity(value)))
    }

    /// Storage state in each hour (`true` for discharging, `false` for charging)
    pub fn iter_state(&self) -> impl Iterator<Item = (Period, Month, Hour, bool)> + '_ {
        let variables = &self.formulation.variables;
        self.iter_values(variables.state_vars.keys(), &variables.state_var_idx)
            .map(|(&(period, month, hour), value)| (period, month, hour, value > 0.5))
    }

    /// Value of the left-hand side of each hourly balance constraint.
    ///
    /// This is new RA plus discharge minus charge.
    pub fn iter_balance_activity(
        &self,
    ) -> impl Iterator<Item = (Period, Month, Hour, Capacity)> + '_ {
        self.formulation
            .constraint_keys
            .balance_keys
            .zip_rows(self.solution.rows())
            .map(|(&(period, month, hour), value)| (period, month, hour, value))
    }

    /// Cost of RA procurement for each period
    pub fn period_costs(&self) -> IndexMap<Period, Money> {
        self.formulation.cost.period_costs(self.iter_new_ra())
    }

    /// Cost of new RA in the given month
    pub fn monthly_cost(&self, period: Period, month: Month, new_ra: Capacity) -> Money {
        self.formulation.cost.monthly_cost(period, month, new_ra)
    }

    /// Qualifying capacities used to build the problem
    pub fn qualifying(&self) -> &QualifyingCapacityMap {
        &self.qualifying
    }

    /// Storage capacities used to build the problem
    pub fn storage(&self) -> &StorageCapacityMap {
        &self.storage
    }
}

/// Defines the possible errors that can occur when running the solver
#[derive(Debug, Clone)]
pub enum ModelError {
    /// The model definition is incoherent.
    ///
    /// Users should not be able to trigger this error.
    Incoherent(HighsStatus),
    /// An optimal solution could not be found
    NonOptimal(HighsModelStatus),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Incoherent(status) => write!(f, "Incoherent model: {status:?}"),
            ModelError::NonOptimal(status) => {
                write!(f, "Could not find optimal result: {status:?}")
            }
        }
    }
}

impl Error for ModelError {}

/// Try to solve the model, returning an error if the model is incoherent or result is non-optimal
pub fn solve_optimal(model: highs::Model) -> Result<highs::SolvedModel, ModelError> {
    let solved = model.try_solve().map_err(ModelError::Incoherent)?;

    match solved.status() {
        HighsModelStatus::Optimal => Ok(solved),
        status => Err(ModelError::NonOptimal(status)),
    }
}

/// Configure the solver before running it.
///
/// The MIP gap is closed completely so that the procurement result is exact. Solver output is only
/// shown when debug logging is enabled.
fn configure_solver(model: &mut highs::Model) {
    model.set_option("mip_rel_gap", 0.0);

    let verbose = log_enabled!(Level::Debug);
    model.set_option("output_flag", verbose);
    model.set_option("log_to_console", verbose);
}

/// Provides the interface for solving the RA position problem for a model
pub struct PositionProblem<'model> {
    model: &'model Model,
    qualifying: QualifyingCapacityMap,
    storage: StorageCapacityMap,
}

impl<'model> PositionProblem<'model> {
    /// Calculate the qualifying and storage capacities needed to build the problem
    pub fn new(model: &'model Model) -> Result<Self> {
        let storage = calculate_storage_capacities(model)?;
        for ((period, month), capacity) in storage.iter() {
            if capacity.is_empty() {
                debug!("No storage available in period {period}, month {month}");
            }
        }

        Ok(Self {
            model,
            qualifying: QualifyingCapacityMap::calculate(model)?,
            storage,
        })
    }

    /// Add the RA position variables and constraints to the given problem
    pub fn add_to_problem(&self, problem: &mut Problem) -> Result<PositionFormulation> {
        add_position_formulation(problem, self.model, &self.qualifying, &self.storage)
    }

    /// Build and solve the problem on its own, minimising the cost of procurement
    pub fn solve(self) -> Result<Solution> {
        let mut problem = Problem::default();
        let formulation = self.add_to_problem(&mut problem)?;

        let mut highs_model = problem.optimise(Sense::Minimise);
        configure_solver(&mut highs_model);
        let solution = solve_optimal(highs_model)?;

        Ok(Solution {
            solution: solution.get_solution(),
            formulation,
            qualifying: self.qualifying,
            storage: self.storage,
            objective_value: Money(solution.objective_value()),
        })
    }
}
