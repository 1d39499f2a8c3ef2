//! Cost of procuring (or selling) the always-available RA product.
use crate::calendar::{Month, Period};
use crate::model::Model;
use crate::units::{Capacity, KW_PER_MW, Money, MoneyPerCapacity};
use anyhow::Result;
use indexmap::IndexMap;
use log::warn;

/// The contribution of RA procurement to the objective function.
///
/// Holds the monthly price of the RA product so that the same values are used both for the
/// objective coefficients and when costing a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct CostContribution {
    prices: IndexMap<(Period, Month), MoneyPerCapacity>,
}

impl CostContribution {
    /// Gather RA prices for every period and month in the model.
    ///
    /// When sales are allowed, sold RA is valued at the procurement price. A warning is issued for
    /// any month where the resale value differs from this.
    pub fn from_model(model: &Model) -> Result<Self> {
        let sell = model.sell_excess_ra();
        let mut prices = IndexMap::new();
        for (period, month) in model.domains.iter_period_months() {
            let ra_cost = model.tables.cost(period, month)?;
            if sell && ra_cost.resale_value != ra_cost.cost {
                warn!(
                    "Resale value of RA for period {period}, month {month} ({}) differs from its \
                    cost ({}). Sales will be valued at cost.",
                    ra_cost.resale_value, ra_cost.cost
                );
            }
            prices.insert((period, month), ra_cost.cost);
        }

        Ok(Self { prices })
    }

    /// The price of RA in the given month
    pub fn price(&self, period: Period, month: Month) -> MoneyPerCapacity {
        *self
            .prices
            .get(&(period, month))
            .expect("No RA price for given period and month")
    }

    /// Objective coefficient for one MW of new RA in the given month
    pub fn objective_coefficient(&self, period: Period, month: Month) -> f64 {
        self.price(period, month).value() * KW_PER_MW
    }

    /// Cost of procuring the given amount of RA in a month
    pub fn monthly_cost(&self, period: Period, month: Month, new_ra: Capacity) -> Money {
        new_ra * self.price(period, month)
    }

    /// Total procurement cost for each period
    pub fn period_costs<I>(&self, new_ra: I) -> IndexMap<Period, Money>
    where
        I: IntoIterator<Item = (Period, Month, Capacity)>,
    {
        let mut costs = IndexMap::new();
        for (period, month, capacity) in new_ra {
            let cost = self.monthly_cost(period, month, capacity);
            *costs.entry(period).or_insert(Money(0.0)) += cost;
        }

        costs
    }

    /// Total procurement cost across all periods
    pub fn total_cost<I>(&self, new_ra: I) -> Money
    where
        I: IntoIterator<Item = (Period, Month, Capacity)>,
    {
        new_ra
            .into_iter()
            .map(|(period, month, capacity)| self.monthly_cost(period, month, capacity))
            .sum()
    }
}
