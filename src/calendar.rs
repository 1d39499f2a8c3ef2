//! The index domains of the model: planning periods, months and hours of the representative day.
use crate::input::is_sorted_and_unique;
use anyhow::{Result, ensure};
use itertools::iproduct;
use std::ops::RangeInclusive;

/// A planning period (e.g. a study year)
pub type Period = u32;

/// A calendar month within a period (1-12)
pub type Month = u32;

/// An hour-of-day slot for the representative day of a month (1-24)
pub type Hour = u32;

/// The valid range of month numbers
pub const VALID_MONTHS: RangeInclusive<Month> = 1..=12;

/// The valid range of hour numbers
pub const VALID_HOURS: RangeInclusive<Hour> = 1..=24;

/// The index sets over which parameters, variables and constraints are defined.
///
/// All three sets are sorted and contain no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDomains {
    periods: Vec<Period>,
    months: Vec<Month>,
    hours: Vec<Hour>,
}

/// Check that a set of indices is non-empty, sorted, unique and within `valid` (if given)
fn check_index_set(
    name: &str,
    values: &[u32],
    valid: Option<&RangeInclusive<u32>>,
) -> Result<()> {
    ensure!(!values.is_empty(), "`{name}` is empty");
    ensure!(
        is_sorted_and_unique(values),
        "`{name}` must be composed of unique values in order"
    );
    if let Some(valid) = valid {
        for value in values {
            ensure!(
                valid.contains(value),
                "Invalid value {value} in `{name}`: must be between {} and {}",
                valid.start(),
                valid.end()
            );
        }
    }

    Ok(())
}

impl IndexDomains {
    /// Create a new set of domains, checking that they are valid
    pub fn new(periods: Vec<Period>, months: Vec<Month>, hours: Vec<Hour>) -> Result<Self> {
        check_index_set("periods", &periods, None)?;
        check_index_set("months", &months, Some(&VALID_MONTHS))?;
        check_index_set("hours", &hours, Some(&VALID_HOURS))?;

        Ok(Self {
            periods,
            months,
            hours,
        })
    }

    /// The planning periods
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// The months of each period
    pub fn months(&self) -> &[Month] {
        &self.months
    }

    /// The hours of each month's representative day
    pub fn hours(&self) -> &[Hour] {
        &self.hours
    }

    /// Iterate over every (period, month) pair, in order
    pub fn iter_period_months(&self) -> impl Iterator<Item = (Period, Month)> + '_ {
        iproduct!(self.periods.iter().copied(), self.months.iter().copied())
    }

    /// Iterate over every (period, month, hour) triple, in order
    pub fn iter_period_month_hours(&self) -> impl Iterator<Item = (Period, Month, Hour)> + '_ {
        iproduct!(
            self.periods.iter().copied(),
            self.months.iter().copied(),
            self.hours.iter().copied()
        )
    }

    /// Check that a (period, month) pair lies within the domains
    pub fn check_period_month(&self, period: Period, month: Month) -> Result<()> {
        ensure!(
            self.periods.binary_search(&period).is_ok(),
            "Period {period} is not one of the model's periods {:?}",
            self.periods
        );
        ensure!(
            self.months.binary_search(&month).is_ok(),
            "Month {month} is not one of the model's months {:?}",
            self.months
        );

        Ok(())
    }

    /// Check that a (period, month, hour) triple lies within the domains
    pub fn check_period_month_hour(&self, period: Period, month: Month, hour: Hour) -> Result<()> {
        self.check_period_month(period, month)?;
        ensure!(
            self.hours.binary_search(&hour).is_ok(),
            "Hour {hour} is not one of the model's hours {:?}",
            self.hours
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[test]
    fn new_valid() {
        let domains = IndexDomains::new(vec![2025, 2026], vec![1, 2], vec![1, 2, 3]).unwrap();
        assert_eq!(domains.iter_period_months().count(), 4);
        assert_eq!(domains.iter_period_month_hours().count(), 12);
        assert_eq!(
            domains.iter_period_month_hours().next(),
            Some((2025, 1, 1))
        );
    }

    #[rstest]
    #[case(vec![], vec![1], vec![1], "`periods` is empty")]
    #[case(vec![2026, 2025], vec![1], vec![1], "`periods` must be composed of unique values in order")]
    #[case(vec![2025], vec![1, 1], vec![1], "`months` must be composed of unique values in order")]
    #[case(vec![2025], vec![13], vec![1], "Invalid value 13 in `months`: must be between 1 and 12")]
    #[case(vec![2025], vec![1], vec![0], "Invalid value 0 in `hours`: must be between 1 and 24")]
    #[case(vec![2025], vec![1], vec![], "`hours` is empty")]
    fn new_invalid(
        #[case] periods: Vec<u32>,
        #[case] months: Vec<u32>,
        #[case] hours: Vec<u32>,
        #[case] msg: &str,
    ) {
        assert_error!(IndexDomains::new(periods, months, hours), msg);
    }

    #[test]
    fn check_indices() {
        let domains = IndexDomains::new(vec![2025], vec![1, 2], vec![1, 2, 3]).unwrap();
        assert!(domains.check_period_month_hour(2025, 2, 3).is_ok());
        assert!(domains.check_period_month(2024, 1).is_err());
        assert!(domains.check_period_month(2025, 3).is_err());
        assert!(domains.check_period_month_hour(2025, 1, 4).is_err());
    }
}
