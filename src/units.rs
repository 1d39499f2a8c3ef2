//! Quantities used throughout the model, wrapped in newtypes so that incompatible units cannot be
//! mixed up by accident.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Common behaviour for all unit types
pub trait UnitType: Copy + PartialOrd + fmt::Debug {
    /// Create a new value of this type from an `f64`
    fn new(value: f64) -> Self;

    /// The underlying `f64` value
    fn value(&self) -> f64;
}

macro_rules! unit_struct {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl UnitType for $name {
            fn new(value: f64) -> Self {
                Self(value)
            }

            fn value(&self) -> f64 {
                self.0
            }
        }

        impl $name {
            /// Create a new value of this type from an `f64`
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// The underlying `f64` value
            pub const fn value(&self) -> f64 {
                self.0
            }

            /// Whether the value is finite
            pub fn is_finite(&self) -> bool {
                self.0.is_finite()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl Mul<Dimensionless> for $name {
            type Output = Self;

            fn mul(self, rhs: Dimensionless) -> Self {
                Self(self.0 * rhs.0)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

unit_struct!(
    /// A dimensionless quantity (e.g. a fraction or efficiency)
    Dimensionless
);
unit_struct!(
    /// Power capacity, in MW
    Capacity
);
unit_struct!(
    /// Energy, in MWh
    Energy
);
unit_struct!(
    /// A duration, in hours
    Hours
);
unit_struct!(
    /// A sum of money
    Money
);
unit_struct!(
    /// Price of capacity, in money per kW-month
    MoneyPerCapacity
);

/// Number of kW in a MW.
///
/// Capacity quantities are in MW but RA prices are quoted per kW-month.
pub const KW_PER_MW: f64 = 1000.0;

impl Mul<Hours> for Capacity {
    type Output = Energy;

    fn mul(self, rhs: Hours) -> Energy {
        Energy(self.0 * rhs.0)
    }
}

impl Mul<MoneyPerCapacity> for Capacity {
    type Output = Money;

    /// Monthly cost of this much capacity, converting MW to kW
    fn mul(self, rhs: MoneyPerCapacity) -> Money {
        Money(self.0 * KW_PER_MW * rhs.0)
    }
}
