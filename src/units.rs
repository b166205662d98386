#![allow(missing_docs)]

//! This module defines the unit types used by the planning model.

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            serde::Serialize,
            serde::Deserialize,
            derive_more::Add,
            derive_more::Sub,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn from(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::from(self.0 * lhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Tonnes);
unit_struct!(Money);

// Derived quantities
unit_struct!(MoneyPerTonne);

// Multiplication rules
impl_mul!(MoneyPerTonne, Tonnes, Money);

impl Tonnes {
    /// Zero tonnes, the explicit default for unspecified capacities.
    pub const ZERO: Tonnes = Tonnes(0.0);
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.map(|m| m.0).sum())
    }
}

impl std::iter::Sum for Tonnes {
    fn sum<I: Iterator<Item = Tonnes>>(iter: I) -> Self {
        Tonnes(iter.map(|t| t.0).sum())
    }
}
