//! Code for working with the discrete planning horizon.
//!
//! The horizon is a finite ordered sequence of periods (e.g. months), numbered
//! from 1. All contract dates and capacities refer to these period numbers.
use crate::error::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A 1-based index into the planning horizon
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Period(pub u32);

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Period {
    /// The previous period, if there is one
    pub fn pred(self) -> Option<Period> {
        if self.0 > 1 {
            Some(Period(self.0 - 1))
        } else {
            None
        }
    }
}

/// The discretised planning horizon
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Horizon {
    n_periods: u32,
}

impl Horizon {
    /// Create a horizon of `n_periods` periods.
    ///
    /// # Returns
    ///
    /// The horizon, or [`PlanError::Config`] if `n_periods` is zero.
    pub fn new(n_periods: u32) -> PlanResult<Self> {
        if n_periods == 0 {
            return Err(PlanError::config("horizon must contain at least one period"));
        }

        Ok(Self { n_periods })
    }

    /// The number of periods in the horizon
    pub fn n_periods(&self) -> u32 {
        self.n_periods
    }

    /// The last period of the horizon
    pub fn last(&self) -> Period {
        Period(self.n_periods)
    }

    /// Whether `period` lies inside the horizon
    pub fn contains(&self, period: Period) -> bool {
        (1..=self.n_periods).contains(&period.0)
    }

    /// Iterate over all periods in order
    pub fn iter(&self) -> impl Iterator<Item = Period> + Clone {
        (1..=self.n_periods).map(Period)
    }

    /// Iterate over the periods in `(start, start + length]`, clipped to the horizon.
    ///
    /// Used for storage-limit windows: the outflow opportunities following `start`.
    pub fn iter_window(&self, start: Period, length: u32) -> impl Iterator<Item = Period> {
        let end = start.0.saturating_add(length).min(self.n_periods);
        (start.0 + 1..=end).map(Period)
    }
}
