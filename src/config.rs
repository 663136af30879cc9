use std::time::Duration;

use crate::error::{PackError, Result};
use crate::ordering::OrderingPolicy;
use crate::types::Item;

/// Thresholds of the time-boxing heuristic, as multiples of the warning budget.
///
/// Past `near_timeout_factor` the search narrows each level to a few
/// orientations and anchors. Past `restrict_factor` a failed subtree stops its
/// frame unless it was the first anchor of the first orientation. Past
/// `abort_factor` every failed subtree stops its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBox {
    pub near_timeout_factor: f64,
    pub restrict_factor: f64,
    pub abort_factor: f64,
    pub max_orientations_near_timeout: usize,
    pub max_positions_near_timeout: usize,
}

impl TimeBox {
    pub const DEFAULT_NEAR_TIMEOUT_FACTOR: f64 = 0.5;
    pub const DEFAULT_RESTRICT_FACTOR: f64 = 1.0;
    pub const DEFAULT_ABORT_FACTOR: f64 = 2.0;
    pub const DEFAULT_MAX_ORIENTATIONS_NEAR_TIMEOUT: usize = 2;
    pub const DEFAULT_MAX_POSITIONS_NEAR_TIMEOUT: usize = 3;

    /// Rejects factors that are negative, NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("near_timeout_factor", self.near_timeout_factor),
            ("restrict_factor", self.restrict_factor),
            ("abort_factor", self.abort_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PackError::InvalidFactor { name, value });
            }
        }
        Ok(())
    }

    /// Thresholds for `budget`. A negative or NaN factor counts as zero and a
    /// threshold too large for `Duration` is never reached.
    pub(crate) fn deadlines(&self, budget: Duration) -> Deadlines {
        Deadlines {
            near_timeout: scale(budget, self.near_timeout_factor),
            restrict: scale(budget, self.restrict_factor),
            abort: scale(budget, self.abort_factor),
        }
    }
}

fn scale(budget: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(budget.as_secs_f64() * factor.max(0.0)).unwrap_or(Duration::MAX)
}

impl Default for TimeBox {
    fn default() -> Self {
        Self {
            near_timeout_factor: Self::DEFAULT_NEAR_TIMEOUT_FACTOR,
            restrict_factor: Self::DEFAULT_RESTRICT_FACTOR,
            abort_factor: Self::DEFAULT_ABORT_FACTOR,
            max_orientations_near_timeout: Self::DEFAULT_MAX_ORIENTATIONS_NEAR_TIMEOUT,
            max_positions_near_timeout: Self::DEFAULT_MAX_POSITIONS_NEAR_TIMEOUT,
        }
    }
}

/// Elapsed-time thresholds of one run, resolved from a budget.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadlines {
    pub near_timeout: Duration,
    pub restrict: Duration,
    pub abort: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    pub warning_budget: Duration,
    pub ordering: OrderingPolicy,
    pub time_box: TimeBox,
    /// Largest number of unit items a single pack may expand to.
    pub max_units: usize,
}

impl PackOptions {
    pub const DEFAULT_WARNING_BUDGET: Duration = Duration::from_secs(3);
    pub const DEFAULT_MAX_UNITS: usize = 10_000;

    pub fn builder() -> PackOptionsBuilder {
        PackOptionsBuilder::default()
    }

    /// Total number of unit items in `items`, or an error past `max_units`.
    pub fn check_unit_count(&self, items: &[Item]) -> Result<u64> {
        let count = unit_count(items);
        if count > self.max_units as u64 {
            return Err(PackError::TooManyUnits {
                count,
                max: self.max_units,
            });
        }
        Ok(count)
    }
}

pub(crate) fn unit_count(items: &[Item]) -> u64 {
    items
        .iter()
        .fold(0u64, |acc, item| acc.saturating_add(item.qty as u64))
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            warning_budget: Self::DEFAULT_WARNING_BUDGET,
            ordering: OrderingPolicy::default(),
            time_box: TimeBox::default(),
            max_units: Self::DEFAULT_MAX_UNITS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackOptionsBuilder {
    options: PackOptions,
}

impl PackOptionsBuilder {
    pub fn warning_budget(mut self, budget: Duration) -> Self {
        self.options.warning_budget = budget;
        self
    }

    pub fn ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.options.ordering = ordering;
        self
    }

    pub fn time_box(mut self, time_box: TimeBox) -> Self {
        self.options.time_box = time_box;
        self
    }

    pub fn max_units(mut self, max_units: usize) -> Self {
        self.options.max_units = max_units;
        self
    }

    pub fn build(self) -> PackOptions {
        self.options
    }

    /// Like [`PackOptionsBuilder::build`], but rejects unusable time-box factors.
    pub fn try_build(self) -> Result<PackOptions> {
        self.options.time_box.validate()?;
        Ok(self.options)
    }
}
