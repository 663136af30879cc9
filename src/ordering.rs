use std::cmp::Ordering;

use crate::error::PackError;
use crate::types::Item;

/// Order in which unit items are handed to the search. Picked once per run.
#[derive(Debug, Clone, Copy, Default)]
pub enum OrderingPolicy {
    /// Largest volume first.
    #[default]
    Volume,
    /// Largest face area first, ties broken by volume.
    BaseArea,
    /// Longest edge first, then middle edge, then shortest.
    Dimension,
    Custom(fn(&Item, &Item) -> Ordering),
}

impl OrderingPolicy {
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match self {
            OrderingPolicy::Volume => b.dims.volume().cmp(&a.dims.volume()),
            OrderingPolicy::BaseArea => b
                .dims
                .max_base_area()
                .cmp(&a.dims.max_base_area())
                .then_with(|| b.dims.volume().cmp(&a.dims.volume())),
            OrderingPolicy::Dimension => b.dims.sorted_desc().cmp(&a.dims.sorted_desc()),
            OrderingPolicy::Custom(cmp) => cmp(a, b),
        }
    }

    /// Stable sort, equal items keep their input order.
    pub fn sort(&self, items: &mut [Item]) {
        items.sort_by(|a, b| self.compare(a, b));
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderingPolicy::Volume => "volume",
            OrderingPolicy::BaseArea => "base-area",
            OrderingPolicy::Dimension => "dimension",
            OrderingPolicy::Custom(_) => "custom",
        }
    }
}

impl std::str::FromStr for OrderingPolicy {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volume" => Ok(OrderingPolicy::Volume),
            "base-area" => Ok(OrderingPolicy::BaseArea),
            "dimension" => Ok(OrderingPolicy::Dimension),
            _ => Err(PackError::InvalidInput(format!(
                "invalid order '{}', expected: volume, base-area, or dimension",
                s
            ))),
        }
    }
}
