//! Viewer export: the witness as `{container, items[], stats}` JSON.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::types::{Dims, PlacementRecord, Position};

const PALETTE: [&str; 10] = [
    "#ff6464", "#64ff64", "#6464ff", "#ffff64", "#ff64ff", "#64ffff", "#ff9664", "#9664ff",
    "#64ff96", "#ffc896",
];

#[derive(Debug, Clone, Serialize)]
pub struct Visualization {
    pub container: Dims,
    pub items: Vec<VisualItem>,
    pub stats: Stats,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualItem {
    pub id: usize,
    pub position: Position,
    pub dimensions: Dims,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_items: usize,
    pub container_volume: u64,
    pub items_volume: u64,
    pub utilization_rate: f64,
}

impl Stats {
    pub fn compute(container: Dims, records: &[PlacementRecord]) -> Self {
        let container_volume = container.volume();
        let items_volume = records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.orientation.volume()));
        let utilization_rate = if container_volume == 0 {
            0.0
        } else {
            items_volume as f64 / container_volume as f64 * 100.0
        };
        Self {
            total_items: records.len(),
            container_volume,
            items_volume,
            utilization_rate,
        }
    }
}

impl Visualization {
    /// Ids are 1-based in witness order.
    pub fn build(container: Dims, records: &[PlacementRecord]) -> Self {
        let items = records
            .iter()
            .enumerate()
            .map(|(i, r)| VisualItem {
                id: i + 1,
                position: r.position,
                dimensions: r.orientation,
                color: PALETTE[i % PALETTE.len()],
            })
            .collect();
        Self {
            container,
            items,
            stats: Stats::compute(container, records),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
