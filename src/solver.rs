use tracing::{debug, info, warn};

use crate::config::PackOptions;
use crate::search::{SearchStats, Session};
use crate::types::{Dims, Item, PlacementRecord};

/// Decides whether a set of items fits into one container and keeps the
/// placement that proves it.
pub struct Packer {
    container: Dims,
    options: PackOptions,
    units: Vec<Item>,
    placements: Vec<PlacementRecord>,
    stats: SearchStats,
}

impl Packer {
    pub fn new(container: Dims, options: PackOptions) -> Self {
        Self {
            container,
            options,
            units: Vec::new(),
            placements: Vec::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn pack(&mut self, items: &[Item]) -> bool {
        self.units.clear();
        self.placements.clear();
        self.stats = SearchStats::default();

        let requested = items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.total_volume()));
        let available = self.container.volume();
        if requested > available {
            debug!(requested, available, "items exceed container volume");
            return false;
        }

        if items.is_empty() || self.container.is_zero() {
            debug!(container = %self.container, "nothing to search");
            return true;
        }

        if let Err(e) = self.options.check_unit_count(items) {
            warn!(error = %e, "not searching");
            return false;
        }

        self.units = expand_items(items);
        self.options.ordering.sort(&mut self.units);
        debug!(
            container = %self.container,
            units = self.units.len(),
            order = self.options.ordering.name(),
            "starting search"
        );

        let mut session = Session::new(self.container, &self.units, &self.options);
        let found = session.run();
        self.stats = session.stats();
        if found {
            self.placements = session.into_records();
        }

        info!(
            feasible = found,
            units = self.units.len(),
            nodes = self.stats.nodes,
            early_exits = self.stats.early_exits,
            elapsed = ?self.stats.elapsed,
            "packing finished"
        );
        found
    }

    /// Witness of the last successful [`Packer::pack`], in the order the search
    /// unwound: the last unit item placed comes first. Empty after a failure.
    pub fn placements(&self) -> &[PlacementRecord] {
        &self.placements
    }

    /// Unit items of the last search in placement order; `item_index` of a
    /// placement record points into this slice.
    pub fn unit_items(&self) -> &[Item] {
        &self.units
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn container(&self) -> Dims {
        self.container
    }
}

/// Checks whether `items` can all be placed in `container` at once.
pub fn can_pack(container: Dims, items: &[Item], options: PackOptions) -> bool {
    Packer::new(container, options).pack(items)
}

fn expand_items(items: &[Item]) -> Vec<Item> {
    let mut units = Vec::with_capacity(crate::config::unit_count(items) as usize);
    for item in items {
        for _ in 0..item.qty {
            units.push(Item::new(item.dims, 1));
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::ordering::OrderingPolicy;
    use crate::types::PlacedItem;

    fn item(l: u32, w: u32, h: u32, qty: u32) -> Item {
        Item::new(Dims::new(l, w, h), qty)
    }

    fn scenario_container() -> Dims {
        Dims::new(600, 400, 400)
    }

    fn scenario_stack() -> Vec<Item> {
        vec![
            item(380, 320, 100, 2),
            item(380, 320, 220, 1),
            item(380, 320, 200, 1),
        ]
    }

    /// Validates the witness of a successful pack:
    /// 1. One record per unit item, each unit used once
    /// 2. Every box lies within the container
    /// 3. Every box is a rotation of the unit item it claims to be
    /// 4. No two boxes overlap
    fn assert_packing_valid(packer: &Packer, expected_units: usize) {
        let container = packer.container();
        let records = packer.placements();
        assert_eq!(
            records.len(),
            expected_units,
            "expected {} placements, got {}",
            expected_units,
            records.len()
        );

        let mut seen = vec![false; packer.unit_items().len()];
        for r in records {
            assert!(!seen[r.item_index], "unit {} placed twice", r.item_index);
            seen[r.item_index] = true;

            let unit = packer.unit_items()[r.item_index];
            assert_eq!(
                r.orientation.sorted_desc(),
                unit.dims.sorted_desc(),
                "unit {} placed as {} but is {}",
                r.item_index,
                r.orientation,
                unit.dims
            );
            assert!(
                r.placed().within(&container),
                "unit {} ({} @ {}) exceeds container {}",
                r.item_index,
                r.orientation,
                r.position,
                container
            );
        }

        let boxes: Vec<PlacedItem> = records.iter().map(|r| r.placed()).collect();
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                assert!(
                    !boxes[i].overlaps(&boxes[j]),
                    "{} @ {} overlaps {} @ {}",
                    boxes[i].dims,
                    boxes[i].pos,
                    boxes[j].dims,
                    boxes[j].pos
                );
            }
        }
    }

    #[test]
    fn test_exact_fit_at_origin() {
        let mut packer = Packer::new(Dims::new(10, 20, 30), PackOptions::default());
        assert!(packer.pack(&[item(10, 20, 30, 1)]));
        assert_packing_valid(&packer, 1);
        assert_eq!(packer.placements()[0].position, crate::types::Position::ORIGIN);
        assert_eq!(packer.placements()[0].orientation, Dims::new(10, 20, 30));
    }

    #[test]
    fn test_volume_overflow_rejects_without_search() {
        let mut packer = Packer::new(Dims::new(100, 100, 100), PackOptions::default());
        assert!(!packer.pack(&[item(50, 50, 50, 8), item(1, 1, 1, 1)]));
        assert_eq!(packer.stats().nodes, 0);
        assert!(packer.placements().is_empty());
    }

    #[test]
    fn test_volume_check_survives_huge_quantities() {
        let mut packer = Packer::new(Dims::new(2000, 2000, 2000), PackOptions::default());
        let items = [item(2000, 2000, 2000, u32::MAX), item(u32::MAX, u32::MAX, 1, 3)];
        assert!(!packer.pack(&items));
        assert_eq!(packer.stats().nodes, 0);
    }

    #[test]
    fn test_unit_limit_refuses_to_search() {
        let options = PackOptions::builder().max_units(5).build();
        let mut packer = Packer::new(Dims::new(10, 10, 10), options);
        assert!(!packer.pack(&[item(1, 1, 1, 6)]));
        assert_eq!(packer.stats().nodes, 0);
        assert!(packer.unit_items().is_empty());

        assert!(packer.pack(&[item(1, 1, 1, 5)]));
        assert_packing_valid(&packer, 5);
    }

    #[test]
    fn test_huge_quantity_of_small_boxes_is_refused() {
        // passes the volume check, far too many units to expand
        let mut packer = Packer::new(Dims::new(u32::MAX, u32::MAX, 2), PackOptions::default());
        assert!(!packer.pack(&[item(1, 1, 1, u32::MAX)]));
        assert_eq!(packer.stats().nodes, 0);
        assert!(packer.unit_items().is_empty());
    }

    #[test]
    fn test_unbounded_budget() {
        let options = PackOptions::builder().warning_budget(Duration::MAX).build();
        assert!(can_pack(Dims::new(2, 1, 1), &[item(1, 1, 1, 2)], options));
    }

    #[test]
    fn test_no_items_is_feasible() {
        let mut packer = Packer::new(Dims::new(10, 10, 10), PackOptions::default());
        assert!(packer.pack(&[]));
        assert!(packer.placements().is_empty());
        assert_eq!(packer.stats().nodes, 0);
    }

    #[test]
    fn test_zero_container() {
        assert!(can_pack(Dims::new(0, 0, 0), &[], PackOptions::default()));
        assert!(!can_pack(
            Dims::new(0, 0, 0),
            &[item(1, 1, 1, 1)],
            PackOptions::default()
        ));
    }

    #[test]
    fn test_quantities_expand_to_units() {
        let mut packer = Packer::new(Dims::new(4, 4, 1), PackOptions::default());
        assert!(packer.pack(&[item(2, 2, 1, 3), item(1, 1, 1, 4)]));
        assert_eq!(packer.unit_items().len(), 7);
        assert!(packer.unit_items().iter().all(|u| u.qty == 1));
        assert_packing_valid(&packer, 7);
    }

    #[test]
    fn test_geometrically_impossible_reaches_search() {
        // 432 of 1000 units of volume, but any two 6-cubes need 12 along some axis
        let mut packer = Packer::new(Dims::new(10, 10, 10), PackOptions::default());
        assert!(!packer.pack(&[item(6, 6, 6, 2)]));
        assert!(packer.stats().nodes > 0);
        assert!(packer.placements().is_empty());
    }

    #[test]
    fn test_item_too_large_in_every_orientation() {
        assert!(!can_pack(
            Dims::new(10, 10, 10),
            &[item(11, 1, 1, 1)],
            PackOptions::default()
        ));
    }

    #[test]
    fn test_rotation_required() {
        let mut packer = Packer::new(Dims::new(5, 6, 2), PackOptions::default());
        assert!(packer.pack(&[item(2, 5, 5, 1)]));
        assert_packing_valid(&packer, 1);
        assert_eq!(packer.placements()[0].orientation, Dims::new(5, 5, 2));
    }

    #[test]
    fn test_mixed_load_scenario() {
        let mut items = scenario_stack();
        items.push(item(40, 210, 80, 12));
        let mut packer = Packer::new(scenario_container(), PackOptions::default());
        assert!(packer.pack(&items));
        assert_packing_valid(&packer, 15);
    }

    #[test]
    fn test_mixed_load_scenario_under_every_ordering() {
        let mut items = scenario_stack();
        items.push(item(40, 210, 80, 12));
        for ordering in [OrderingPolicy::BaseArea, OrderingPolicy::Dimension] {
            let options = PackOptions::builder().ordering(ordering).build();
            let mut packer = Packer::new(scenario_container(), options);
            assert!(packer.pack(&items), "ordering {}", ordering.name());
            assert_packing_valid(&packer, 15);
        }
    }

    /// Volume alone admits this load, so the answer comes from the search. The
    /// 400-long boards fit by standing one on end beside the stack and laying
    /// the other across the top of the first stacked box.
    #[test]
    fn test_full_length_boards_scenario_is_decided_by_search() {
        let mut items = scenario_stack();
        items.push(item(400, 210, 80, 2));
        let requested: u64 = items.iter().map(|i| i.total_volume()).sum();
        assert!(requested <= scenario_container().volume());

        let mut packer = Packer::new(scenario_container(), PackOptions::default());
        assert!(packer.pack(&items));
        assert!(packer.stats().nodes > 0);
        assert_packing_valid(&packer, 6);
    }

    #[test]
    fn test_repeated_runs_agree() {
        let mut items = scenario_stack();
        items.push(item(40, 210, 80, 12));
        let mut first = Packer::new(scenario_container(), PackOptions::default());
        let mut second = Packer::new(scenario_container(), PackOptions::default());
        assert_eq!(first.pack(&items), second.pack(&items));
        assert_eq!(first.placements(), second.placements());

        // the same packer reused gives the same answer
        let witness = first.placements().to_vec();
        assert!(first.pack(&items));
        assert_eq!(first.placements(), witness.as_slice());
    }

    #[test]
    fn test_failure_clears_previous_witness() {
        let mut packer = Packer::new(Dims::new(10, 10, 10), PackOptions::default());
        assert!(packer.pack(&[item(5, 5, 5, 1)]));
        assert_eq!(packer.placements().len(), 1);
        assert!(!packer.pack(&[item(6, 6, 6, 2)]));
        assert!(packer.placements().is_empty());
    }

    /// Past the budget the search trims orientations, so a packable load can be
    /// reported as infeasible. That is the accepted price of staying responsive.
    #[test]
    fn test_tiny_budget_may_miss_a_packing() {
        let container = Dims::new(5, 6, 2);
        let items = [item(2, 5, 5, 1)];
        assert!(can_pack(container, &items, PackOptions::default()));

        let rushed = PackOptions::builder()
            .warning_budget(Duration::from_nanos(1))
            .build();
        assert!(!can_pack(container, &items, rushed));
    }

    #[test]
    fn test_tiny_budget_terminates_promptly() {
        let rushed = PackOptions::builder()
            .warning_budget(Duration::from_nanos(1))
            .build();
        let started = Instant::now();
        let mut packer = Packer::new(Dims::new(5, 5, 5), rushed);
        let found = packer.pack(&[item(1, 1, 1, 125)]);
        assert!(started.elapsed() < Duration::from_secs(5));
        if found {
            assert_packing_valid(&packer, 125);
        }

        let mut packer = Packer::new(Dims::new(10, 10, 10), rushed);
        let started = Instant::now();
        assert!(!packer.pack(&[item(6, 6, 6, 2), item(1, 1, 1, 50)]));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
