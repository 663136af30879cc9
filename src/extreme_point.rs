//! Candidate anchor generation for the next box.
//!
//! Every placed box contributes three extreme points: on its top face, past its
//! right face (length axis) and past its front face (width axis). Together with
//! the container origin these are the only anchors the search tries, which keeps
//! the branching factor proportional to the number of placed boxes.

use std::collections::HashSet;

use crate::types::{Dims, PlacedItem, Position};

/// Anchors at which `orientation` could start, in try order.
///
/// Anchors already claimed in `used` are skipped, duplicates are emitted once,
/// and anything that would push the box outside `container` is filtered out.
/// Collisions with placed boxes are not checked here.
pub fn candidate_positions(
    orientation: Dims,
    placed: &[PlacedItem],
    container: &Dims,
    used: &HashSet<Position>,
) -> Vec<Position> {
    if placed.is_empty() {
        if used.contains(&Position::ORIGIN) {
            return Vec::new();
        }
        return vec![Position::ORIGIN];
    }

    let mut candidates: Vec<Position> = Vec::with_capacity(placed.len() * 3 + 1);
    let mut seen: HashSet<Position> = HashSet::with_capacity(placed.len() * 3 + 1);
    let mut push = |pos: Position| {
        if !used.contains(&pos) && seen.insert(pos) {
            candidates.push(pos);
        }
    };

    push(Position::ORIGIN);
    for p in placed {
        for anchor in extreme_points(p).into_iter().flatten() {
            push(anchor);
        }
    }

    candidates.retain(|&pos| PlacedItem::new(orientation, pos).within(container));
    candidates
}

/// Top, right and front anchors of a placed box.
fn extreme_points(p: &PlacedItem) -> [Option<Position>; 3] {
    let Position { x, y, z } = p.pos;
    [
        z.checked_add(p.dims.height).map(|z| Position::new(x, y, z)),
        x.checked_add(p.dims.length).map(|x| Position::new(x, y, z)),
        y.checked_add(p.dims.width).map(|y| Position::new(x, y, z)),
    ]
}
