//! Time-boxed depth-first search over item order, orientation and anchor.
//!
//! A [`Session`] owns all mutable state of one run. Each level places
//! `items[index]`: it walks the orientations, asks [`candidate_positions`] for
//! anchors, claims an anchor in the used set, checks the box against the trail
//! and descends. The claim and the trail push are undone on every path out of
//! the attempt, so sibling branches never see each other's state.
//!
//! Levels live on an explicit stack of [`Frame`]s rather than the call stack,
//! so the depth of the search is bounded by the heap and not by the size of
//! the thread it runs on.
//!
//! Once the run gets close to its warning budget the search narrows itself and
//! may give up on branches that could still succeed. A `false` result after the
//! budget has passed therefore only means no packing was found in time.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{Deadlines, PackOptions, TimeBox};
use crate::extreme_point::candidate_positions;
use crate::orientation::orientations;
use crate::types::{Dims, Item, PlacedItem, PlacementRecord, Position};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of search levels entered. Zero when the run never searched.
    pub nodes: u64,
    /// Number of times the early-exit policy cut a frame short.
    pub early_exits: u64,
    pub elapsed: Duration,
}

/// One search level: what is left to try for `items[index]`.
///
/// While a child level is open, `positions[pos_idx - 1]` is the anchor it was
/// opened from. That anchor is claimed in the used set and its box is the last
/// entry of the trail.
struct Frame {
    index: usize,
    near_timeout: bool,
    orients: Vec<Dims>,
    orient_idx: usize,
    /// Orientation whose anchors are being walked; `None` before the first one.
    orientation: Option<Dims>,
    positions: Vec<Position>,
    pos_idx: usize,
}

pub struct Session<'a> {
    container: Dims,
    items: &'a [Item],
    started: Instant,
    deadlines: Deadlines,
    time_box: TimeBox,
    used: HashSet<Position>,
    records: Vec<PlacementRecord>,
    stats: SearchStats,
}

impl<'a> Session<'a> {
    /// `items` must already be unit items in the order they should be placed.
    pub fn new(container: Dims, items: &'a [Item], options: &PackOptions) -> Self {
        Self {
            container,
            items,
            started: Instant::now(),
            deadlines: options.time_box.deadlines(options.warning_budget),
            time_box: options.time_box,
            used: HashSet::new(),
            records: Vec::with_capacity(items.len()),
            stats: SearchStats::default(),
        }
    }

    /// Searches from the first item with an empty trail.
    pub fn run(&mut self) -> bool {
        self.started = Instant::now();
        self.used.clear();
        self.records.clear();
        self.stats = SearchStats::default();

        let found = self.search();
        self.stats.elapsed = self.started.elapsed();
        found
    }

    /// Witness of a successful run, deepest placement first.
    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PlacementRecord> {
        self.records
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn search(&mut self) -> bool {
        let mut trail: Vec<PlacedItem> = Vec::with_capacity(self.items.len());
        let mut frames: Vec<Frame> = Vec::with_capacity(self.items.len());

        // result of the level that just closed, handed to its parent
        let mut closed = match self.open(0) {
            Some(frame) => {
                frames.push(frame);
                None
            }
            None => return true,
        };

        while let Some(frame) = frames.last_mut() {
            if let Some(placed) = closed.take()
                && let Some(last) = trail.pop()
            {
                let pos_idx = frame.pos_idx - 1;
                self.used.remove(&last.pos);

                if placed {
                    self.records.push(PlacementRecord {
                        item_index: frame.index,
                        position: last.pos,
                        orientation: last.dims,
                    });
                    frames.pop();
                    closed = Some(true);
                    continue;
                }

                let elapsed = self.started.elapsed();
                if should_exit_early(elapsed, &self.deadlines, pos_idx, frame.orient_idx) {
                    self.stats.early_exits += 1;
                    debug!(
                        index = frame.index,
                        pos_idx,
                        orient_idx = frame.orient_idx,
                        ?elapsed,
                        "time budget exceeded, abandoning branch"
                    );
                    frames.pop();
                    closed = Some(false);
                    continue;
                }
            }

            match self.advance(frame, &trail) {
                Some(candidate) => {
                    let next = frame.index + 1;
                    trail.push(candidate);
                    match self.open(next) {
                        Some(child) => frames.push(child),
                        None => closed = Some(true),
                    }
                }
                None => {
                    frames.pop();
                    closed = Some(false);
                }
            }
        }

        closed == Some(true)
    }

    /// Enters the level for `items[index]`, or returns `None` when every item
    /// is already placed.
    fn open(&mut self, index: usize) -> Option<Frame> {
        self.stats.nodes += 1;
        if index >= self.items.len() {
            return None;
        }

        let near_timeout = self.started.elapsed() > self.deadlines.near_timeout;
        let mut orients = orientations(self.items[index].dims);
        if near_timeout {
            orients.truncate(self.time_box.max_orientations_near_timeout);
        }

        Some(Frame {
            index,
            near_timeout,
            orients,
            orient_idx: 0,
            orientation: None,
            positions: Vec::new(),
            pos_idx: 0,
        })
    }

    /// Moves `frame` to its next collision-free anchor and claims it. Returns
    /// `None` once the frame has nothing left to try.
    fn advance(&mut self, frame: &mut Frame, trail: &[PlacedItem]) -> Option<PlacedItem> {
        loop {
            if let Some(orientation) = frame.orientation {
                while let Some(&pos) = frame.positions.get(frame.pos_idx) {
                    frame.pos_idx += 1;
                    let candidate = PlacedItem::new(orientation, pos);
                    if candidate.collides_with_any(trail) {
                        continue;
                    }
                    self.used.insert(pos);
                    return Some(candidate);
                }

                // every anchor of this orientation failed
                if frame.near_timeout {
                    return None;
                }
                frame.orientation = None;
                frame.orient_idx += 1;
            }

            let orientation = *frame.orients.get(frame.orient_idx)?;
            if !orientation.fits_in(&self.container) {
                frame.orient_idx += 1;
                continue;
            }

            let mut positions = candidate_positions(orientation, trail, &self.container, &self.used);
            if frame.near_timeout {
                positions.truncate(self.time_box.max_positions_near_timeout);
            }
            frame.orientation = Some(orientation);
            frame.positions = positions;
            frame.pos_idx = 0;
        }
    }
}

/// Whether a frame whose last subtree failed should stop trying alternatives.
fn should_exit_early(
    elapsed: Duration,
    deadlines: &Deadlines,
    pos_idx: usize,
    orient_idx: usize,
) -> bool {
    if elapsed > deadlines.restrict && (pos_idx >= 1 || orient_idx >= 1) {
        return true;
    }
    elapsed > deadlines.abort
}
