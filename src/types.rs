use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

/// Edge lengths of an axis-aligned box. Used for the container, for items and
/// for a single orientation of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl Dims {
    pub fn new(length: u32, width: u32, height: u32) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Builds dimensions from untrusted signed input.
    pub fn try_new(length: i64, width: i64, height: i64) -> Result<Self> {
        Ok(Self {
            length: edge("length", length)?,
            width: edge("width", width)?,
            height: edge("height", height)?,
        })
    }

    /// Saturates at `u64::MAX` instead of wrapping.
    pub fn volume(&self) -> u64 {
        (self.length as u64 * self.width as u64).saturating_mul(self.height as u64)
    }

    /// Largest face area over the three ways the box can stand.
    pub fn max_base_area(&self) -> u64 {
        let (l, w, h) = (self.length as u64, self.width as u64, self.height as u64);
        (l * w).max(l * h).max(w * h)
    }

    /// Edges sorted longest first.
    pub fn sorted_desc(&self) -> [u32; 3] {
        let mut edges = [self.length, self.width, self.height];
        edges.sort_unstable_by(|a, b| b.cmp(a));
        edges
    }

    pub fn fits_in(&self, container: &Dims) -> bool {
        self.length <= container.length
            && self.width <= container.width
            && self.height <= container.height
    }

    pub fn is_zero(&self) -> bool {
        self.length == 0 && self.width == 0 && self.height == 0
    }
}

fn edge(axis: &'static str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| PackError::InvalidDimension { axis, value })
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub dims: Dims,
    pub qty: u32,
}

impl Item {
    pub fn new(dims: Dims, qty: u32) -> Self {
        Self { dims, qty }
    }

    pub fn try_new(length: i64, width: i64, height: i64, qty: i64) -> Result<Self> {
        let dims = Dims::try_new(length, width, height)?;
        let qty = u32::try_from(qty).map_err(|_| PackError::InvalidQuantity(qty))?;
        Ok(Self { dims, qty })
    }

    /// Volume of every copy together.
    pub fn total_volume(&self) -> u64 {
        self.dims.volume().saturating_mul(self.qty as u64)
    }
}

/// Minimum corner of a placed box in container space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0, z: 0 };

    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// An oriented box occupying `[x, x+L) x [y, y+W) x [z, z+H)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedItem {
    pub dims: Dims,
    pub pos: Position,
}

impl PlacedItem {
    pub fn new(dims: Dims, pos: Position) -> Self {
        Self { dims, pos }
    }

    fn spans(&self) -> [(u64, u64); 3] {
        let p = self.pos;
        let d = self.dims;
        [
            (p.x as u64, p.x as u64 + d.length as u64),
            (p.y as u64, p.y as u64 + d.width as u64),
            (p.z as u64, p.z as u64 + d.height as u64),
        ]
    }

    /// Touching faces do not count as an overlap.
    pub fn overlaps(&self, other: &PlacedItem) -> bool {
        self.spans()
            .iter()
            .zip(other.spans().iter())
            .all(|(a, b)| a.0 < b.1 && b.0 < a.1)
    }

    pub fn within(&self, container: &Dims) -> bool {
        let [x, y, z] = self.spans();
        x.1 <= container.length as u64
            && y.1 <= container.width as u64
            && z.1 <= container.height as u64
    }

    pub fn collides_with_any(&self, placed: &[PlacedItem]) -> bool {
        placed.iter().any(|p| self.overlaps(p))
    }
}

/// One entry of the witness: which unit item went where, and how it was turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub item_index: usize,
    pub position: Position,
    pub orientation: Dims,
}

impl PlacementRecord {
    pub fn placed(&self) -> PlacedItem {
        PlacedItem::new(self.orientation, self.position)
    }
}
