//! Axis-aligned volumes and block/chunk coordinates used by collision scans.

use glam::{DVec3, IVec3};
use serde::Deserialize;

/// Integer coordinate of one block cell. Cell `(x, y, z)` spans `[x, x + 1)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing the given world-space point.
    pub fn containing(point: DVec3) -> Self {
        let cell = point.floor().as_ivec3();
        Self::from(cell)
    }

    pub fn chunk(self, chunk_size: i32) -> ChunkPos {
        ChunkPos {
            x: self.x.div_euclid(chunk_size),
            z: self.z.div_euclid(chunk_size),
        }
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Column of cells sharing the same load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: DVec3, half_extents: DVec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Overlap test; boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains_point(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn translate(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Every block cell the box overlaps.
    ///
    /// The upper bound is exclusive, so a box ending exactly on a cell boundary does not
    /// reach into the next cell. Degenerate (flat) boxes still report the cell they sit in.
    pub fn block_cells(&self) -> impl Iterator<Item = BlockPos> + use<> {
        let lo = self.min.floor().as_ivec3();
        // Far-out coordinates saturate to the i32 range; the cell below must not wrap.
        let ceil = self.max.ceil().as_ivec3();
        let hi = IVec3::new(
            ceil.x.saturating_sub(1),
            ceil.y.saturating_sub(1),
            ceil.z.saturating_sub(1),
        )
        .max(lo);
        (lo.x..=hi.x).flat_map(move |x| {
            (lo.y..=hi.y).flat_map(move |y| (lo.z..=hi.z).map(move |z| BlockPos::new(x, y, z)))
        })
    }
}

/// Collision volume relative to a barrage position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    local: Aabb,
}

impl HitBox {
    pub fn new(local: Aabb) -> Self {
        Self { local }
    }

    /// Box of the given half extents centered on the barrage position.
    pub fn centered(half_extents: DVec3) -> Self {
        Self::new(Aabb::from_center(DVec3::ZERO, half_extents))
    }

    /// Box of the given half extents centered at `offset` from the barrage position.
    pub fn offset(offset: DVec3, half_extents: DVec3) -> Self {
        Self::new(Aabb::from_center(offset, half_extents))
    }

    pub fn local(&self) -> &Aabb {
        &self.local
    }

    /// World-space box for a barrage standing at `loc`.
    pub fn at(&self, loc: DVec3) -> Aabb {
        self.local.translate(loc)
    }
}

impl Default for HitBox {
    fn default() -> Self {
        Self::centered(DVec3::splat(0.25))
    }
}
