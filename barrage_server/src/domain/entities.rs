// Identifiers and world-facing records shared by the engine and its adapters.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::geometry::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BarrageId(Uuid);

impl BarrageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BarrageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BarrageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Living things a barrage can strike (players, mobs, the shooter itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Level/region a barrage lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Snapshot of a target returned by the world query.
///
/// Identity is the entity id: two snapshots of the same entity are equal even if the
/// entity moved between them.
#[derive(Debug, Clone)]
pub struct TargetEntity {
    pub id: EntityId,
    pub bounds: Aabb,
    pub alive: bool,
}

impl PartialEq for TargetEntity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TargetEntity {}

impl Hash for TargetEntity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Air,
    Liquid,
    Solid,
}

/// Terrain material at one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct BlockState {
    pub kind: BlockKind,
    #[serde(default)]
    pub material: u16,
}

impl BlockState {
    pub const AIR: BlockState = BlockState {
        kind: BlockKind::Air,
        material: 0,
    };

    pub const fn solid(material: u16) -> Self {
        Self {
            kind: BlockKind::Solid,
            material,
        }
    }

    pub const fn liquid(material: u16) -> Self {
        Self {
            kind: BlockKind::Liquid,
            material,
        }
    }

    pub fn is_air(&self) -> bool {
        self.kind == BlockKind::Air
    }

    pub fn is_liquid(&self) -> bool {
        self.kind == BlockKind::Liquid
    }

    pub fn is_solid(&self) -> bool {
        self.kind == BlockKind::Solid
    }
}
