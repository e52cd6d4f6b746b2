//! Scenario files: named option presets, initial world contents and the barrages to launch.
//!
//! ```toml
//! [presets.arrow]
//! max_living_tick = 100
//! enable_speed = true
//! speed = 1.5
//!
//! [world]
//! chunk_size = 16
//! blocks = [{ x = 0, y = 64, z = 10, kind = "solid", material = 1 }]
//! entities = [{ id = 7, center = [0.0, 64.5, 6.0] }]
//!
//! [[barrages]]
//! preset = "arrow"
//! position = [0.5, 64.5, 0.5]
//! direction = [0.0, 0.0, 1.0]
//! shooter = 1
//! ```

use std::collections::HashMap;
use std::path::Path;

use glam::DVec3;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::{
    Aabb, Barrage, BarrageBehavior, BarrageOption, BlockKind, BlockPos, BlockState, ChunkPos,
    EntityId, HitBox, HitEvent, TargetEntity, WorldId,
};
use crate::interface_adapters::{
    BOLT_KIND, Bolt, DEFAULT_CHUNK_SIZE, GridWorld, SPLITTER_KIND, Splitter, TracingPuppet,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub presets: HashMap<String, BarrageOption>,
    pub world: WorldConfig,
    pub barrages: Vec<BarrageSpawn>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub chunk_size: i32,
    pub unloaded_chunks: Vec<ChunkEntry>,
    pub blocks: Vec<BlockEntry>,
    pub entities: Vec<EntityEntry>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            unloaded_chunks: Vec::new(),
            blocks: Vec::new(),
            entities: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkEntry {
    #[serde(default)]
    pub world: WorldId,
    pub x: i32,
    pub z: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockEntry {
    #[serde(default)]
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub kind: BlockKind,
    #[serde(default)]
    pub material: u16,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityEntry {
    #[serde(default)]
    pub world: WorldId,
    pub id: EntityId,
    pub center: DVec3,
    #[serde(default = "default_entity_half_extents")]
    pub half_extents: DVec3,
    #[serde(default = "default_alive")]
    pub alive: bool,
}

fn default_entity_half_extents() -> DVec3 {
    DVec3::new(0.3, 0.9, 0.3)
}

fn default_alive() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    #[default]
    Bolt,
    Splitter,
}

impl SpawnKind {
    pub fn label(self) -> &'static str {
        match self {
            SpawnKind::Bolt => BOLT_KIND,
            SpawnKind::Splitter => SPLITTER_KIND,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarrageSpawn {
    // Falls back to `BarrageOption::default()`.
    pub preset: Option<String>,
    #[serde(default)]
    pub kind: SpawnKind,
    #[serde(default)]
    pub world: WorldId,
    pub position: DVec3,
    #[serde(default)]
    pub direction: DVec3,
    pub shooter: Option<EntityId>,
    pub hit_box: Option<DVec3>,
    // Splitter only.
    #[serde(default = "default_fragments")]
    pub fragments: u32,
    pub fragment_preset: Option<String>,
}

fn default_fragments() -> u32 {
    6
}

impl ScenarioConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let scenario: ScenarioConfig = toml::from_str(raw)?;
        scenario.check_presets()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn preset(&self, name: Option<&str>) -> Result<BarrageOption, ConfigError> {
        match name {
            None => Ok(BarrageOption::default()),
            Some(name) => self
                .presets
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownPreset(name.to_string())),
        }
    }

    pub fn build_world(&self) -> GridWorld {
        let mut world = GridWorld::new(self.world.chunk_size);
        for chunk in &self.world.unloaded_chunks {
            world.unload_chunk(chunk.world, ChunkPos::new(chunk.x, chunk.z));
        }
        for block in &self.world.blocks {
            world.set_block(
                block.world,
                BlockPos::new(block.x, block.y, block.z),
                BlockState {
                    kind: block.kind,
                    material: block.material,
                },
            );
        }
        for entity in &self.world.entities {
            world.upsert_entity(
                entity.world,
                TargetEntity {
                    id: entity.id,
                    bounds: Aabb::from_center(entity.center, entity.half_extents),
                    alive: entity.alive,
                },
            );
        }
        world
    }

    /// Builds every `[[barrages]]` entry, in file order.
    pub fn build_barrages(
        &self,
        events: &broadcast::Sender<HitEvent>,
    ) -> Result<Vec<Barrage>, ConfigError> {
        self.barrages
            .iter()
            .map(|spawn| self.build_barrage(spawn, events))
            .collect()
    }

    fn build_barrage(
        &self,
        spawn: &BarrageSpawn,
        events: &broadcast::Sender<HitEvent>,
    ) -> Result<Barrage, ConfigError> {
        let option = self.preset(spawn.preset.as_deref())?;
        let behavior: Box<dyn BarrageBehavior> = match spawn.kind {
            SpawnKind::Bolt => Box::new(Bolt::new(events.clone())),
            SpawnKind::Splitter => Box::new(Splitter::new(
                events.clone(),
                spawn.fragments,
                self.preset(spawn.fragment_preset.as_deref())?,
            )),
        };

        let mut barrage = Barrage::new(
            spawn.world,
            spawn.position,
            spawn.direction,
            option,
            behavior,
            Box::new(TracingPuppet::new(spawn.kind.label())),
        );
        if let Some(shooter) = spawn.shooter {
            barrage = barrage.with_shooter(shooter);
        }
        if let Some(half_extents) = spawn.hit_box {
            barrage = barrage.with_hit_box(HitBox::centered(half_extents));
        }
        Ok(barrage)
    }

    fn check_presets(&self) -> Result<(), ConfigError> {
        for spawn in &self.barrages {
            self.preset(spawn.preset.as_deref())?;
            self.preset(spawn.fragment_preset.as_deref())?;
        }
        Ok(())
    }
}
