// In-memory world backing the world-query port for headless runs and tests.

use std::collections::{HashMap, HashSet};

use crate::domain::{
    Aabb, BlockPos, BlockState, ChunkPos, EntityId, TargetEntity, WorldId, WorldQuery,
};

pub const DEFAULT_CHUNK_SIZE: i32 = 16;

#[derive(Debug, Default)]
struct Level {
    blocks: HashMap<BlockPos, BlockState>,
    unloaded: HashSet<ChunkPos>,
    entities: HashMap<EntityId, TargetEntity>,
}

/// Sparse block grid plus an entity list per world. Unknown cells are air and every chunk is
/// loaded unless explicitly unloaded.
#[derive(Debug)]
pub struct GridWorld {
    chunk_size: i32,
    levels: HashMap<WorldId, Level>,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl GridWorld {
    pub fn new(chunk_size: i32) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            levels: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn set_block(&mut self, world: WorldId, pos: BlockPos, state: BlockState) {
        let level = self.levels.entry(world).or_default();
        if state.is_air() {
            level.blocks.remove(&pos);
        } else {
            level.blocks.insert(pos, state);
        }
    }

    pub fn unload_chunk(&mut self, world: WorldId, chunk: ChunkPos) {
        self.levels.entry(world).or_default().unloaded.insert(chunk);
    }

    pub fn load_chunk(&mut self, world: WorldId, chunk: ChunkPos) {
        if let Some(level) = self.levels.get_mut(&world) {
            level.unloaded.remove(&chunk);
        }
    }

    /// Adds or replaces an entity.
    pub fn upsert_entity(&mut self, world: WorldId, entity: TargetEntity) {
        self.levels
            .entry(world)
            .or_default()
            .entities
            .insert(entity.id, entity);
    }

    pub fn remove_entity(&mut self, world: WorldId, id: EntityId) -> Option<TargetEntity> {
        self.levels.get_mut(&world)?.entities.remove(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.levels.values().map(|l| l.entities.len()).sum()
    }
}

impl WorldQuery for GridWorld {
    fn is_chunk_loaded(&self, world: WorldId, pos: BlockPos) -> bool {
        self.levels
            .get(&world)
            .is_none_or(|level| !level.unloaded.contains(&pos.chunk(self.chunk_size)))
    }

    fn block_state_at(&self, world: WorldId, pos: BlockPos) -> BlockState {
        self.levels
            .get(&world)
            .and_then(|level| level.blocks.get(&pos))
            .copied()
            .unwrap_or(BlockState::AIR)
    }

    fn entities_overlapping(
        &self,
        world: WorldId,
        area: &Aabb,
        filter: &dyn Fn(&TargetEntity) -> bool,
    ) -> Vec<TargetEntity> {
        let Some(level) = self.levels.get(&world) else {
            return Vec::new();
        };
        let mut found: Vec<TargetEntity> = level
            .entities
            .values()
            .filter(|e| area.intersects(&e.bounds) && filter(e))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn entity(id: u64, center: DVec3) -> TargetEntity {
        TargetEntity {
            id: EntityId(id),
            bounds: Aabb::from_center(center, DVec3::splat(0.5)),
            alive: true,
        }
    }

    #[test]
    fn when_chunk_is_unloaded_then_only_that_world_is_affected() {
        let mut world = GridWorld::new(16);
        world.unload_chunk(WorldId(1), ChunkPos::new(0, 0));

        assert!(!world.is_chunk_loaded(WorldId(1), BlockPos::new(15, 64, 15)));
        assert!(world.is_chunk_loaded(WorldId(1), BlockPos::new(16, 64, 15)));
        assert!(world.is_chunk_loaded(WorldId(2), BlockPos::new(0, 64, 0)));

        world.load_chunk(WorldId(1), ChunkPos::new(0, 0));
        assert!(world.is_chunk_loaded(WorldId(1), BlockPos::new(15, 64, 15)));
    }

    #[test]
    fn when_block_is_set_to_air_then_it_is_cleared() {
        let mut world = GridWorld::default();
        let pos = BlockPos::new(1, 2, 3);
        world.set_block(WorldId(0), pos, BlockState::solid(4));
        assert!(world.block_state_at(WorldId(0), pos).is_solid());

        world.set_block(WorldId(0), pos, BlockState::AIR);
        assert!(world.block_state_at(WorldId(0), pos).is_air());
    }

    #[test]
    fn when_querying_entities_then_filter_and_overlap_both_apply() {
        let mut world = GridWorld::default();
        world.upsert_entity(WorldId(0), entity(1, DVec3::ZERO));
        world.upsert_entity(WorldId(0), entity(2, DVec3::new(0.2, 0.0, 0.0)));
        world.upsert_entity(WorldId(0), entity(3, DVec3::new(10.0, 0.0, 0.0)));

        let area = Aabb::from_center(DVec3::ZERO, DVec3::splat(0.25));
        let found = world.entities_overlapping(WorldId(0), &area, &|e| e.id != EntityId(2));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, EntityId(1));
        assert!(
            world
                .entities_overlapping(WorldId(7), &area, &|_| true)
                .is_empty()
        );
    }
}
