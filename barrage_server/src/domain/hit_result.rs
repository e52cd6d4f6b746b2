use std::collections::HashSet;

use crate::domain::entities::{BarrageId, BlockState, TargetEntity};
use crate::domain::geometry::BlockPos;

/// Everything one collision scan struck.
///
/// An empty result means "no collision"; scans never resolve on one. Forced expiry is the
/// only path that hands an empty result to `on_hit`.
#[derive(Debug, Clone, Default)]
pub struct BarrageHitResult {
    /// Last terrain material recorded by the scan.
    pub hit_block_state: Option<BlockState>,
    pub hit_blocks: HashSet<BlockPos>,
    pub entities: HashSet<TargetEntity>,
    pub barrages: HashSet<BarrageId>,
}

impl BarrageHitResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter-result handed to a sibling: it only sees the barrage that struck it.
    pub fn struck_by(barrage: BarrageId) -> Self {
        Self {
            barrages: HashSet::from([barrage]),
            ..Self::default()
        }
    }

    pub fn record_block(&mut self, pos: BlockPos, state: BlockState) {
        self.hit_block_state = Some(state);
        self.hit_blocks.insert(pos);
    }

    pub fn record_entity(&mut self, entity: TargetEntity) {
        self.entities.insert(entity);
    }

    pub fn record_barrage(&mut self, barrage: BarrageId) {
        self.barrages.insert(barrage);
    }

    pub fn hit_terrain(&self) -> bool {
        !self.hit_blocks.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.hit_block_state.is_none()
            && self.hit_blocks.is_empty()
            && self.entities.is_empty()
            && self.barrages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityId;
    use crate::domain::geometry::Aabb;
    use glam::DVec3;

    fn target(id: u64) -> TargetEntity {
        TargetEntity {
            id: EntityId(id),
            bounds: Aabb::from_center(DVec3::ZERO, DVec3::splat(0.5)),
            alive: true,
        }
    }

    #[test]
    fn when_nothing_recorded_then_result_is_empty() {
        assert!(BarrageHitResult::new().is_empty());
    }

    #[test]
    fn when_same_entity_is_recorded_twice_then_it_is_kept_once() {
        let mut result = BarrageHitResult::new();
        result.record_entity(target(7));
        let mut moved = target(7);
        moved.bounds = moved.bounds.translate(DVec3::X);
        result.record_entity(moved);

        assert_eq!(result.entities.len(), 1);
        assert!(!result.is_empty());
    }

    #[test]
    fn when_blocks_are_recorded_then_latest_state_wins() {
        let mut result = BarrageHitResult::new();
        result.record_block(BlockPos::new(0, 0, 0), BlockState::liquid(8));
        result.record_block(BlockPos::new(0, 0, 1), BlockState::solid(1));

        assert!(result.hit_terrain());
        assert_eq!(result.hit_blocks.len(), 2);
        assert_eq!(result.hit_block_state, Some(BlockState::solid(1)));
    }

    #[test]
    fn when_built_for_sibling_then_only_striker_is_present() {
        let striker = BarrageId::new();
        let result = BarrageHitResult::struck_by(striker);

        assert_eq!(result.barrages, HashSet::from([striker]));
        assert!(result.entities.is_empty());
        assert!(!result.hit_terrain());
    }
}
