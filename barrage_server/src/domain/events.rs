use glam::DVec3;

use crate::domain::barrage::BarrageState;
use crate::domain::entities::{BarrageId, EntityId};
use crate::domain::hit_result::BarrageHitResult;

/// Published by concrete barrage kinds when they strike something.
///
/// Damage, knockback and visual bursts subscribe to these; the engine itself never acts on them.
#[derive(Debug, Clone, PartialEq)]
pub struct HitEvent {
    pub barrage_id: BarrageId,
    pub kind: &'static str,
    pub shooter: Option<EntityId>,
    pub location: DVec3,
    pub entities: Vec<EntityId>,
    pub blocks_hit: usize,
    pub barrages: Vec<BarrageId>,
    // Resolution forced by lifetime rather than by a collision.
    pub expired: bool,
}

impl HitEvent {
    pub fn from_hit(kind: &'static str, barrage: &BarrageState, result: &BarrageHitResult) -> Self {
        let mut entities: Vec<EntityId> = result.entities.iter().map(|e| e.id).collect();
        entities.sort_unstable();
        let mut barrages: Vec<BarrageId> = result.barrages.iter().copied().collect();
        barrages.sort_unstable();

        Self {
            barrage_id: barrage.id(),
            kind,
            shooter: barrage.shooter(),
            location: barrage.loc(),
            entities,
            blocks_hit: result.hit_blocks.len(),
            barrages,
            expired: result.is_empty() && barrage.is_expired(),
        }
    }
}
