use glam::DVec3;

use crate::domain::barrage::{Barrage, BarrageState};
use crate::domain::entities::{BarrageId, BlockState, TargetEntity, WorldId};
use crate::domain::errors::PuppetError;
use crate::domain::geometry::{Aabb, BlockPos};
use crate::domain::hit_result::BarrageHitResult;

// Port for terrain and entity lookups. Read-only from the engine's side.
pub trait WorldQuery: Send + Sync {
    fn is_chunk_loaded(&self, world: WorldId, pos: BlockPos) -> bool;
    fn block_state_at(&self, world: WorldId, pos: BlockPos) -> BlockState;
    fn entities_overlapping(
        &self,
        world: WorldId,
        area: &Aabb,
        filter: &dyn Fn(&TargetEntity) -> bool,
    ) -> Vec<TargetEntity>;
}

// Port for the external representation that mirrors a barrage (visual proxy, network ghost).
pub trait Puppet: Send {
    fn spawn_in_world(&mut self, world: WorldId, pos: DVec3) -> Result<(), PuppetError>;
    fn teleport_to(&mut self, pos: DVec3) -> Result<(), PuppetError>;
    fn cancel(&mut self) -> Result<(), PuppetError>;

    fn tick(&mut self) -> Result<(), PuppetError> {
        Ok(())
    }
}

/// Engine operations available to `on_hit`.
pub trait HitCommands {
    /// Launches a new barrage; it joins the simulation on the next pass.
    fn spawn(&mut self, barrage: Barrage) -> BarrageId;
    /// Routes a hit to a registered barrage. Re-entrant hits are dropped.
    fn hit(&mut self, id: BarrageId, result: &BarrageHitResult);
    fn barrage(&self, id: BarrageId) -> Option<&BarrageState>;
}

/// Per-kind policy and effects plugged into the engine.
pub trait BarrageBehavior: Send {
    /// Label used in logs and hit events.
    fn kind(&self) -> &'static str {
        "barrage"
    }

    /// Whether `entity` can be struck. Kinds usually exclude the shooter and dead targets.
    fn filter_hit_entity(&self, barrage: &BarrageState, entity: &TargetEntity) -> bool;

    /// Whether `other` can be struck. Defaults to any other barrage from a different shooter.
    fn filter_hit_barrage(&self, barrage: &BarrageState, other: &BarrageState) -> bool {
        default_filter_hit_barrage(barrage, other)
    }

    /// Effects of a hit. Called on every resolution attempt, absorbed hits included.
    fn on_hit(
        &mut self,
        barrage: &BarrageState,
        result: &BarrageHitResult,
        commands: &mut dyn HitCommands,
    );

    /// Position mirrored to the puppet.
    fn controller_location(&self, barrage: &BarrageState) -> DVec3 {
        barrage.loc()
    }
}

pub fn default_filter_hit_barrage(barrage: &BarrageState, other: &BarrageState) -> bool {
    other.shooter() != barrage.shooter() && other.id() != barrage.id()
}
