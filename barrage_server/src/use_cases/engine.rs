//! Per-barrage tick and hit resolution.
//!
//! A tick runs in a fixed order: move, mirror to the puppet, lifetime check, terrain scan,
//! grace window, entity scan, sibling scan, then resolution if anything was struck. Movement
//! and scanning always finish before any resolution they trigger.
//!
//! Barrages reach each other only through ids in the [`Registry`]; a hit on a sibling is a
//! nested call that completes before the outer `hit` returns.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use glam::DVec3;
use tracing::{debug, info, trace, warn};

use crate::domain::{
    Aabb, Barrage, BarrageHitResult, BarrageId, BarrageState, BlockPos, HitCommands, PuppetError,
    TargetEntity, WorldQuery, default_filter_hit_barrage,
};
use crate::use_cases::registry::{Registry, SpawnQueue};

/// Advances one barrage by a single tick.
pub(crate) fn tick_barrage(
    registry: &mut Registry,
    spawns: &SpawnQueue,
    world: &dyn WorldQuery,
    id: BarrageId,
) {
    let Some(barrage) = registry.get_mut(id) else {
        return;
    };
    if !barrage.state.is_resolvable() {
        return;
    }

    let anchor = BlockPos::containing(barrage.state.loc);
    if !world.is_chunk_loaded(barrage.state.world, anchor) {
        trace!(barrage_id = %id, ?anchor, "chunk not loaded, tick deferred");
        return;
    }

    move_barrage(barrage);

    // Lifetime.
    barrage.state.current_tick = barrage.state.current_tick.saturating_add(1);
    if barrage.state.is_expired() {
        debug!(
            barrage_id = %id,
            current_tick = barrage.state.current_tick,
            "lifetime exhausted"
        );
        hit(registry, spawns, id, &BarrageHitResult::new());
        return;
    }

    let mut result = BarrageHitResult::new();
    check_block_collision(&barrage.state, world, &mut result);

    if barrage.state.is_no_clip() {
        barrage.state.spawn_tick += 1;
        if result.hit_terrain() {
            hit(registry, spawns, id, &result);
        }
        return;
    }

    check_entity_collision(barrage, world, &mut result);
    let area = barrage.state.bounding_box();
    check_barrage_collision(registry, id, &area, &mut result);

    if !result.is_empty() {
        trace!(
            barrage_id = %id,
            blocks = result.hit_blocks.len(),
            entities = result.entities.len(),
            barrages = result.barrages.len(),
            "collision recorded"
        );
        hit(registry, spawns, id, &result);
    }
}

/// Resolves a hit on `id`.
///
/// Hits arriving while the barrage is already resolving are dropped, not queued.
pub(crate) fn hit(
    registry: &mut Registry,
    spawns: &SpawnQueue,
    id: BarrageId,
    result: &BarrageHitResult,
) {
    let Some(barrage) = registry.get_mut(id) else {
        return;
    };
    if barrage.state.is_being_hit {
        trace!(barrage_id = %id, "re-entrant hit dropped");
        return;
    }

    barrage.state.is_being_hit = true;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        resolve_hit(registry, spawns, id, result);
    }));
    // Released on every exit path, unwinding included.
    if let Some(barrage) = registry.get_mut(id) {
        barrage.state.is_being_hit = false;
    }
    if let Err(payload) = outcome {
        panic::resume_unwind(payload);
    }
}

fn resolve_hit(
    registry: &mut Registry,
    spawns: &SpawnQueue,
    id: BarrageId,
    result: &BarrageHitResult,
) {
    let Some(barrage) = registry.get_mut(id) else {
        return;
    };
    let snapshot = barrage.state.clone();
    if let Some(mut behavior) = barrage.behavior.take() {
        let mut commands = EngineCommands {
            registry: &mut *registry,
            spawns,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            behavior.on_hit(&snapshot, result, &mut commands);
        }));
        if let Err(payload) = outcome {
            warn!(
                barrage_id = %id,
                kind = behavior.kind(),
                panic = panic_message(payload.as_ref()),
                "on_hit panicked"
            );
        }
        if let Some(barrage) = registry.get_mut(id) {
            barrage.behavior = Some(behavior);
        }
    }

    let Some(barrage) = registry.get_mut(id) else {
        return;
    };
    let state = &mut barrage.state;
    let resolves = state.resolves_on_hit();
    if state.option.acrossable && !state.is_expired() {
        state.current_across_count = state.current_across_count.saturating_add(1);
    }
    if !resolves {
        trace!(
            barrage_id = %id,
            across = state.current_across_count,
            max = ?state.option.max_across_count,
            "hit absorbed"
        );
        return;
    }

    notify_siblings(registry, spawns, id, result);

    if let Some(barrage) = registry.get_mut(id) {
        remove(barrage);
    }
}

// Each struck sibling sees only this barrage as its hit content.
fn notify_siblings(
    registry: &mut Registry,
    spawns: &SpawnQueue,
    id: BarrageId,
    result: &BarrageHitResult,
) {
    if result.barrages.is_empty() {
        return;
    }

    let mut siblings: Vec<BarrageId> = result.barrages.iter().copied().collect();
    siblings.sort_unstable();
    let counter = BarrageHitResult::struck_by(id);
    for sibling in siblings {
        if sibling == id {
            continue;
        }
        let notify = registry
            .get(sibling)
            .is_some_and(|b| !b.state.option.barrage_ignored && b.state.is_resolvable());
        if notify {
            hit(registry, spawns, sibling, &counter);
        }
    }
}

/// Cancels the puppet and invalidates the barrage. Safe to call more than once.
pub(crate) fn remove(barrage: &mut Barrage) {
    if !barrage.state.valid {
        return;
    }
    barrage.state.valid = false;
    let id = barrage.id();
    report_puppet(id, "cancel", barrage.puppet.cancel());

    info!(
        barrage_id = %id,
        kind = barrage.kind(),
        current_tick = barrage.state.current_tick,
        across = barrage.state.current_across_count,
        "barrage resolved"
    );
}

pub(crate) fn controller_location(barrage: &Barrage) -> DVec3 {
    barrage
        .behavior
        .as_deref()
        .map_or(barrage.state.loc, |b| b.controller_location(&barrage.state))
}

/// Moves the barrage to `pos` outside of normal integration and mirrors it.
pub(crate) fn teleport(barrage: &mut Barrage, pos: DVec3) {
    barrage.state.loc = pos;
    let target = controller_location(barrage);
    report_puppet(barrage.id(), "teleport", barrage.puppet.teleport_to(target));
}

fn move_barrage(barrage: &mut Barrage) {
    let state = &mut barrage.state;
    if state.option.enable_speed {
        state.loc += state.direction.normalize_or_zero() * state.option.speed;
        state.option.integrate_speed();
    } else {
        state.loc += state.direction;
    }

    let id = barrage.id();
    let target = controller_location(barrage);
    report_puppet(id, "teleport", barrage.puppet.teleport_to(target));
    report_puppet(id, "tick", barrage.puppet.tick());
}

fn check_block_collision(
    state: &BarrageState,
    world: &dyn WorldQuery,
    result: &mut BarrageHitResult,
) {
    let option = &state.option;
    for pos in state.bounding_box().block_cells() {
        if !world.is_chunk_loaded(state.world, pos) {
            continue;
        }
        let block = world.block_state_at(state.world, pos);
        if block.is_air() {
            continue;
        }
        if block.is_liquid() {
            if !option.across_liquid {
                result.record_block(pos, block);
            }
        } else if block.is_solid() && !option.across_block {
            result.record_block(pos, block);
        }
    }
}

fn check_entity_collision(barrage: &Barrage, world: &dyn WorldQuery, result: &mut BarrageHitResult) {
    let Some(behavior) = barrage.behavior.as_deref() else {
        return;
    };
    let state = &barrage.state;
    let filter = |entity: &TargetEntity| behavior.filter_hit_entity(state, entity);
    for entity in world.entities_overlapping(state.world, &state.bounding_box(), &filter) {
        result.record_entity(entity);
    }
}

fn check_barrage_collision(
    registry: &Registry,
    id: BarrageId,
    area: &Aabb,
    result: &mut BarrageHitResult,
) {
    let Some(this) = registry.get(id) else {
        return;
    };
    for other_id in registry.collect_clip_barrages(this.state.world, area) {
        if other_id == id {
            continue;
        }
        let Some(other) = registry.get(other_id) else {
            continue;
        };
        let accepted = match this.behavior.as_deref() {
            Some(behavior) => behavior.filter_hit_barrage(&this.state, &other.state),
            None => default_filter_hit_barrage(&this.state, &other.state),
        };
        if accepted {
            result.record_barrage(other_id);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn report_puppet(id: BarrageId, op: &'static str, outcome: Result<(), PuppetError>) {
    if let Err(error) = outcome {
        warn!(barrage_id = %id, op, %error, "puppet call failed");
    }
}

/// [`HitCommands`] backed by the live registry during a pass.
pub(crate) struct EngineCommands<'a> {
    pub(crate) registry: &'a mut Registry,
    pub(crate) spawns: &'a SpawnQueue,
}

impl HitCommands for EngineCommands<'_> {
    fn spawn(&mut self, barrage: Barrage) -> BarrageId {
        self.spawns.launch(barrage)
    }

    fn hit(&mut self, id: BarrageId, result: &BarrageHitResult) {
        hit(self.registry, self.spawns, id, result);
    }

    fn barrage(&self, id: BarrageId) -> Option<&BarrageState> {
        self.registry.get(id).map(|b| &b.state)
    }
}
