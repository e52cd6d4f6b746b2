// Registry of live barrages and the per-tick driver.

use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::DVec3;
use tracing::{debug, trace};

use crate::domain::{
    Aabb, Barrage, BarrageHitResult, BarrageId, BarrageOption, BarrageState, WorldId, WorldQuery,
};
use crate::use_cases::engine;
use crate::use_cases::registry::{Registry, SpawnQueue};

/// Counters for one `do_tick` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Barrages spawned since the previous pass that joined this one.
    pub admitted: usize,
    /// Barrages ticked (including ones that skipped on an unloaded chunk).
    pub ticked: usize,
    /// Barrages pruned after resolving.
    pub resolved: usize,
}

/// Thread-safe owner of every live barrage.
///
/// `spawn` never waits on a running pass: launches go to a pending queue that the next
/// `do_tick` admits. Hooks running inside a pass must go through their `HitCommands` rather
/// than calling back into the manager.
#[derive(Default)]
pub struct BarrageManager {
    /// Barrages taking part in passes.
    registry: Mutex<Registry>,
    /// Barrages launched since the last pass.
    spawns: SpawnQueue,
}

impl BarrageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Performs the one-time world spawn and registers the barrage.
    pub fn spawn(&self, barrage: Barrage) -> BarrageId {
        self.spawns.launch(barrage)
    }

    /// Runs one simulation step over every registered barrage.
    pub fn do_tick(&self, world: &dyn WorldQuery) -> TickReport {
        let mut registry = self.registry();

        let admitted = self.spawns.drain();
        let mut report = TickReport {
            admitted: admitted.len(),
            ..TickReport::default()
        };
        for barrage in admitted {
            registry.insert(barrage);
        }

        // Iterate a snapshot; spawns during the pass wait in the queue for the next one.
        for id in registry.ids() {
            engine::tick_barrage(&mut registry, &self.spawns, world, id);
            report.ticked += 1;
        }

        report.resolved = registry.prune();
        trace!(
            admitted = report.admitted,
            ticked = report.ticked,
            resolved = report.resolved,
            live = registry.len(),
            "barrage pass complete"
        );
        report
    }

    /// Live barrages in `world` clipped by `area`, excluding those still in their grace window.
    pub fn collect_clip_barrages(&self, world: WorldId, area: &Aabb) -> Vec<BarrageId> {
        self.registry().collect_clip_barrages(world, area)
    }

    /// Routes an external hit to a registered barrage.
    pub fn hit(&self, id: BarrageId, result: &BarrageHitResult) {
        let mut registry = self.registry();
        engine::hit(&mut registry, &self.spawns, id, result);
    }

    /// Registered plus pending barrages.
    pub fn len(&self) -> usize {
        self.registry().len() + self.spawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: BarrageId) -> bool {
        self.registry().contains(id) || self.spawns.contains(id)
    }

    pub fn snapshot(&self, id: BarrageId) -> Option<BarrageState> {
        let registered = self.registry().get(id).map(|b| b.state().clone());
        registered.or_else(|| self.spawns.snapshot(id))
    }

    /// States of every registered barrage, in registration order.
    pub fn snapshots(&self) -> Vec<BarrageState> {
        self.registry().states().cloned().collect()
    }

    /// Runtime tuning of a barrage's options. Returns false if the id is unknown.
    pub fn update_option(&self, id: BarrageId, f: impl FnOnce(&mut BarrageOption)) -> bool {
        self.with_barrage_mut(id, |b| f(&mut b.state.option))
            .is_some()
    }

    pub fn set_direction(&self, id: BarrageId, direction: DVec3) -> bool {
        self.with_barrage_mut(id, |b| b.state.direction = direction)
            .is_some()
    }

    /// Moves a barrage outside of normal integration, mirroring the puppet.
    pub fn teleport(&self, id: BarrageId, pos: DVec3) -> bool {
        self.with_barrage_mut(id, |b| engine::teleport(b, pos))
            .is_some()
    }

    /// Resolves and drops every barrage, registered or pending.
    pub fn clear(&self) -> usize {
        let mut registry = self.registry();
        for barrage in self.spawns.drain() {
            registry.insert(barrage);
        }
        for barrage in registry.iter_mut() {
            engine::remove(barrage);
        }
        let removed = registry.prune();
        debug!(removed, "barrages cleared");
        removed
    }

    fn with_barrage_mut<R>(&self, id: BarrageId, f: impl FnOnce(&mut Barrage) -> R) -> Option<R> {
        let mut registry = self.registry();
        match registry.get_mut(id) {
            Some(barrage) => Some(f(barrage)),
            None => self.spawns.with_barrage_mut(id, f),
        }
    }

    // A hook that panicked mid-pass leaves the data consistent enough to keep simulating.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
