// Storage for live barrages, keyed by id with stable insertion order.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::domain::{Aabb, Barrage, BarrageId, BarrageState, WorldId};
use crate::use_cases::engine;

#[derive(Default)]
pub(crate) struct Registry {
    barrages: HashMap<BarrageId, Barrage>,
    order: Vec<BarrageId>,
}

impl Registry {
    pub(crate) fn insert(&mut self, barrage: Barrage) {
        let id = barrage.id();
        if self.barrages.insert(id, barrage).is_none() {
            self.order.push(id);
        }
    }

    pub(crate) fn get(&self, id: BarrageId) -> Option<&Barrage> {
        self.barrages.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: BarrageId) -> Option<&mut Barrage> {
        self.barrages.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: BarrageId) -> bool {
        self.barrages.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Ids in insertion order; a stable snapshot to iterate while the registry mutates.
    pub(crate) fn ids(&self) -> Vec<BarrageId> {
        self.order.clone()
    }

    pub(crate) fn states(&self) -> impl Iterator<Item = &BarrageState> {
        self.order
            .iter()
            .filter_map(|id| self.barrages.get(id))
            .map(|b| &b.state)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Barrage> {
        self.barrages.values_mut()
    }

    /// Drops every resolved barrage. Returns how many were removed.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.barrages.len();
        self.barrages.retain(|_, b| b.state.is_valid());
        let barrages = &self.barrages;
        self.order.retain(|id| barrages.contains_key(id));
        before - self.barrages.len()
    }

    /// Live barrages in `world` that `area` clips: their position is inside it or their hit-box
    /// overlaps it. Barrages still in their grace window are never reported.
    pub(crate) fn collect_clip_barrages(&self, world: WorldId, area: &Aabb) -> Vec<BarrageId> {
        self.states()
            .filter(|state| state.world() == world)
            .filter(|state| state.is_resolvable() && !state.is_no_clip())
            .filter(|state| area.contains_point(state.loc()) || area.intersects(&state.bounding_box()))
            .map(|state| state.id())
            .collect()
    }
}

/// Barrages launched since the last pass, waiting to join the registry.
///
/// Kept apart from the registry so spawning never contends with a running pass.
#[derive(Default)]
pub(crate) struct SpawnQueue {
    pending: Mutex<Vec<Barrage>>,
}

impl SpawnQueue {
    /// Performs the one-time world spawn and queues the barrage.
    pub(crate) fn launch(&self, mut barrage: Barrage) -> BarrageId {
        let id = barrage.id();
        let world = barrage.state.world;
        let pos = engine::controller_location(&barrage);
        if let Err(error) = barrage.puppet.spawn_in_world(world, pos) {
            warn!(barrage_id = %id, %error, "puppet spawn failed");
        }
        barrage.state.launched = true;

        debug!(
            barrage_id = %id,
            kind = barrage.kind(),
            %world,
            shooter = ?barrage.state.shooter,
            "barrage spawned"
        );
        self.lock().push(barrage);
        id
    }

    pub(crate) fn drain(&self) -> Vec<Barrage> {
        std::mem::take(&mut *self.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn contains(&self, id: BarrageId) -> bool {
        self.lock().iter().any(|b| b.id() == id)
    }

    pub(crate) fn with_barrage_mut<R>(
        &self,
        id: BarrageId,
        f: impl FnOnce(&mut Barrage) -> R,
    ) -> Option<R> {
        self.lock().iter_mut().find(|b| b.id() == id).map(f)
    }

    pub(crate) fn snapshot(&self, id: BarrageId) -> Option<BarrageState> {
        self.lock()
            .iter()
            .find(|b| b.id() == id)
            .map(|b| b.state.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Barrage>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
