use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use glam::DVec3;

use crate::domain::{
    Aabb, Barrage, BarrageBehavior, BarrageHitResult, BarrageId, BarrageOption, BarrageState,
    BlockPos, BlockState, ChunkPos, HitCommands, Puppet, PuppetError, TargetEntity, WorldId,
    WorldQuery,
};

const CHUNK_SIZE: i32 = 16;

// Minimal world: everything loaded and empty unless a test says otherwise.
#[derive(Default)]
pub(crate) struct OpenWorld {
    blocks: HashMap<BlockPos, BlockState>,
    unloaded: HashSet<ChunkPos>,
    entities: Vec<TargetEntity>,
}

impl OpenWorld {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_block(&mut self, pos: BlockPos, state: BlockState) {
        self.blocks.insert(pos, state);
    }

    pub(crate) fn unload(&mut self, pos: BlockPos) {
        self.unloaded.insert(pos.chunk(CHUNK_SIZE));
    }

    pub(crate) fn load(&mut self, pos: BlockPos) {
        self.unloaded.remove(&pos.chunk(CHUNK_SIZE));
    }

    pub(crate) fn add_entity(&mut self, entity: TargetEntity) {
        self.entities.push(entity);
    }
}

impl WorldQuery for OpenWorld {
    fn is_chunk_loaded(&self, _world: WorldId, pos: BlockPos) -> bool {
        !self.unloaded.contains(&pos.chunk(CHUNK_SIZE))
    }

    fn block_state_at(&self, _world: WorldId, pos: BlockPos) -> BlockState {
        self.blocks.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn entities_overlapping(
        &self,
        _world: WorldId,
        area: &Aabb,
        filter: &dyn Fn(&TargetEntity) -> bool,
    ) -> Vec<TargetEntity> {
        self.entities
            .iter()
            .filter(|e| area.intersects(&e.bounds) && filter(e))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PuppetCall {
    Spawn(DVec3),
    Teleport(DVec3),
    Tick,
    Cancel,
}

// Records every call; can be told to fail them all.
#[derive(Clone, Default)]
pub(crate) struct RecordingPuppet {
    calls: Arc<Mutex<Vec<PuppetCall>>>,
    failing: bool,
}

impl RecordingPuppet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<PuppetCall> {
        self.calls.lock().expect("puppet mutex poisoned").clone()
    }

    pub(crate) fn last_position(&self) -> Option<DVec3> {
        self.calls().into_iter().rev().find_map(|call| match call {
            PuppetCall::Spawn(pos) | PuppetCall::Teleport(pos) => Some(pos),
            _ => None,
        })
    }

    pub(crate) fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == PuppetCall::Cancel)
            .count()
    }

    fn record(&mut self, call: PuppetCall) -> Result<(), PuppetError> {
        self.calls.lock().expect("puppet mutex poisoned").push(call);
        if self.failing {
            return Err(PuppetError::Backend("scripted failure".to_string()));
        }
        Ok(())
    }
}

impl Puppet for RecordingPuppet {
    fn spawn_in_world(&mut self, _world: WorldId, pos: DVec3) -> Result<(), PuppetError> {
        self.record(PuppetCall::Spawn(pos))
    }

    fn teleport_to(&mut self, pos: DVec3) -> Result<(), PuppetError> {
        self.record(PuppetCall::Teleport(pos))
    }

    fn cancel(&mut self) -> Result<(), PuppetError> {
        self.record(PuppetCall::Cancel)
    }

    fn tick(&mut self) -> Result<(), PuppetError> {
        self.record(PuppetCall::Tick)
    }
}

#[derive(Default)]
struct ProbeLog {
    hits: Vec<BarrageHitResult>,
    spawned: Vec<BarrageId>,
}

// Excludes the shooter and dead targets, records every on_hit call.
#[derive(Clone, Default)]
pub(crate) struct ProbeBehavior {
    log: Arc<Mutex<ProbeLog>>,
    reentrant: bool,
    spawn_on_hit: bool,
}

impl ProbeBehavior {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Calls back into `hit` on itself from inside `on_hit`.
    pub(crate) fn reentrant(mut self) -> Self {
        self.reentrant = true;
        self
    }

    /// Launches a stationary child barrage four blocks above the hit point.
    pub(crate) fn spawning_on_hit(mut self) -> Self {
        self.spawn_on_hit = true;
        self
    }

    pub(crate) fn hits(&self) -> Vec<BarrageHitResult> {
        self.log.lock().expect("probe mutex poisoned").hits.clone()
    }

    pub(crate) fn spawned(&self) -> Vec<BarrageId> {
        self.log.lock().expect("probe mutex poisoned").spawned.clone()
    }
}

impl BarrageBehavior for ProbeBehavior {
    fn kind(&self) -> &'static str {
        "probe"
    }

    fn filter_hit_entity(&self, barrage: &BarrageState, entity: &TargetEntity) -> bool {
        entity.alive && Some(entity.id) != barrage.shooter()
    }

    fn on_hit(
        &mut self,
        barrage: &BarrageState,
        result: &BarrageHitResult,
        commands: &mut dyn HitCommands,
    ) {
        self.log
            .lock()
            .expect("probe mutex poisoned")
            .hits
            .push(result.clone());

        if self.reentrant {
            commands.hit(barrage.id(), result);
        }
        if self.spawn_on_hit {
            let child = Barrage::new(
                barrage.world(),
                barrage.loc() + DVec3::Y * 4.0,
                DVec3::ZERO,
                BarrageOption {
                    max_living_tick: None,
                    ..BarrageOption::default()
                },
                Box::new(ProbeBehavior::new()),
                Box::new(RecordingPuppet::new()),
            );
            let id = commands.spawn(child);
            self.log
                .lock()
                .expect("probe mutex poisoned")
                .spawned
                .push(id);
        }
    }
}

pub(crate) fn probe_barrage(
    loc: DVec3,
    direction: DVec3,
    option: BarrageOption,
    puppet: RecordingPuppet,
) -> (Barrage, ProbeBehavior) {
    let probe = ProbeBehavior::new();
    let barrage = Barrage::new(
        WorldId::default(),
        loc,
        direction,
        option,
        Box::new(probe.clone()),
        Box::new(puppet),
    );
    (barrage, probe)
}
