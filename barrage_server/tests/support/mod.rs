// Shared doubles and builders for the barrage integration tests.
#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use barrage_server::BarrageManager;
use barrage_server::domain::{
    Aabb, Barrage, BarrageBehavior, BarrageHitResult, BarrageId, BarrageOption, BarrageState,
    EntityId, HitCommands, HitEvent, Puppet, PuppetError, TargetEntity, WorldId,
};
use barrage_server::interface_adapters::Bolt;
use glam::DVec3;
use tokio::sync::broadcast;

pub const WORLD: WorldId = WorldId(0);

// Counts cancels and remembers where it was last placed.
#[derive(Clone, Default)]
pub struct CountingPuppet {
    cancels: Arc<AtomicUsize>,
    position: Arc<Mutex<Option<DVec3>>>,
}

impl CountingPuppet {
    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn position(&self) -> Option<DVec3> {
        *self.position.lock().expect("puppet mutex poisoned")
    }
}

impl Puppet for CountingPuppet {
    fn spawn_in_world(&mut self, _world: WorldId, pos: DVec3) -> Result<(), PuppetError> {
        *self.position.lock().expect("puppet mutex poisoned") = Some(pos);
        Ok(())
    }

    fn teleport_to(&mut self, pos: DVec3) -> Result<(), PuppetError> {
        *self.position.lock().expect("puppet mutex poisoned") = Some(pos);
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), PuppetError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// Strikes anything alive and immediately hits itself again from inside the hook.
#[derive(Clone, Default)]
pub struct Echo {
    calls: Arc<AtomicUsize>,
}

impl Echo {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BarrageBehavior for Echo {
    fn kind(&self) -> &'static str {
        "echo"
    }

    fn filter_hit_entity(&self, _barrage: &BarrageState, entity: &TargetEntity) -> bool {
        entity.alive
    }

    fn on_hit(
        &mut self,
        barrage: &BarrageState,
        result: &BarrageHitResult,
        commands: &mut dyn HitCommands,
    ) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        commands.hit(barrage.id(), result);
    }
}

pub fn events() -> (broadcast::Sender<HitEvent>, broadcast::Receiver<HitEvent>) {
    broadcast::channel(64)
}

pub fn target(id: u64, center: DVec3) -> TargetEntity {
    TargetEntity {
        id: EntityId(id),
        bounds: Aabb::from_center(center, DVec3::splat(0.5)),
        alive: true,
    }
}

pub fn option(max_living_tick: Option<u32>) -> BarrageOption {
    BarrageOption {
        max_living_tick,
        ..BarrageOption::default()
    }
}

// Spawns a bolt and hands back its puppet for inspection.
pub fn launch_bolt(
    manager: &BarrageManager,
    events: &broadcast::Sender<HitEvent>,
    loc: DVec3,
    direction: DVec3,
    option: BarrageOption,
    shooter: Option<u64>,
) -> (BarrageId, CountingPuppet) {
    let puppet = CountingPuppet::default();
    let mut barrage = Barrage::new(
        WORLD,
        loc,
        direction,
        option,
        Box::new(Bolt::new(events.clone())),
        Box::new(puppet.clone()),
    );
    if let Some(shooter) = shooter {
        barrage = barrage.with_shooter(EntityId(shooter));
    }
    (manager.spawn(barrage), puppet)
}

pub fn drain(rx: &mut broadcast::Receiver<HitEvent>) -> Vec<HitEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}
