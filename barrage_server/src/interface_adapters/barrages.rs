// Concrete barrage kinds the host can spawn from a scenario.

use std::f64::consts::TAU;

use glam::DVec3;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{
    Barrage, BarrageBehavior, BarrageHitResult, BarrageOption, BarrageState, HitCommands,
    HitEvent, TargetEntity,
};
use crate::interface_adapters::puppet::TracingPuppet;

pub const BOLT_KIND: &str = "bolt";
pub const SPLITTER_KIND: &str = "splitter";

fn publish(events: &broadcast::Sender<HitEvent>, event: HitEvent) {
    // No subscribers is fine; events are advisory.
    let _ = events.send(event);
}

fn hostile_target(barrage: &BarrageState, entity: &TargetEntity) -> bool {
    entity.alive && Some(entity.id) != barrage.shooter()
}

/// Plain projectile: strikes any living entity except its shooter and reports every hit.
#[derive(Debug, Clone)]
pub struct Bolt {
    events: broadcast::Sender<HitEvent>,
}

impl Bolt {
    pub fn new(events: broadcast::Sender<HitEvent>) -> Self {
        Self { events }
    }
}

impl BarrageBehavior for Bolt {
    fn kind(&self) -> &'static str {
        BOLT_KIND
    }

    fn filter_hit_entity(&self, barrage: &BarrageState, entity: &TargetEntity) -> bool {
        hostile_target(barrage, entity)
    }

    fn on_hit(
        &mut self,
        barrage: &BarrageState,
        result: &BarrageHitResult,
        _commands: &mut dyn HitCommands,
    ) {
        let event = HitEvent::from_hit(BOLT_KIND, barrage, result);
        debug!(
            barrage_id = %event.barrage_id,
            entities = event.entities.len(),
            blocks = event.blocks_hit,
            barrages = event.barrages.len(),
            expired = event.expired,
            "bolt hit"
        );
        publish(&self.events, event);
    }
}

/// Shell that bursts into a ring of bolts when it is finally resolved.
///
/// Fragments inherit the shooter, so they never strike each other or the shell's owner. A shell
/// that simply runs out of lifetime bursts too.
#[derive(Debug, Clone)]
pub struct Splitter {
    events: broadcast::Sender<HitEvent>,
    fragments: u32,
    fragment_option: BarrageOption,
    burst: bool,
}

impl Splitter {
    pub fn new(
        events: broadcast::Sender<HitEvent>,
        fragments: u32,
        fragment_option: BarrageOption,
    ) -> Self {
        Self {
            events,
            fragments,
            fragment_option,
            burst: false,
        }
    }

    /// Unit directions evenly spread on the horizontal plane, starting at +X.
    pub fn fragment_directions(count: u32) -> Vec<DVec3> {
        (0..count)
            .map(|i| {
                let angle = TAU * f64::from(i) / f64::from(count);
                DVec3::new(angle.cos(), 0.0, angle.sin())
            })
            .collect()
    }

    fn spawn_fragments(&self, barrage: &BarrageState, commands: &mut dyn HitCommands) {
        for direction in Self::fragment_directions(self.fragments) {
            let mut fragment = Barrage::new(
                barrage.world(),
                barrage.loc(),
                direction,
                self.fragment_option.clone(),
                Box::new(Bolt::new(self.events.clone())),
                Box::new(TracingPuppet::new(BOLT_KIND)),
            );
            if let Some(shooter) = barrage.shooter() {
                fragment = fragment.with_shooter(shooter);
            }
            let id = commands.spawn(fragment);
            debug!(parent = %barrage.id(), fragment = %id, "splitter fragment queued");
        }
    }
}

impl BarrageBehavior for Splitter {
    fn kind(&self) -> &'static str {
        SPLITTER_KIND
    }

    fn filter_hit_entity(&self, barrage: &BarrageState, entity: &TargetEntity) -> bool {
        hostile_target(barrage, entity)
    }

    fn on_hit(
        &mut self,
        barrage: &BarrageState,
        result: &BarrageHitResult,
        commands: &mut dyn HitCommands,
    ) {
        publish(
            &self.events,
            HitEvent::from_hit(SPLITTER_KIND, barrage, result),
        );

        if self.burst || !barrage.resolves_on_hit() {
            return;
        }
        self.burst = true;
        self.spawn_fragments(barrage, commands);
    }
}
