// Barrage record: simulated state plus the pluggable behavior and puppet it drives.

use glam::DVec3;

use crate::domain::entities::{BarrageId, EntityId, WorldId};
use crate::domain::geometry::{Aabb, HitBox};
use crate::domain::option::BarrageOption;
use crate::domain::ports::{BarrageBehavior, Puppet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrageLifecycle {
    Unlaunched,
    Active,
    Resolved,
}

/// Simulated state of one barrage.
///
/// `valid` only ever goes from true to false. Mutation is reserved to the engine; hooks
/// receive read-only snapshots.
#[derive(Debug, Clone)]
pub struct BarrageState {
    pub(crate) id: BarrageId,
    pub(crate) world: WorldId,
    pub(crate) loc: DVec3,
    pub(crate) hit_box: HitBox,
    pub(crate) shooter: Option<EntityId>,
    pub(crate) direction: DVec3,
    pub(crate) option: BarrageOption,

    pub(crate) launched: bool,
    pub(crate) valid: bool,
    // Counts toward `max_living_tick`.
    pub(crate) current_tick: u32,
    // Counts toward `none_hit_box_tick`, then stops.
    pub(crate) spawn_tick: u32,
    pub(crate) current_across_count: u32,
    pub(crate) is_being_hit: bool,
}

impl BarrageState {
    pub fn id(&self) -> BarrageId {
        self.id
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn loc(&self) -> DVec3 {
        self.loc
    }

    pub fn hit_box(&self) -> &HitBox {
        &self.hit_box
    }

    /// Hit-box placed at the current location.
    pub fn bounding_box(&self) -> Aabb {
        self.hit_box.at(self.loc)
    }

    pub fn shooter(&self) -> Option<EntityId> {
        self.shooter
    }

    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    pub fn option(&self) -> &BarrageOption {
        &self.option
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn current_tick(&self) -> u32 {
        self.current_tick
    }

    pub fn spawn_tick(&self) -> u32 {
        self.spawn_tick
    }

    pub fn current_across_count(&self) -> u32 {
        self.current_across_count
    }

    pub fn is_being_hit(&self) -> bool {
        self.is_being_hit
    }

    /// Still inside the grace window, so invisible to other barrages' scans.
    pub fn is_no_clip(&self) -> bool {
        self.spawn_tick < self.option.none_hit_box_tick
    }

    /// Registered, launched and not yet resolved.
    pub fn is_resolvable(&self) -> bool {
        self.launched && self.valid
    }

    pub fn lifecycle(&self) -> BarrageLifecycle {
        if !self.valid {
            BarrageLifecycle::Resolved
        } else if self.launched {
            BarrageLifecycle::Active
        } else {
            BarrageLifecycle::Unlaunched
        }
    }

    /// Whether a hit delivered now ends the barrage instead of being absorbed.
    pub fn resolves_on_hit(&self) -> bool {
        if !self.option.acrossable || self.is_expired() {
            return true;
        }
        self.option
            .max_across_count
            .is_some_and(|max| self.current_across_count >= max)
    }

    /// Lifetime used up: `current_tick` reached a bounded `max_living_tick`.
    pub fn is_expired(&self) -> bool {
        self.option
            .max_living_tick
            .is_some_and(|max| max <= self.current_tick)
    }
}

pub struct Barrage {
    pub(crate) state: BarrageState,
    // Detached while `on_hit` runs so the hook can call back into the registry.
    pub(crate) behavior: Option<Box<dyn BarrageBehavior>>,
    pub(crate) puppet: Box<dyn Puppet>,
    pub(crate) kind: &'static str,
}

impl Barrage {
    pub fn new(
        world: WorldId,
        loc: DVec3,
        direction: DVec3,
        option: BarrageOption,
        behavior: Box<dyn BarrageBehavior>,
        puppet: Box<dyn Puppet>,
    ) -> Self {
        let kind = behavior.kind();
        Self {
            state: BarrageState {
                id: BarrageId::new(),
                world,
                loc,
                hit_box: HitBox::default(),
                shooter: None,
                direction,
                option,
                launched: false,
                valid: true,
                current_tick: 0,
                spawn_tick: 0,
                current_across_count: 0,
                is_being_hit: false,
            },
            behavior: Some(behavior),
            puppet,
            kind,
        }
    }

    pub fn with_shooter(mut self, shooter: EntityId) -> Self {
        self.state.shooter = Some(shooter);
        self
    }

    pub fn with_hit_box(mut self, hit_box: HitBox) -> Self {
        self.state.hit_box = hit_box;
        self
    }

    pub fn id(&self) -> BarrageId {
        self.state.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn state(&self) -> &BarrageState {
        &self.state
    }
}

impl std::fmt::Debug for Barrage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Barrage")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
