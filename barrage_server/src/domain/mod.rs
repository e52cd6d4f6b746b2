// Domain layer: barrage state, collision records and the ports the engine talks through.

pub mod barrage;
pub mod entities;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod hit_result;
pub mod option;
pub mod ports;

pub use barrage::{Barrage, BarrageLifecycle, BarrageState};
pub use entities::{BarrageId, BlockKind, BlockState, EntityId, TargetEntity, WorldId};
pub use errors::PuppetError;
pub use events::HitEvent;
pub use geometry::{Aabb, BlockPos, ChunkPos, HitBox};
pub use hit_result::BarrageHitResult;
pub use option::BarrageOption;
pub use ports::{BarrageBehavior, HitCommands, Puppet, WorldQuery, default_filter_hit_barrage};
