// Interface adapters: the in-memory world, puppets and the concrete barrage kinds.

pub mod barrages;
pub mod puppet;
pub mod world;

pub use barrages::{BOLT_KIND, Bolt, SPLITTER_KIND, Splitter};
pub use puppet::{NullPuppet, TracingPuppet};
pub use world::{DEFAULT_CHUNK_SIZE, GridWorld};
