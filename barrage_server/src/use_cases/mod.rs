// Use cases layer: the barrage engine, its registry and the simulation loop.

pub(crate) mod engine;
pub mod manager;
pub(crate) mod registry;
pub mod simulation;

#[cfg(test)]
pub(crate) mod test_support;

pub use manager::{BarrageManager, TickReport};
pub use simulation::{SimulationSettings, simulation_task};
