pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::scenario::{ConfigError, ScenarioConfig};
pub use frameworks::server::{HostSettings, RunSummary, run, run_with_config};
pub use use_cases::{BarrageManager, SimulationSettings, TickReport, simulation_task};
