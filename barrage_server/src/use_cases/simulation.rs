use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info};

use crate::domain::WorldQuery;
use crate::use_cases::manager::BarrageManager;

/// Settings for the fixed-step simulation loop.
#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    /// Time between two passes.
    pub tick_interval: Duration,
    /// Stop after this many passes (`None` runs until shutdown).
    pub max_ticks: Option<u64>,
}

/// Drives `do_tick` at a fixed rate until shutdown or the tick limit. Returns the number of
/// passes run.
pub async fn simulation_task(
    manager: Arc<BarrageManager>,
    world: Arc<dyn WorldQuery>,
    settings: SimulationSettings,
    shutdown: Arc<Notify>,
) -> u64 {
    let mut tick: u64 = 0;
    let mut interval = tokio::time::interval(settings.tick_interval);
    // A stalled pass should not be followed by a burst of catch-up passes.
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        tick_interval_ms = settings.tick_interval.as_millis(),
        max_ticks = ?settings.max_ticks,
        "simulation started"
    );

    loop {
        if settings.max_ticks.is_some_and(|max| tick >= max) {
            info!(tick, "tick limit reached");
            break;
        }

        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick, "simulation shutdown requested");
                break;
            }
            _ = interval.tick() => {}
        }

        tick += 1;
        let report = manager.do_tick(world.as_ref());
        if report.admitted > 0 || report.resolved > 0 {
            debug!(
                tick,
                admitted = report.admitted,
                resolved = report.resolved,
                live = manager.len(),
                "tick"
            );
        }
    }

    tick
}
