// Framework bootstrap for the headless barrage simulation host.

use crate::domain::{HitEvent, WorldQuery};
use crate::frameworks::config;
use crate::frameworks::scenario::ScenarioConfig;
use crate::use_cases::{BarrageManager, SimulationSettings, simulation_task};

use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    // `try_init` so a second host in the same process (tests) keeps the first subscriber.
    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Everything the host needs besides the scenario itself.
#[derive(Debug, Clone, Copy)]
pub struct HostSettings {
    pub simulation: SimulationSettings,
    pub hit_event_capacity: usize,
}

impl HostSettings {
    pub fn from_env() -> Self {
        Self {
            simulation: SimulationSettings {
                tick_interval: config::tick_interval(),
                max_ticks: config::max_ticks(),
            },
            hit_event_capacity: config::hit_event_capacity(),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub hit_events: u64,
    // Barrages still live at shutdown, resolved by the final clear.
    pub leftover: usize,
}

/// Runs `scenario` until the tick limit, `ctrl_c` or a `shutdown` notification.
pub async fn run(
    scenario: ScenarioConfig,
    settings: HostSettings,
    shutdown: Arc<Notify>,
) -> Result<RunSummary> {
    let (events_tx, events_rx) = broadcast::channel::<HitEvent>(settings.hit_event_capacity);

    let world: Arc<dyn WorldQuery> = Arc::new(scenario.build_world());
    let manager = Arc::new(BarrageManager::new());
    let barrages = scenario.build_barrages(&events_tx).map_err(|e| {
        tracing::error!(error = %e, "failed to build scenario barrages");
        std::io::Error::other(e)
    })?;
    for barrage in barrages {
        manager.spawn(barrage);
    }
    tracing::info!(barrages = manager.len(), "scenario loaded");

    let logger = tokio::spawn(hit_event_logger(events_rx));

    // ctrl_c only signals; the loop itself owns the exit path.
    let ctrl_c_shutdown = shutdown.clone();
    let ctrl_c = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl_c received");
                ctrl_c_shutdown.notify_one();
            }
            Err(e) => tracing::warn!(error = %e, "ctrl_c handler unavailable"),
        }
    });

    let ticks = simulation_task(manager.clone(), world, settings.simulation, shutdown).await;
    ctrl_c.abort();

    let leftover = manager.clear();
    // Dropping every sender ends the logger once it drains the channel.
    drop(manager);
    drop(events_tx);
    let hit_events = logger.await.map_err(|e| {
        tracing::error!(error = %e, "hit event logger failed");
        std::io::Error::other(e)
    })?;

    tracing::info!(ticks, hit_events, leftover, "simulation finished");
    Ok(RunSummary {
        ticks,
        hit_events,
        leftover,
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let scenario = match config::scenario_path() {
        Some(path) => ScenarioConfig::load(&path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to load scenario");
            std::io::Error::other(e)
        })?,
        None => {
            tracing::warn!("SIM_SCENARIO_PATH not set, running an empty scenario");
            ScenarioConfig::default()
        }
    };

    run(scenario, HostSettings::from_env(), Arc::new(Notify::new()))
        .await
        .map(|_| ())
}

async fn hit_event_logger(mut events: broadcast::Receiver<HitEvent>) -> u64 {
    let mut seen = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                seen += 1;
                tracing::info!(
                    barrage_id = %event.barrage_id,
                    kind = event.kind,
                    shooter = ?event.shooter,
                    location = ?event.location,
                    entities = ?event.entities,
                    blocks = event.blocks_hit,
                    barrages = event.barrages.len(),
                    expired = event.expired,
                    "hit"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "hit event logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    seen
}
