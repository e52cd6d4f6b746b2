use std::{env, path::PathBuf, time::Duration};

// Runtime/host settings (not barrage tuning; that lives in scenario presets).

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
pub const DEFAULT_HIT_EVENT_CAPACITY: usize = 256;

pub fn tick_interval() -> Duration {
    let millis = env::var("SIM_TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(DEFAULT_TICK_INTERVAL_MS);
    Duration::from_millis(millis)
}

// Unset or unparsable runs until shutdown.
pub fn max_ticks() -> Option<u64> {
    env::var("SIM_MAX_TICKS")
        .ok()
        .and_then(|value| value.parse().ok())
}

pub fn scenario_path() -> Option<PathBuf> {
    env::var_os("SIM_SCENARIO_PATH")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

pub fn hit_event_capacity() -> usize {
    env::var("SIM_HIT_EVENT_CAPACITY")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|capacity| *capacity > 0)
        .unwrap_or(DEFAULT_HIT_EVENT_CAPACITY)
}
