use serde::{Deserialize, Deserializer};

/// Motion and collision policy for a single barrage.
///
/// Fixed when the barrage is spawned; the manager exposes it for runtime tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarrageOption {
    /// Ticks before forced expiry (`None` never expires).
    #[serde(deserialize_with = "unbounded_sentinel")]
    pub max_living_tick: Option<u32>,
    /// Ticks after spawn during which entities and other barrages are not scanned.
    pub none_hit_box_tick: u32,

    /// Solid terrain is traversed instead of stopping the barrage.
    pub across_block: bool,
    /// Liquid terrain is traversed instead of stopping the barrage.
    pub across_liquid: bool,

    /// The barrage survives hits instead of resolving on the first one.
    pub acrossable: bool,
    /// Hits absorbed before the barrage resolves (`None` absorbs every hit).
    #[serde(deserialize_with = "unbounded_sentinel")]
    pub max_across_count: Option<u32>,

    /// Barrages resolving against this one do not notify it back.
    pub barrage_ignored: bool,

    // Kinematics.
    pub enable_speed: bool,
    pub speed: f64,
    pub acceleration: f64,
    pub acceleration_max_speed_enabled: bool,
    // Applied as a lower bound on speed, see `integrate_speed`.
    pub acceleration_max_speed: f64,
}

impl Default for BarrageOption {
    fn default() -> Self {
        Self {
            max_living_tick: Some(200),
            none_hit_box_tick: 0,
            across_block: false,
            across_liquid: true,
            acrossable: false,
            max_across_count: None,
            barrage_ignored: false,
            enable_speed: false,
            speed: 0.0,
            acceleration: 0.0,
            acceleration_max_speed_enabled: false,
            acceleration_max_speed: 0.0,
        }
    }
}

impl BarrageOption {
    /// Advances `speed` by one tick of acceleration.
    ///
    /// With `acceleration_max_speed_enabled` the result is clamped from below:
    /// `speed = max(acceleration_max_speed, speed)`. Decelerating barrages therefore stop
    /// slowing at `acceleration_max_speed`, while accelerating ones are never capped.
    // TODO: confirm with content authors whether a true ceiling was intended before changing it.
    pub fn integrate_speed(&mut self) {
        self.speed += self.acceleration;
        if self.acceleration_max_speed_enabled {
            self.speed = self.speed.max(self.acceleration_max_speed);
        }
    }

    pub fn is_unbounded_lifetime(&self) -> bool {
        self.max_living_tick.is_none()
    }
}

// Presets write `-1` for "unbounded" since TOML has no null.
fn unbounded_sentinel<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    match raw {
        -1 => Ok(None),
        n => u32::try_from(n).map(Some).map_err(|_| {
            serde::de::Error::custom(format!("expected -1 or a non-negative tick count, got {n}"))
        }),
    }
}
