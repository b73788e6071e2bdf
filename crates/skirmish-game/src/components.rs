//! Gameplay components: plain data records attached to soldiers.

use std::time::Duration;

/// Hit points of a soldier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthComponent {
    /// Current life, clamped to `[MIN_LIFE, MAX_LIFE]`.
    pub life: i32,
}

impl HealthComponent {
    pub const MAX_LIFE: i32 = 100;
    pub const MIN_LIFE: i32 = 0;
}

impl Default for HealthComponent {
    fn default() -> Self {
        Self {
            life: Self::MAX_LIFE,
        }
    }
}

/// A regenerating damage absorber. Inert until activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldComponent {
    /// Whether the shield currently absorbs damage and regenerates.
    pub activated: bool,
    /// Current power, clamped to `[MIN_POWER, MAX_POWER]`.
    pub power: i32,
    /// Power gained per regeneration pulse.
    pub regeneration: i32,
    /// Quiet time after the last hit before regeneration resumes.
    pub regeneration_delay: Duration,
    /// Interval between regeneration pulses.
    pub regeneration_frequency: Duration,
    /// Time since the last pulse, clamped at `regeneration_frequency`.
    pub last_regeneration: Duration,
}

impl ShieldComponent {
    pub const MAX_POWER: i32 = 150;
    pub const MIN_POWER: i32 = 0;
    pub const DEFAULT_REGENERATION: i32 = 10;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(8000);
    pub const DEFAULT_FREQUENCY: Duration = Duration::from_millis(4000);
}

impl Default for ShieldComponent {
    fn default() -> Self {
        Self {
            activated: false,
            power: Self::MAX_POWER,
            regeneration: Self::DEFAULT_REGENERATION,
            regeneration_delay: Self::DEFAULT_DELAY,
            regeneration_frequency: Self::DEFAULT_FREQUENCY,
            last_regeneration: Duration::ZERO,
        }
    }
}

/// Periodic random damage while attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoisonComponent {
    /// Inclusive lower bound of a poison tick's damage.
    pub min_damage: i32,
    /// Exclusive upper bound of a poison tick's damage.
    pub max_damage: i32,
    /// Interval between poison ticks.
    pub frequency: Duration,
    /// Time since the last tick, clamped at `frequency`.
    pub last_damage: Duration,
}

impl PoisonComponent {
    pub const DEFAULT_MIN_DAMAGE: i32 = 1;
    pub const DEFAULT_MAX_DAMAGE: i32 = 10;
    pub const DEFAULT_FREQUENCY: Duration = Duration::from_millis(4000);
}

impl Default for PoisonComponent {
    fn default() -> Self {
        Self {
            min_damage: Self::DEFAULT_MIN_DAMAGE,
            max_damage: Self::DEFAULT_MAX_DAMAGE,
            frequency: Self::DEFAULT_FREQUENCY,
            last_damage: Duration::ZERO,
        }
    }
}
