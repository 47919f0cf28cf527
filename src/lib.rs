//! Stellar Arena - dodge asteroids, collect tokens
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, scoring)
//! - `driver`: Session state machine and frame scheduling
//! - `platform`: Frame scheduler and playfield adapters
//! - `tuning`: Data-driven game balance
//! - `highscores` / `stats`: Leaderboard and per-player progress

pub mod driver;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use driver::{GameLoop, GameObserver, RunSummary, TerminalHook};
pub use highscores::HighScores;
pub use settings::Settings;
pub use stats::{Achievement, PlayerStats, RunRecords};
pub use tuning::Tuning;

/// Game configuration constants (reference balance, see `Tuning` for overrides)
pub mod consts {
    /// Ship horizontal speed (units per tick)
    pub const SHIP_SPEED: f32 = 6.0;
    /// Ship x is clamped to [margin, width - margin]
    pub const SHIP_MARGIN: f32 = 20.0;
    /// Ship spawns this far above the bottom edge
    pub const SHIP_BOTTOM_OFFSET: f32 = 100.0;
    /// Bank angle while moving (degrees)
    pub const SHIP_BANK_DEGREES: f32 = 15.0;
    /// Ship hitbox radius, slightly smaller than the sprite
    pub const SHIP_RADIUS: f32 = 18.0;

    /// Token pickup radius (added to ship radius)
    pub const TOKEN_PICKUP_RADIUS: f32 = 15.0;
    /// Visual token size, used to keep spawns inside the playfield
    pub const TOKEN_SIZE: f32 = 30.0;
    /// Token fall speed (units per tick, not difficulty-scaled)
    pub const TOKEN_FALL_SPEED: f32 = 1.5;
    pub const TOKEN_SPAWN_Y: f32 = -30.0;
    pub const TOKEN_CULL_MARGIN: f32 = 30.0;
    /// Points awarded per unit of token value
    pub const POINTS_PER_TOKEN_VALUE: u64 = 10;
    pub const SPECIAL_TOKEN_CHANCE: f32 = 0.1;
    pub const SPECIAL_TOKEN_VALUE: u32 = 3;

    pub const ASTEROID_SPAWN_Y: f32 = -50.0;
    pub const ASTEROID_CULL_MARGIN: f32 = 50.0;
    /// Spin per tick (degrees)
    pub const ASTEROID_SPIN: f32 = 0.5;
    /// Shrinks the asteroid hitbox relative to its visual size
    pub const COLLISION_FORGIVENESS: f32 = 12.0;
    /// Base speed is uniform in [min, min + spread), then scaled by difficulty
    pub const ASTEROID_SPEED_MIN: f32 = 1.0;
    pub const ASTEROID_SPEED_SPREAD: f32 = 1.5;

    /// Spawn interval = max(base - difficulty * step, floor), in frames
    pub const ASTEROID_INTERVAL_BASE: f32 = 60.0;
    pub const ASTEROID_INTERVAL_STEP: f32 = 10.0;
    pub const ASTEROID_INTERVAL_FLOOR: f32 = 20.0;
    pub const TOKEN_INTERVAL_BASE: f32 = 120.0;
    pub const TOKEN_INTERVAL_STEP: f32 = 5.0;
    pub const TOKEN_INTERVAL_FLOOR: f32 = 80.0;

    /// Difficulty = 1 + floor(score / DIFFICULTY_SCORE_STEP) * DIFFICULTY_INCREMENT
    pub const DIFFICULTY_SCORE_STEP: u64 = 100;
    pub const DIFFICULTY_INCREMENT: f32 = 0.25;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}
