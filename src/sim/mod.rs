//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-counted timing only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod input;
pub mod kinematics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::choose_steer;
pub use collision::{find_hit, hit_threshold, pickup_threshold};
pub use difficulty::difficulty_for_score;
pub use input::{InputTracker, Key, Steer};
pub use spawn::{asteroid_interval, pick_kind, token_interval};
pub use state::{
    Asteroid, AsteroidKind, GameEvent, GamePhase, GameState, Playfield, Ship, Token,
};
pub use tick::tick;
