//! Frame-throttled spawning of asteroids and tokens
//!
//! Intervals are counted in simulated frames, never wall-clock time, so a
//! seeded session spawns the same entities at the same frames every run.

use glam::Vec2;
use rand::Rng;

use super::state::{Asteroid, AsteroidKind, GameEvent, GameState, Token};
use crate::tuning::Tuning;

/// True once more than `interval` frames have passed since `last`
#[inline]
pub fn spawn_due(frame: u64, last: u64, interval: f32) -> bool {
    frame.saturating_sub(last) as f32 > interval
}

/// Frames between asteroid spawns at this difficulty
pub fn asteroid_interval(difficulty: f32, tuning: &Tuning) -> f32 {
    tuning.asteroid_interval.at(difficulty)
}

/// Frames between token spawns at this difficulty
pub fn token_interval(difficulty: f32, tuning: &Tuning) -> f32 {
    tuning.token_interval.at(difficulty)
}

/// Map a uniform roll in [0, 1) to a size class for the current difficulty band
pub fn pick_kind(roll: f32, difficulty: f32, tuning: &Tuning) -> AsteroidKind {
    let t = tuning.thresholds_for(difficulty);
    if roll < t.large {
        AsteroidKind::Large
    } else if roll < t.medium {
        AsteroidKind::Medium
    } else {
        AsteroidKind::Small
    }
}

/// Horizontal spawn range `[0, width - size)`, or None when layout leaves no room
fn spawn_span(width: f32, size: f32) -> Option<f32> {
    let span = width - size;
    (span.is_finite() && span > 0.0).then_some(span)
}

/// Emit at most one asteroid this frame. Returns the new asteroid's ID.
pub fn spawn_asteroid(state: &mut GameState) -> Option<u32> {
    let interval = asteroid_interval(state.difficulty, &state.tuning);
    if !spawn_due(state.frame, state.last_asteroid_frame, interval) {
        return None;
    }

    let difficulty = state.difficulty;
    let roll: f32 = state.rng.random();
    let kind = pick_kind(roll, difficulty, &state.tuning);

    // Skipped spawns keep the old marker so the next frame retries
    let Some(span) = spawn_span(state.playfield.width, kind.size()) else {
        log::debug!(
            "Asteroid spawn skipped: playfield width {} too small",
            state.playfield.width
        );
        return None;
    };
    state.last_asteroid_frame = state.frame;

    let tuning = &state.tuning;
    let speed = (state.rng.random::<f32>() * tuning.asteroid_speed_spread
        + tuning.asteroid_speed_min)
        * difficulty;
    let x = state.rng.random::<f32>() * span;
    let rotation = state.rng.random::<f32>() * 360.0;
    let spawn_y = tuning.asteroid_spawn_y;

    let id = state.next_entity_id();
    let mut asteroid = Asteroid::new(id, kind, Vec2::new(x, spawn_y), speed);
    asteroid.rotation = rotation;
    state.asteroids.push(asteroid);
    state.events.push(GameEvent::AsteroidSpawned { id, kind });
    Some(id)
}

/// Emit at most one token this frame. Returns the new token's ID.
pub fn spawn_token(state: &mut GameState) -> Option<u32> {
    let interval = token_interval(state.difficulty, &state.tuning);
    if !spawn_due(state.frame, state.last_token_frame, interval) {
        return None;
    }

    let Some(span) = spawn_span(state.playfield.width, state.tuning.token_size) else {
        log::debug!(
            "Token spawn skipped: playfield width {} too small",
            state.playfield.width
        );
        return None;
    };
    state.last_token_frame = state.frame;

    let special = state.rng.random::<f32>() < state.tuning.special_token_chance;
    let value = if special {
        state.tuning.special_token_value
    } else {
        1
    };
    let x = state.rng.random::<f32>() * span;
    let spawn_y = state.tuning.token_spawn_y;

    let id = state.next_entity_id();
    state.tokens.push(Token::new(id, Vec2::new(x, spawn_y), value));
    state.events.push(GameEvent::TokenSpawned { id, value });
    Some(id)
}

/// Run both spawners for the current frame
pub fn spawn(state: &mut GameState) {
    spawn_asteroid(state);
    spawn_token(state);
}
