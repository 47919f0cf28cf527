//! Ship proximity checks: token pickups and asteroid hits
//!
//! Checks are discrete. An asteroid fast enough to jump clean over the ship
//! between two ticks is not detected.

use glam::Vec2;

use super::state::{Asteroid, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Center distance below which the ship picks up a token
#[inline]
pub fn pickup_threshold(tuning: &Tuning) -> f32 {
    tuning.ship_radius + tuning.token_pickup_radius
}

/// Center distance below which an asteroid of `size` destroys the ship.
///
/// Smaller than the visual overlap by `collision_forgiveness`.
#[inline]
pub fn hit_threshold(size: f32, tuning: &Tuning) -> f32 {
    tuning.ship_radius + size / 2.0 - tuning.collision_forgiveness
}

#[inline]
fn within(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance(b) < threshold
}

/// Latch every uncollected token in reach and credit it.
///
/// Returns the points awarded this call.
pub fn collect_tokens(state: &mut GameState) -> u64 {
    let threshold = pickup_threshold(&state.tuning);
    let ship = state.ship.pos;
    let per_value = state.tuning.points_per_token_value;

    let mut points = 0;
    for token in state.tokens.iter_mut() {
        if token.collected || !within(ship, token.pos, threshold) {
            continue;
        }
        token.collected = true;
        let awarded = token.value as u64 * per_value;
        points += awarded;
        state.tokens_collected += token.value;
        state.events.push(GameEvent::TokenCollected {
            id: token.id,
            value: token.value,
            points: awarded,
        });
    }
    state.score += points;
    points
}

/// First asteroid (by ID order) overlapping the ship, if any
pub fn find_hit(ship: Vec2, asteroids: &[Asteroid], tuning: &Tuning) -> Option<u32> {
    asteroids
        .iter()
        .find(|a| within(ship, a.pos, hit_threshold(a.size(), tuning)))
        .map(|a| a.id)
}

/// Resolve pickups, then hazards. Returns true if this call ended the session.
///
/// A session that is already terminal is left untouched.
pub fn resolve(state: &mut GameState) -> bool {
    if state.phase == GamePhase::Terminal {
        return false;
    }

    collect_tokens(state);

    let Some(asteroid_id) = find_hit(state.ship.pos, &state.asteroids, &state.tuning) else {
        return false;
    };

    state.phase = GamePhase::Terminal;
    state.events.push(GameEvent::ShipHit { asteroid_id });
    state.events.push(GameEvent::GameOver {
        final_score: state.score,
    });
    true
}
