//! Per-tick movement and off-screen culling

use super::state::{Asteroid, GameState, Playfield, Token};
use crate::tuning::Tuning;
use crate::wrap_degrees;

/// Advance asteroids by their own speed and spin them, then drop any that
/// reached `height + asteroid_cull_margin`
pub fn advance_asteroids(asteroids: &mut Vec<Asteroid>, playfield: Playfield, tuning: &Tuning) {
    let limit = playfield.height + tuning.asteroid_cull_margin;
    for asteroid in asteroids.iter_mut() {
        asteroid.pos.y += asteroid.speed;
        asteroid.rotation = wrap_degrees(asteroid.rotation + tuning.asteroid_spin);
    }
    asteroids.retain(|a| a.pos.y < limit);
}

/// Advance tokens at the fixed fall speed, then drop any that are off-screen
/// or were collected on an earlier tick
pub fn advance_tokens(tokens: &mut Vec<Token>, playfield: Playfield, tuning: &Tuning) {
    let limit = playfield.height + tuning.token_cull_margin;
    tokens.retain(|t| !t.collected);
    for token in tokens.iter_mut() {
        token.pos.y += tuning.token_fall_speed;
    }
    tokens.retain(|t| t.pos.y < limit);
}

/// Move every live entity one tick
pub fn advance(state: &mut GameState) {
    advance_asteroids(&mut state.asteroids, state.playfield, &state.tuning);
    advance_tokens(&mut state.tokens, state.playfield, &state.tuning);
}
