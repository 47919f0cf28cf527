//! Per-frame simulation tick
//!
//! One call advances an active session by exactly one frame, in fixed order:
//! steer ship, spawn, move, resolve contacts, count the frame.

use super::collision;
use super::difficulty::difficulty_for_score;
use super::input::{InputTracker, Steer};
use super::kinematics;
use super::spawn;
use super::state::{GamePhase, GameState};

/// Apply held keys to the ship: move, clamp, bank
pub fn steer_ship(state: &mut GameState, input: &InputTracker) {
    let tuning = &state.tuning;
    let min_x = tuning.ship_margin;
    let max_x = (state.playfield.width - tuning.ship_margin).max(min_x);
    let ship = &mut state.ship;

    match input.steer() {
        Steer::Left => {
            ship.pos.x = (ship.pos.x - tuning.ship_speed).max(min_x);
            ship.rotation = -tuning.ship_bank_degrees;
        }
        Steer::Right => {
            ship.pos.x = (ship.pos.x + tuning.ship_speed).min(max_x);
            ship.rotation = tuning.ship_bank_degrees;
        }
        Steer::None => ship.rotation = 0.0,
    }
}

/// Advance the session by one frame. Idle and terminal sessions are not touched.
pub fn tick(state: &mut GameState, input: &InputTracker) {
    if state.phase != GamePhase::Active {
        return;
    }

    steer_ship(state, input);
    spawn::spawn(state);
    kinematics::advance(state);

    if collision::resolve(state) {
        // Session over; nothing else moves or counts this frame
        return;
    }

    let difficulty = difficulty_for_score(state.score, &state.tuning);
    state.difficulty = state.difficulty.max(difficulty);

    state.frame += 1;

    debug_assert!(state.is_id_ordered());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::autopilot::choose_steer;
    use crate::sim::input::Key;
    use crate::sim::state::{Asteroid, AsteroidKind, GameEvent, Playfield, Token};
    use glam::Vec2;
    use proptest::prelude::*;

    fn active_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Playfield::new(800.0, 600.0));
        state.phase = GamePhase::Active;
        state
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut state = GameState::new(5, Playfield::new(800.0, 600.0));
        let mut input = InputTracker::new();
        input.press(Key::Left);
        for _ in 0..100 {
            tick(&mut state, &input);
        }
        assert_eq!(state.frame, 0);
        assert_eq!(state.ship.pos.x, 400.0);
        assert!(state.asteroids.is_empty() && state.tokens.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_ship_moves_and_banks() {
        let mut state = active_state(5);
        let mut input = InputTracker::new();

        input.press(Key::Right);
        steer_ship(&mut state, &input);
        assert_eq!(state.ship.pos.x, 406.0);
        assert_eq!(state.ship.rotation, 15.0);

        input.release(&Key::Right);
        input.press(Key::Left);
        steer_ship(&mut state, &input);
        steer_ship(&mut state, &input);
        assert_eq!(state.ship.pos.x, 394.0);
        assert_eq!(state.ship.rotation, -15.0);

        input.clear();
        steer_ship(&mut state, &input);
        assert_eq!(state.ship.rotation, 0.0);
        assert_eq!(state.ship.pos.x, 394.0);
    }

    #[test]
    fn test_ship_clamped_to_margins() {
        let mut state = active_state(5);
        let mut input = InputTracker::new();
        input.press(Key::Left);
        for _ in 0..200 {
            steer_ship(&mut state, &input);
        }
        assert_eq!(state.ship.pos.x, 20.0);

        input.clear();
        input.press(Key::Right);
        for _ in 0..200 {
            steer_ship(&mut state, &input);
        }
        assert_eq!(state.ship.pos.x, 780.0);
    }

    #[test]
    fn test_token_pickup_through_tick() {
        let mut state = active_state(5);
        let input = InputTracker::new();
        // Placed one fall step above the ship so it lands dead center
        let pos = state.ship.pos - Vec2::new(0.0, state.tuning.token_fall_speed);
        let id = state.next_entity_id();
        state.tokens.push(Token::new(id, pos, 1));

        tick(&mut state, &input);

        assert_eq!(state.score, 10);
        let token = state.tokens.iter().find(|t| t.id == id).unwrap();
        assert!(token.collected);
        assert_eq!(state.phase, GamePhase::Active);

        // Dropped on the following tick, never credited again
        tick(&mut state, &input);
        assert!(state.tokens.iter().all(|t| t.id != id));
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_collision_stops_the_frame() {
        let mut state = active_state(5);
        let input = InputTracker::new();
        let ship = state.ship.pos;
        let id = state.next_entity_id();
        state.asteroids.push(Asteroid::new(id, AsteroidKind::Large, ship, 1.0));

        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Terminal);
        assert_eq!(state.frame, 0);

        let snapshot = (state.asteroids[0].pos, state.score);
        tick(&mut state, &input);
        assert_eq!((state.asteroids[0].pos, state.score), snapshot);
    }

    #[test]
    fn test_difficulty_follows_score() {
        let mut state = active_state(5);
        let input = InputTracker::new();
        state.score = 240;
        let pos = state.ship.pos - Vec2::new(0.0, state.tuning.token_fall_speed);
        let id = state.next_entity_id();
        state.tokens.push(Token::new(id, pos, 1));

        tick(&mut state, &input);
        assert_eq!(state.score, 250);
        assert_eq!(state.difficulty, 1.5);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut a = active_state(99999);
        let mut b = active_state(99999);
        let mut input = InputTracker::new();

        for i in 0..600 {
            if i % 90 == 0 {
                input.clear();
                input.press(if i % 180 == 0 { Key::Left } else { Key::Right });
            }
            tick(&mut a, &input);
            tick(&mut b, &input);
        }

        assert_eq!(a.frame, b.frame);
        assert_eq!(a.score, b.score);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.asteroids.len(), b.asteroids.len());
        assert_eq!(a.ship.pos, b.ship.pos);
    }

    /// Steering from a proptest step: 0 left, 1 right, 2 coast, 3 autopilot
    fn apply_step(state: &GameState, input: &mut InputTracker, step: u8) {
        input.clear();
        let steer = match step {
            0 => Steer::Left,
            1 => Steer::Right,
            2 => Steer::None,
            _ => choose_steer(state),
        };
        match steer {
            Steer::Left => input.press(Key::Left),
            Steer::Right => input.press(Key::Right),
            Steer::None => {}
        }
    }

    #[test]
    fn test_entities_stay_in_id_order() {
        let mut state = active_state(31);
        let input = InputTracker::new();
        for _ in 0..2000 {
            tick(&mut state, &input);
            assert!(state.is_id_ordered());
            if state.phase == GamePhase::Terminal {
                break;
            }
        }
    }

    proptest! {
        #[test]
        fn score_rises_only_by_collected_points(
            seed in any::<u64>(),
            steering in proptest::collection::vec(0u8..4, 1..800),
        ) {
            let mut state = active_state(seed);
            let mut input = InputTracker::new();

            for step in steering {
                apply_step(&state, &mut input, step);
                let before = state.score;
                tick(&mut state, &input);

                let points: u64 = state
                    .drain_events()
                    .iter()
                    .filter_map(|e| match e {
                        GameEvent::TokenCollected { points, .. } => Some(*points),
                        _ => None,
                    })
                    .sum();
                prop_assert_eq!(state.score - before, points);
            }
        }

        #[test]
        fn token_collected_at_most_once(
            seed in any::<u64>(),
            steering in proptest::collection::vec(0u8..4, 1..800),
        ) {
            let mut state = active_state(seed);
            let mut input = InputTracker::new();
            let mut collected = std::collections::HashSet::new();

            for step in steering {
                apply_step(&state, &mut input, step);
                tick(&mut state, &input);
                for event in state.drain_events() {
                    if let GameEvent::TokenCollected { id, .. } = event {
                        prop_assert!(collected.insert(id), "token {} collected twice", id);
                    }
                }
            }
        }

        #[test]
        fn score_and_difficulty_never_decrease(
            seed in any::<u64>(),
            steering in proptest::collection::vec(0u8..3, 1..400),
        ) {
            let mut state = active_state(seed);
            let mut input = InputTracker::new();
            let mut last_score = 0;
            let mut last_difficulty = 1.0;
            let mut game_overs = 0;

            for step in steering {
                input.clear();
                match step {
                    0 => input.press(Key::Left),
                    1 => input.press(Key::Right),
                    _ => {}
                }
                tick(&mut state, &input);

                game_overs += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                    .count();
                prop_assert!(state.score >= last_score);
                prop_assert!(state.difficulty >= last_difficulty);
                last_score = state.score;
                last_difficulty = state.difficulty;
            }
            prop_assert!(game_overs <= 1);
            prop_assert_eq!(game_overs == 1, state.phase == GamePhase::Terminal);
        }
    }
}
