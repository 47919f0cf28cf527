//! Demo-mode pilot: dodge incoming rocks, otherwise chase tokens

use super::collision::hit_threshold;
use super::input::Steer;
use super::state::GameState;

/// How far above the ship a rock counts as incoming
const LOOKAHEAD: f32 = 220.0;
/// Extra sideways clearance on top of the hitbox
const CLEARANCE: f32 = 24.0;

/// Pick a steering direction for the next tick
pub fn choose_steer(state: &GameState) -> Steer {
    let ship = state.ship.pos;
    let tuning = &state.tuning;

    let threat = state
        .asteroids
        .iter()
        .filter(|a| {
            let dy = ship.y - a.pos.y;
            let reach = hit_threshold(a.size(), tuning) + CLEARANCE;
            (-reach..LOOKAHEAD).contains(&dy) && (a.pos.x - ship.x).abs() < reach
        })
        .min_by(|a, b| {
            let da = ship.y - a.pos.y;
            let db = ship.y - b.pos.y;
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(rock) = threat {
        let near_left = ship.x - tuning.ship_margin < tuning.ship_speed * 4.0;
        let near_right = state.playfield.width - tuning.ship_margin - ship.x < tuning.ship_speed * 4.0;
        return if near_left {
            Steer::Right
        } else if near_right || rock.pos.x >= ship.x {
            Steer::Left
        } else {
            Steer::Right
        };
    }

    let target = state
        .tokens
        .iter()
        .filter(|t| !t.collected && t.pos.y < ship.y)
        .min_by(|a, b| {
            let da = a.pos.distance_squared(ship);
            let db = b.pos.distance_squared(ship);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    match target {
        Some(token) if token.pos.x < ship.x - tuning.ship_speed => Steer::Left,
        Some(token) if token.pos.x > ship.x + tuning.ship_speed => Steer::Right,
        _ => Steer::None,
    }
}
