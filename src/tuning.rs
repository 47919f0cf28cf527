//! Data-driven game balance
//!
//! Every number the simulation uses lives here. `Tuning::default()` is the
//! reference balance; JSON overrides may set any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("cannot read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning field `{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("tuning field `{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("tuning field `{field}` must be within [0, 1], got {value}")]
    NotProbability { field: &'static str, value: f32 },
    #[error("asteroid type thresholds for band {band} must satisfy 0 <= large <= medium <= 1")]
    BadThresholds { band: usize },
    #[error("kind_band_edges must be ascending, got [{low}, {high}]")]
    BadBandEdges { low: f32, high: f32 },
}

/// Cumulative type probabilities for one difficulty band.
///
/// A roll below `large` picks large, below `medium` picks medium, otherwise small.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindThresholds {
    pub large: f32,
    pub medium: f32,
}

/// Spawn interval curve: `max(base - difficulty * step, floor)` frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalCurve {
    pub base: f32,
    pub step: f32,
    pub floor: f32,
}

impl IntervalCurve {
    pub fn at(&self, difficulty: f32) -> f32 {
        (self.base - difficulty * self.step).max(self.floor)
    }
}

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Ship ===
    pub ship_speed: f32,
    pub ship_margin: f32,
    pub ship_bottom_offset: f32,
    pub ship_bank_degrees: f32,
    pub ship_radius: f32,

    // === Tokens ===
    pub token_pickup_radius: f32,
    pub token_size: f32,
    pub token_fall_speed: f32,
    pub token_spawn_y: f32,
    pub token_cull_margin: f32,
    pub points_per_token_value: u64,
    pub special_token_chance: f32,
    pub special_token_value: u32,
    pub token_interval: IntervalCurve,

    // === Asteroids ===
    pub asteroid_spawn_y: f32,
    pub asteroid_cull_margin: f32,
    pub asteroid_spin: f32,
    pub collision_forgiveness: f32,
    pub asteroid_speed_min: f32,
    pub asteroid_speed_spread: f32,
    pub asteroid_interval: IntervalCurve,
    /// Difficulty above which band 1 / band 2 thresholds apply
    pub kind_band_edges: [f32; 2],
    /// Type thresholds for low, mid and high difficulty
    pub kind_thresholds: [KindThresholds; 3],

    // === Difficulty ===
    pub difficulty_score_step: u64,
    pub difficulty_increment: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ship_speed: SHIP_SPEED,
            ship_margin: SHIP_MARGIN,
            ship_bottom_offset: SHIP_BOTTOM_OFFSET,
            ship_bank_degrees: SHIP_BANK_DEGREES,
            ship_radius: SHIP_RADIUS,

            token_pickup_radius: TOKEN_PICKUP_RADIUS,
            token_size: TOKEN_SIZE,
            token_fall_speed: TOKEN_FALL_SPEED,
            token_spawn_y: TOKEN_SPAWN_Y,
            token_cull_margin: TOKEN_CULL_MARGIN,
            points_per_token_value: POINTS_PER_TOKEN_VALUE,
            special_token_chance: SPECIAL_TOKEN_CHANCE,
            special_token_value: SPECIAL_TOKEN_VALUE,
            token_interval: IntervalCurve {
                base: TOKEN_INTERVAL_BASE,
                step: TOKEN_INTERVAL_STEP,
                floor: TOKEN_INTERVAL_FLOOR,
            },

            asteroid_spawn_y: ASTEROID_SPAWN_Y,
            asteroid_cull_margin: ASTEROID_CULL_MARGIN,
            asteroid_spin: ASTEROID_SPIN,
            collision_forgiveness: COLLISION_FORGIVENESS,
            asteroid_speed_min: ASTEROID_SPEED_MIN,
            asteroid_speed_spread: ASTEROID_SPEED_SPREAD,
            asteroid_interval: IntervalCurve {
                base: ASTEROID_INTERVAL_BASE,
                step: ASTEROID_INTERVAL_STEP,
                floor: ASTEROID_INTERVAL_FLOOR,
            },
            kind_band_edges: [1.5, 2.5],
            kind_thresholds: [
                // Mostly small rocks early on
                KindThresholds { large: 0.2, medium: 0.5 },
                KindThresholds { large: 0.3, medium: 0.7 },
                // Large rocks dominate at high difficulty
                KindThresholds { large: 0.5, medium: 0.8 },
            ],

            difficulty_score_step: DIFFICULTY_SCORE_STEP,
            difficulty_increment: DIFFICULTY_INCREMENT,
        }
    }
}

impl Tuning {
    /// Parse a JSON override (missing fields keep their defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and validate a JSON override file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("ship_speed", self.ship_speed),
            ("ship_radius", self.ship_radius),
            ("token_pickup_radius", self.token_pickup_radius),
            ("token_fall_speed", self.token_fall_speed),
            ("asteroid_speed_min", self.asteroid_speed_min),
            ("token_interval.floor", self.token_interval.floor),
            ("asteroid_interval.floor", self.asteroid_interval.floor),
            ("difficulty_increment", self.difficulty_increment),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        // Slowest possible asteroid must still fall, or it is never culled
        let slowest = self.asteroid_speed_min + self.asteroid_speed_spread.min(0.0);
        if !(slowest > 0.0) {
            return Err(TuningError::NotPositive {
                field: "asteroid_speed_min + asteroid_speed_spread",
                value: slowest,
            });
        }
        let non_negative = [
            ("asteroid_speed_spread", self.asteroid_speed_spread),
            ("token_size", self.token_size),
            ("ship_margin", self.ship_margin),
            ("token_cull_margin", self.token_cull_margin),
            ("asteroid_cull_margin", self.asteroid_cull_margin),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::Negative { field, value });
            }
        }
        if self.special_token_value == 0 {
            return Err(TuningError::NotPositive {
                field: "special_token_value",
                value: 0.0,
            });
        }
        let [low, high] = self.kind_band_edges;
        if !(low <= high) {
            return Err(TuningError::BadBandEdges { low, high });
        }
        if self.difficulty_score_step == 0 {
            return Err(TuningError::NotPositive {
                field: "difficulty_score_step",
                value: 0.0,
            });
        }
        if !(0.0..=1.0).contains(&self.special_token_chance) {
            return Err(TuningError::NotProbability {
                field: "special_token_chance",
                value: self.special_token_chance,
            });
        }
        for (band, t) in self.kind_thresholds.iter().enumerate() {
            if !(0.0 <= t.large && t.large <= t.medium && t.medium <= 1.0) {
                return Err(TuningError::BadThresholds { band });
            }
        }
        Ok(())
    }

    /// Type thresholds for the difficulty band `difficulty` falls in
    pub fn thresholds_for(&self, difficulty: f32) -> KindThresholds {
        let [low_edge, high_edge] = self.kind_band_edges;
        if difficulty > high_edge {
            self.kind_thresholds[2]
        } else if difficulty > low_edge {
            self.kind_thresholds[1]
        } else {
            self.kind_thresholds[0]
        }
    }
}
