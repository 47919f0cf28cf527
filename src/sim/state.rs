//! Game state and core simulation types
//!
//! Everything a session needs to replay deterministically lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the activation key
    #[default]
    Idle,
    /// Ticking
    Active,
    /// Ship destroyed, waiting for an explicit reset
    Terminal,
}

/// Measured playfield extent, in the same units as entity positions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False until layout has produced a positive, finite extent
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidKind {
    Small,
    Medium,
    Large,
}

impl AsteroidKind {
    /// Visual diameter for this class
    pub const fn size(self) -> f32 {
        match self {
            AsteroidKind::Small => 25.0,
            AsteroidKind::Medium => 40.0,
            AsteroidKind::Large => 60.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AsteroidKind::Small => "small",
            AsteroidKind::Medium => "medium",
            AsteroidKind::Large => "large",
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Bank angle in degrees: negative left, positive right, derived from input each tick
    pub rotation: f32,
}

impl Ship {
    /// Ship centered horizontally, `bottom_offset` above the bottom edge
    pub fn centered(playfield: Playfield, bottom_offset: f32) -> Self {
        Self {
            pos: Vec2::new(playfield.width / 2.0, playfield.height - bottom_offset),
            rotation: 0.0,
        }
    }
}

/// A falling hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    /// Visual spin in degrees
    pub rotation: f32,
    pub kind: AsteroidKind,
    /// Downward speed (units per tick)
    pub speed: f32,
}

impl Asteroid {
    pub fn new(id: u32, kind: AsteroidKind, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            pos,
            rotation: 0.0,
            kind,
            speed,
        }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.kind.size()
    }
}

/// A falling collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: u32,
    pub pos: Vec2,
    /// Latched on pickup, never reverts
    pub collected: bool,
    /// Reward multiplier (1 normally, higher for special tokens)
    pub value: u32,
}

impl Token {
    pub fn new(id: u32, pos: Vec2, value: u32) -> Self {
        Self {
            id,
            pos,
            collected: false,
            value,
        }
    }

    pub fn is_special(&self) -> bool {
        self.value > 1
    }
}

/// Things that happened during a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    AsteroidSpawned { id: u32, kind: AsteroidKind },
    TokenSpawned { id: u32, value: u32 },
    TokenCollected { id: u32, value: u32, points: u64 },
    /// Ship touched an asteroid (drives the collision flash)
    ShipHit { asteroid_id: u32 },
    GameOver { final_score: u64 },
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn randomness, seeded from `seed`
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub playfield: Playfield,
    pub phase: GamePhase,
    /// Cumulative score, never decreases
    pub score: u64,
    /// Derived from score, never decreases
    pub difficulty: f32,
    /// Sum of collected token values this run
    pub tokens_collected: u32,
    /// Simulated frames since activation
    pub frame: u64,
    pub last_asteroid_frame: u64,
    pub last_token_frame: u64,
    pub ship: Ship,
    /// Live asteroids (sorted by id)
    pub asteroids: Vec<Asteroid>,
    /// Live tokens (sorted by id)
    pub tokens: Vec<Token>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new idle session with the default balance
    pub fn new(seed: u64, playfield: Playfield) -> Self {
        Self::with_tuning(seed, playfield, Tuning::default())
    }

    pub fn with_tuning(seed: u64, playfield: Playfield, tuning: Tuning) -> Self {
        let ship = Ship::centered(playfield, tuning.ship_bottom_offset);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            playfield,
            phase: GamePhase::Idle,
            score: 0,
            difficulty: 1.0,
            tokens_collected: 0,
            frame: 0,
            last_asteroid_frame: 0,
            last_token_frame: 0,
            ship,
            asteroids: Vec::new(),
            tokens: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reinitialize every session field at once, keeping seed stream and tuning.
    ///
    /// The RNG is not reseeded so consecutive runs differ.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Idle;
        self.score = 0;
        self.difficulty = 1.0;
        self.tokens_collected = 0;
        self.frame = 0;
        self.last_asteroid_frame = 0;
        self.last_token_frame = 0;
        self.ship = Ship::centered(self.playfield, self.tuning.ship_bottom_offset);
        self.asteroids.clear();
        self.tokens.clear();
        self.events.clear();
    }

    /// Apply a new playfield measurement.
    ///
    /// An idle ship is re-centered; a running ship is only re-clamped.
    pub fn set_playfield(&mut self, playfield: Playfield) {
        self.playfield = playfield;
        match self.phase {
            GamePhase::Idle => {
                self.ship = Ship::centered(playfield, self.tuning.ship_bottom_offset);
            }
            _ => {
                let max_x = (playfield.width - self.tuning.ship_margin).max(self.tuning.ship_margin);
                self.ship.pos.x = self.ship.pos.x.clamp(self.tuning.ship_margin, max_x);
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == GamePhase::Terminal
    }

    /// HUD level (whole part of difficulty)
    pub fn level(&self) -> u32 {
        self.difficulty.floor() as u32
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Entities are stored in spawn (ID) order. Ids only grow and removal
    /// uses `retain`, so this holds without sorting.
    pub fn is_id_ordered(&self) -> bool {
        self.asteroids.windows(2).all(|w| w[0].id < w[1].id)
            && self.tokens.windows(2).all(|w| w[0].id < w[1].id)
    }
}
