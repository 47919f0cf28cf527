//! Per-player progress across runs: totals and score achievements

use serde::{Deserialize, Serialize};

use crate::driver::RunSummary;
use crate::highscores::{HighScores, NameError};

/// Score milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    StellarNovice,
    CosmicExplorer,
}

impl Achievement {
    /// All achievements, easiest first
    pub const ALL: [Achievement; 2] = [Achievement::StellarNovice, Achievement::CosmicExplorer];

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::StellarNovice => "Stellar Novice",
            Achievement::CosmicExplorer => "Cosmic Explorer",
        }
    }

    /// Score a single run must reach
    pub fn required_score(&self) -> u64 {
        match self {
            Achievement::StellarNovice => 100,
            Achievement::CosmicExplorer => 200,
        }
    }
}

/// Aggregate player record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub high_score: u64,
    pub games_played: u32,
    /// Sum of collected token values over all runs
    pub tokens_earned: u64,
    pub unlocked: Vec<Achievement>,
}

impl PlayerStats {
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "stellar_arena_stats";

    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished run in. Returns achievements unlocked by this run.
    pub fn record_run(&mut self, run: &RunSummary) -> Vec<Achievement> {
        self.games_played += 1;
        self.tokens_earned += run.tokens_collected as u64;
        self.high_score = self.high_score.max(run.final_score);

        let fresh: Vec<Achievement> = Achievement::ALL
            .into_iter()
            .filter(|a| run.final_score >= a.required_score() && !self.has(*a))
            .collect();
        for achievement in &fresh {
            log::info!("Achievement \"{}\" unlocked!", achievement.title());
        }
        self.unlocked.extend(fresh.iter().copied());
        fresh
    }

    pub fn has(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    /// Easiest achievement still locked
    pub fn next_goal(&self) -> Option<Achievement> {
        Achievement::ALL.into_iter().find(|a| !self.has(*a))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(stats) = serde_json::from_str(&json) {
                    return stats;
                }
            }
        }
        Self::new()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

/// Stats and leaderboard together, plus a finished run waiting for its name.
///
/// Every finished run counts toward the stats as soon as it ends. A name
/// only decides whether it also lands on the leaderboard.
#[derive(Debug, Default)]
pub struct RunRecords {
    pub stats: PlayerStats,
    pub high_scores: HighScores,
    awaiting_name: Option<RunSummary>,
}

impl RunRecords {
    pub fn new(stats: PlayerStats, high_scores: HighScores) -> Self {
        Self {
            stats,
            high_scores,
            awaiting_name: None,
        }
    }

    /// Fold a finished run into the stats. With `wants_name` the run is held
    /// until `submit_name` or `discard_pending`.
    pub fn finish_run(&mut self, run: &RunSummary, wants_name: bool) -> Vec<Achievement> {
        let fresh = self.stats.record_run(run);
        self.awaiting_name = wants_name.then_some(*run);
        fresh
    }

    pub fn awaiting_name(&self) -> Option<&RunSummary> {
        self.awaiting_name.as_ref()
    }

    /// Put the held run on the leaderboard under `name`.
    ///
    /// A rejected name keeps the run held so the player can retry.
    pub fn submit_name(&mut self, name: &str, timestamp: f64) -> Result<Option<usize>, NameError> {
        let Some(run) = self.awaiting_name else {
            return Ok(None);
        };
        let rank = self
            .high_scores
            .add_run(name, run.final_score, run.tokens_collected, timestamp)?;
        self.awaiting_name = None;
        Ok(rank)
    }

    /// Drop the held run without a leaderboard entry. Returns whether one was held.
    pub fn discard_pending(&mut self) -> bool {
        self.awaiting_name.take().is_some()
    }
}
