//! Score-driven difficulty

use crate::tuning::Tuning;

/// `1 + floor(score / step) * increment`
pub fn difficulty_for_score(score: u64, tuning: &Tuning) -> f32 {
    let steps = score / tuning.difficulty_score_step;
    1.0 + steps as f32 * tuning.difficulty_increment
}
