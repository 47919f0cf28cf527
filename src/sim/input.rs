//! Held-key tracking
//!
//! Mirrors hardware key state between ticks. Key events may arrive at any
//! rate; the tick only ever asks "is this key down right now".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys the game cares about, plus anything else the platform reports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    /// Starts a session from Idle
    Activate,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            " " | "Spacebar" => Key::Activate,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Horizontal steering derived from held keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    None,
}

/// Set of currently held keys
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    held: HashSet<Key>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Repeats are harmless.
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: &Key) {
        self.held.remove(key);
    }

    pub fn is_held(&self, key: &Key) -> bool {
        self.held.contains(key)
    }

    /// Left wins when both directions are held
    pub fn steer(&self) -> Steer {
        if self.is_held(&Key::Left) {
            Steer::Left
        } else if self.is_held(&Key::Right) {
            Steer::Right
        } else {
            Steer::None
        }
    }

    /// Forget everything (window blur loses key-up events)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_mirrors_state() {
        let mut input = InputTracker::new();
        input.press(Key::Left);
        input.press(Key::Left);
        assert!(input.is_held(&Key::Left));
        assert_eq!(input.len(), 1);

        input.release(&Key::Left);
        assert!(!input.is_held(&Key::Left));
        assert!(input.is_empty());
    }

    #[test]
    fn test_left_wins_over_right() {
        let mut input = InputTracker::new();
        input.press(Key::Right);
        assert_eq!(input.steer(), Steer::Right);
        input.press(Key::Left);
        assert_eq!(input.steer(), Steer::Left);
        input.release(&Key::Left);
        assert_eq!(input.steer(), Steer::Right);
    }

    #[test]
    fn test_dom_mapping() {
        assert_eq!(Key::from_dom("ArrowLeft"), Key::Left);
        assert_eq!(Key::from_dom(" "), Key::Activate);
        assert_eq!(Key::from_dom("a"), Key::Other("a".into()));
    }
}
