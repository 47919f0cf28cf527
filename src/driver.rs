//! Session state machine and frame scheduling
//!
//! `GameLoop` owns the session, the held-key set and the scheduler. It is the
//! only thing that arms frames, and it keeps at most one armed at a time:
//!
//! ```text
//! Idle --activate key--> Active --asteroid hit--> Terminal --reset--> Idle
//! ```
//!
//! While Idle or Terminal nothing is armed, so the simulation is fully
//! suspended.

use serde::{Deserialize, Serialize};

use crate::platform::{FrameHandle, FrameScheduler, PlayfieldSource};
use crate::sim::{GameEvent, GamePhase, GameState, InputTracker, Key, tick};
use crate::tuning::Tuning;

/// How the end of a session is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TerminalHook {
    /// `on_game_over` with the final result
    #[default]
    GameOver,
    /// `on_name_required` instead, so a name can be collected first
    NameRequired,
}

/// Outcome of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_score: u64,
    pub tokens_collected: u32,
    pub frames: u64,
    pub level: u32,
    pub seed: u64,
}

/// Receives loop output. Called synchronously from inside a frame; anything
/// slow (saving, network) must be deferred by the implementor.
pub trait GameObserver {
    /// Current score, once per completed active frame
    fn on_score_update(&mut self, score: u64);

    /// Session ended (fires once per session)
    fn on_game_over(&mut self, summary: &RunSummary);

    /// Session ended and the app wants a player name before recording it
    fn on_name_required(&mut self, summary: &RunSummary) {
        self.on_game_over(summary);
    }

    /// Every simulation event, in order (spawns, pickups, hits)
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// The game loop driver
pub struct GameLoop<S: FrameScheduler, O: GameObserver> {
    state: GameState,
    input: InputTracker,
    scheduler: S,
    observer: O,
    playfield_source: Box<dyn PlayfieldSource>,
    hook: TerminalHook,
    /// The single outstanding frame, if armed
    pending: Option<FrameHandle>,
    terminal_reported: bool,
}

impl<S: FrameScheduler, O: GameObserver> GameLoop<S, O> {
    pub fn new(
        seed: u64,
        tuning: Tuning,
        playfield_source: Box<dyn PlayfieldSource>,
        scheduler: S,
        observer: O,
    ) -> Self {
        let playfield = playfield_source.measure();
        if !playfield.is_measured() {
            log::debug!("Playfield not laid out yet ({:?})", playfield);
        }
        Self {
            state: GameState::with_tuning(seed, playfield, tuning),
            input: InputTracker::new(),
            scheduler,
            observer,
            playfield_source,
            hook: TerminalHook::default(),
            pending: None,
            terminal_reported: false,
        }
    }

    pub fn with_terminal_hook(mut self, hook: TerminalHook) -> Self {
        self.hook = hook;
        self
    }

    pub fn set_terminal_hook(&mut self, hook: TerminalHook) {
        self.hook = hook;
    }

    /// Key-down from the platform. The activation key also starts an idle session.
    pub fn key_down(&mut self, key: Key) {
        let activate = key == Key::Activate;
        self.input.press(key);
        if activate {
            self.activate();
        }
    }

    pub fn key_up(&mut self, key: &Key) {
        self.input.release(key);
    }

    /// Drop all held keys (focus lost, key-ups will never arrive)
    pub fn release_all_keys(&mut self) {
        self.input.clear();
    }

    /// Idle -> Active. No-op (returns false) in any other phase, or while
    /// the playfield still has no size.
    pub fn activate(&mut self) -> bool {
        if self.state.phase != GamePhase::Idle {
            return false;
        }
        if !self.state.playfield.is_measured() {
            self.layout_changed();
            if !self.state.playfield.is_measured() {
                log::warn!(
                    "Activation ignored: playfield not measured ({:?})",
                    self.state.playfield
                );
                return false;
            }
        }

        self.state.phase = GamePhase::Active;
        log::info!("Session started (seed {})", self.state.seed);
        self.arm();
        true
    }

    /// Re-measure the playfield (resize, late layout)
    pub fn layout_changed(&mut self) {
        let playfield = self.playfield_source.measure();
        if playfield != self.state.playfield {
            log::debug!("Playfield resized to {}x{}", playfield.width, playfield.height);
            self.state.set_playfield(playfield);
        }
    }

    /// Frame callback from the scheduler
    pub fn on_frame(&mut self, handle: FrameHandle) {
        if self.pending != Some(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending = None;

        if self.state.phase != GamePhase::Active {
            return;
        }

        tick(&mut self.state, &self.input);

        for event in self.state.drain_events() {
            self.observer.on_event(&event);
        }

        // A pickup on the fatal tick still reaches the score display
        self.observer.on_score_update(self.state.score);

        if self.state.phase == GamePhase::Terminal {
            self.report_terminal();
            return;
        }

        self.arm();
    }

    /// Terminal (or any phase) -> Idle with a fresh session. Held keys are kept.
    pub fn reset(&mut self) {
        self.disarm();
        self.layout_changed();
        self.state.reset();
        self.terminal_reported = false;
        log::info!("Session reset");
    }

    /// Cancel any armed frame. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.disarm();
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            final_score: self.state.score,
            tokens_collected: self.state.tokens_collected,
            frames: self.state.frame,
            level: self.state.level(),
            seed: self.state.seed,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted scenarios (entity injection)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    fn arm(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn report_terminal(&mut self) {
        if self.terminal_reported {
            return;
        }
        self.terminal_reported = true;
        self.disarm();

        let summary = self.summary();
        log::info!(
            "Game over: score {}, tokens {}, level {}",
            summary.final_score,
            summary.tokens_collected,
            summary.level
        );
        match self.hook {
            TerminalHook::GameOver => self.observer.on_game_over(&summary),
            TerminalHook::NameRequired => self.observer.on_name_required(&summary),
        }
    }
}

impl<S: FrameScheduler, O: GameObserver> Drop for GameLoop<S, O> {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualScheduler;
    use crate::sim::{Asteroid, AsteroidKind, Playfield, Token};
    use glam::Vec2;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        scores: Vec<u64>,
        game_overs: Vec<RunSummary>,
        name_requests: Vec<RunSummary>,
        hits: u32,
    }

    impl GameObserver for Recorder {
        fn on_score_update(&mut self, score: u64) {
            self.scores.push(score);
        }

        fn on_game_over(&mut self, summary: &RunSummary) {
            self.game_overs.push(*summary);
        }

        fn on_name_required(&mut self, summary: &RunSummary) {
            self.name_requests.push(*summary);
        }

        fn on_event(&mut self, event: &GameEvent) {
            if matches!(event, GameEvent::ShipHit { .. }) {
                self.hits += 1;
            }
        }
    }

    type TestLoop = GameLoop<ManualScheduler, Recorder>;

    fn new_loop(playfield: Playfield) -> TestLoop {
        GameLoop::new(
            2024,
            Tuning::default(),
            Box::new(playfield),
            ManualScheduler::new(),
            Recorder::default(),
        )
    }

    fn field() -> Playfield {
        Playfield::new(800.0, 600.0)
    }

    /// Fire up to `n` armed frames; returns how many fired
    fn run_frames(game: &mut TestLoop, n: usize) -> usize {
        let mut fired = 0;
        while fired < n {
            let Some(handle) = game.scheduler_mut().take_pending() else {
                break;
            };
            game.on_frame(handle);
            fired += 1;
            assert!(game.scheduler().outstanding().len() <= 1);
        }
        fired
    }

    /// Remove naturally spawned entities so scripted ones are the only actors
    fn clear_field(game: &mut TestLoop) {
        game.state_mut().asteroids.clear();
        game.state_mut().tokens.clear();
    }

    #[test]
    fn test_idle_is_inert() {
        let mut game = new_loop(field());
        assert!(!game.is_armed());
        assert_eq!(run_frames(&mut game, 100), 0);

        // A forged handle does nothing either
        game.on_frame(FrameHandle(1));
        assert_eq!(game.state().frame, 0);
        assert!(game.observer().scores.is_empty());
    }

    #[test]
    fn test_activation_key_starts_once() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        assert_eq!(game.phase(), GamePhase::Active);
        assert_eq!(game.scheduler().requested, 1);

        // Re-entrant activation is a no-op
        game.key_down(Key::Activate);
        assert!(!game.activate());
        assert_eq!(game.scheduler().requested, 1);
    }

    #[test]
    fn test_basic_playthrough() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        game.key_up(&Key::Activate);

        for _ in 0..60 {
            clear_field(&mut game);
            assert_eq!(run_frames(&mut game, 1), 1);
        }
        assert_eq!(game.state().score, 0);
        assert_eq!(game.phase(), GamePhase::Active);
        assert_eq!(game.observer().scores.len(), 60);
        assert_eq!(game.state().frame, 60);

        // Token lands on the ship during the next tick's fall step
        clear_field(&mut game);
        let fall = game.state().tuning.token_fall_speed;
        let pos = game.state().ship.pos - Vec2::new(0.0, fall);
        let id = game.state_mut().next_entity_id();
        game.state_mut().tokens.push(Token::new(id, pos, 1));

        run_frames(&mut game, 1);
        assert_eq!(game.state().score, 10);
        assert!(game.state().tokens.iter().any(|t| t.id == id && t.collected));
        assert_eq!(game.observer().scores.last(), Some(&10));
    }

    #[test]
    fn test_collision_ends_game() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        run_frames(&mut game, 5);
        clear_field(&mut game);
        game.state_mut().score = 70;

        let ship = game.state().ship.pos;
        let id = game.state_mut().next_entity_id();
        game.state_mut()
            .asteroids
            .push(Asteroid::new(id, AsteroidKind::Large, ship, 1.0));

        run_frames(&mut game, 1);
        assert_eq!(game.phase(), GamePhase::Terminal);
        assert!(!game.is_armed());
        assert_eq!(game.observer().game_overs.len(), 1);
        assert_eq!(game.observer().game_overs[0].final_score, 70);
        assert_eq!(game.observer().hits, 1);

        // Nothing more runs
        assert_eq!(run_frames(&mut game, 10), 0);
        game.key_down(Key::Activate);
        assert_eq!(game.phase(), GamePhase::Terminal);
        assert_eq!(game.observer().game_overs.len(), 1);
    }

    #[test]
    fn test_fatal_tick_pickup_reaches_score_display() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        run_frames(&mut game, 3);
        clear_field(&mut game);
        game.state_mut().score = 40;

        let ship = game.state().ship.pos;
        let token_id = game.state_mut().next_entity_id();
        game.state_mut().tokens.push(Token::new(token_id, ship, 1));
        let rock_id = game.state_mut().next_entity_id();
        game.state_mut()
            .asteroids
            .push(Asteroid::new(rock_id, AsteroidKind::Large, ship, 1.0));

        run_frames(&mut game, 1);
        assert_eq!(game.phase(), GamePhase::Terminal);
        assert_eq!(game.observer().game_overs[0].final_score, 50);
        assert_eq!(game.observer().scores.last(), Some(&50));
    }

    #[test]
    fn test_name_hook_replaces_game_over() {
        let mut game = new_loop(field()).with_terminal_hook(TerminalHook::NameRequired);
        game.key_down(Key::Activate);
        clear_field(&mut game);
        let ship = game.state().ship.pos;
        let id = game.state_mut().next_entity_id();
        game.state_mut()
            .asteroids
            .push(Asteroid::new(id, AsteroidKind::Medium, ship, 1.0));

        run_frames(&mut game, 1);
        assert_eq!(game.observer().name_requests.len(), 1);
        assert!(game.observer().game_overs.is_empty());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        game.key_down(Key::Left);
        run_frames(&mut game, 30);
        game.state_mut().score = 300;

        game.reset();
        let state = game.state();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.difficulty, 1.0);
        assert_eq!(state.frame, 0);
        assert_eq!(state.last_asteroid_frame, 0);
        assert_eq!(state.last_token_frame, 0);
        assert!(state.asteroids.is_empty() && state.tokens.is_empty());
        assert_eq!(state.ship.pos.x, 400.0);
        assert!(!game.is_armed());
        assert!(game.scheduler().outstanding().is_empty());
        // Held keys survive the reset
        assert!(game.input().is_held(&Key::Left));

        assert!(game.activate());
        assert_eq!(run_frames(&mut game, 1), 1);
    }

    #[test]
    fn test_reset_while_active_cancels_frame() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        assert!(game.is_armed());
        game.reset();
        assert_eq!(game.scheduler().cancelled, 1);
        assert_eq!(run_frames(&mut game, 5), 0);
    }

    #[test]
    fn test_teardown_cancels_pending_frame() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        let handle = game.scheduler().outstanding()[0];
        game.teardown();
        assert!(game.scheduler().outstanding().is_empty());

        // A late-arriving callback is ignored
        game.on_frame(handle);
        assert_eq!(game.state().frame, 0);
    }

    #[test]
    fn test_unmeasured_playfield_blocks_activation() {
        let mut game = new_loop(Playfield::default());
        game.key_down(Key::Activate);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(!game.is_armed());
    }

    #[test]
    fn test_spawn_interval_tracks_difficulty() {
        let mut game = new_loop(field());
        game.key_down(Key::Activate);
        game.state_mut().score = 1000;
        // Difficulty catches up with score on the next tick
        clear_field(&mut game);
        run_frames(&mut game, 1);
        assert_eq!(game.state().difficulty, 3.5);
        assert_eq!(
            crate::sim::asteroid_interval(game.state().difficulty, &game.state().tuning),
            25.0
        );
    }

    proptest! {
        #[test]
        fn terminal_callback_fires_once(hit_frames in proptest::collection::vec(0usize..40, 1..6)) {
            let mut game = new_loop(field());
            game.key_down(Key::Activate);

            for frame in 0..40 {
                if hit_frames.contains(&frame) {
                    let ship = game.state().ship.pos;
                    let id = game.state_mut().next_entity_id();
                    game.state_mut()
                        .asteroids
                        .push(Asteroid::new(id, AsteroidKind::Large, ship, 0.5));
                }
                // Keep firing even after terminal; stale handles must be ignored
                match game.scheduler_mut().take_pending() {
                    Some(handle) => game.on_frame(handle),
                    None => game.on_frame(FrameHandle(frame as u32 + 1000)),
                }
            }
            prop_assert_eq!(game.observer().game_overs.len(), 1);
            prop_assert_eq!(game.phase(), GamePhase::Terminal);
        }
    }
}
