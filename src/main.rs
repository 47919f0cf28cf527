//! Stellar Arena entry point
//!
//! On wasm32 this wires the game loop to the DOM. Natively it plays one
//! seeded demo session headless and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent};

    use stellar_arena::driver::{GameLoop, GameObserver, RunSummary};
    use stellar_arena::highscores::HighScores;
    use stellar_arena::platform::web::{ElementPlayfield, RafScheduler};
    use stellar_arena::settings::Settings;
    use stellar_arena::sim::{GameEvent, GamePhase, GameState, Key};
    use stellar_arena::stats::{PlayerStats, RunRecords};
    use stellar_arena::tuning::Tuning;

    type Game = GameLoop<RafScheduler, WebObserver>;

    /// Pushes loop output into the DOM and records finished runs
    struct WebObserver {
        document: Document,
        settings: Settings,
        records: RunRecords,
    }

    impl WebObserver {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", !visible);
            }
        }

        fn flash(&self) {
            if !self.settings.effective_collision_flash() {
                return;
            }
            self.set_visible("collision-flash", true);
            let document = self.document.clone();
            let closure = Closure::once(move || {
                if let Some(el) = document.get_element_by_id("collision-flash") {
                    let _ = el.class_list().add_1("hidden");
                }
            });
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    self.settings.collision_flash_ms as i32,
                );
            }
            closure.forget();
        }

        /// Count a finished run, optionally holding it for the name dialog
        fn record(&mut self, summary: &RunSummary, wants_name: bool) {
            for achievement in self.records.finish_run(summary, wants_name) {
                self.set_text("achievement", &format!("Achievement \"{}\" unlocked!", achievement.title()));
            }
            self.records.stats.save();
            self.render_stats();
        }

        /// Returns false (and shows the error) when the name is rejected
        fn submit_name(&mut self, name: &str) -> bool {
            match self.records.submit_name(name, js_sys::Date::now()) {
                Ok(Some(rank)) => {
                    log::info!("{} placed #{}", name.trim(), rank);
                    self.records.high_scores.save();
                }
                Ok(None) => {}
                Err(e) => {
                    self.set_text("name-error", &e.to_string());
                    return false;
                }
            }
            self.set_text("name-error", "");
            self.set_visible("name-dialog", false);
            self.render_stats();
            true
        }

        /// Restart closes the dialog; the run was already counted
        fn abandon_name(&mut self) {
            if self.records.discard_pending() {
                log::info!("Run left off the leaderboard");
            }
            self.set_text("name-error", "");
            self.set_visible("name-dialog", false);
            self.set_visible("game-over", false);
        }

        fn toggle_hud(&mut self) {
            self.settings.show_hud = !self.settings.show_hud;
            self.settings.save();
            self.set_visible("hud", self.settings.show_hud);
        }

        fn render_stats(&self) {
            let stats = &self.records.stats;
            self.set_text("high-score", &stats.high_score.to_string());
            self.set_text("games-played", &stats.games_played.to_string());
            self.set_text("tokens-earned", &stats.tokens_earned.to_string());

            let rows: String = self
                .records
                .high_scores
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    let name = e.name.replace('&', "&amp;").replace('<', "&lt;");
                    format!("<li>#{} {} - {}</li>", i + 1, name, e.score)
                })
                .collect();
            if let Some(el) = self.document.get_element_by_id("leaderboard") {
                el.set_inner_html(&rows);
            }
        }

        fn show_game_over(&self, summary: &RunSummary) {
            self.set_text("final-score", &summary.final_score.to_string());
            self.set_text("final-tokens", &summary.tokens_collected.to_string());
            self.set_visible("game-over", true);
        }
    }

    impl GameObserver for WebObserver {
        fn on_score_update(&mut self, score: u64) {
            self.set_text("score", &score.to_string());
        }

        fn on_game_over(&mut self, summary: &RunSummary) {
            self.show_game_over(summary);
            self.record(summary, false);
        }

        fn on_name_required(&mut self, summary: &RunSummary) {
            self.show_game_over(summary);
            self.record(summary, true);
            self.set_visible("name-dialog", true);
        }

        fn on_event(&mut self, event: &GameEvent) {
            if let GameEvent::ShipHit { .. } = event {
                self.flash();
            }
        }
    }

    /// Redraw entities and HUD from the current state
    fn render(document: &Document, state: &GameState) {
        let mut html = String::with_capacity(64 * (state.asteroids.len() + state.tokens.len() + 1));
        html.push_str(&format!(
            "<div class=\"ship\" style=\"transform: translate({}px, {}px) rotate({}deg)\"></div>",
            state.ship.pos.x, state.ship.pos.y, state.ship.rotation
        ));
        for a in &state.asteroids {
            html.push_str(&format!(
                "<div class=\"asteroid {}\" style=\"width: {s}px; height: {s}px; transform: translate({}px, {}px) rotate({}deg)\"></div>",
                a.kind.as_str(),
                a.pos.x,
                a.pos.y,
                a.rotation,
                s = a.size()
            ));
        }
        for t in state.tokens.iter().filter(|t| !t.collected) {
            html.push_str(&format!(
                "<div class=\"token{}\" style=\"transform: translate({}px, {}px)\"></div>",
                if t.is_special() { " special" } else { "" },
                t.pos.x,
                t.pos.y
            ));
        }
        if let Some(el) = document.get_element_by_id("entities") {
            el.set_inner_html(&html);
        }
        if let Some(el) = document.get_element_by_id("level") {
            el.set_text_content(Some(&state.level().to_string()));
        }
        if let Some(el) = document.get_element_by_id("start-overlay") {
            let _ = el.class_list().toggle_with_force("hidden", state.phase != GamePhase::Idle);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Stellar Arena starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let arena = document.get_element_by_id("arena").ok_or("missing #arena element")?;

        let settings = Settings::load();
        let hook = settings.terminal_hook();
        let observer = WebObserver {
            document: document.clone(),
            settings,
            records: RunRecords::new(PlayerStats::load(), HighScores::load()),
        };
        observer.set_visible("hud", observer.settings.show_hud);
        observer.render_stats();

        let seed = js_sys::Date::now() as u64;
        let scheduler = RafScheduler::new();
        let game: Rc<RefCell<Game>> = Rc::new(RefCell::new(
            GameLoop::new(
                seed,
                Tuning::default(),
                Box::new(ElementPlayfield::new(arena)),
                scheduler.clone(),
                observer,
            )
            .with_terminal_hook(hook),
        ));
        log::info!("Game initialized with seed: {}", seed);

        {
            let game = game.clone();
            let document = document.clone();
            scheduler.set_callback(move |handle| {
                let mut g = game.borrow_mut();
                g.on_frame(handle);
                render(&document, g.state());
            });
        }

        setup_input_handlers(&window, game.clone(), document.clone())?;
        setup_buttons(&document, game.clone())?;

        render(&document, game.borrow().state());
        log::info!("Stellar Arena running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
        document: Document,
    ) -> Result<(), JsValue> {
        // Keyboard (global, not tied to focus)
        {
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_dom(&event.key());
                if !matches!(key, Key::Other(_)) {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                // Terminal means the name dialog may have focus
                let hud_key = matches!(&key, Key::Other(k) if k == "h" || k == "H");
                if hud_key && !event.repeat() && g.phase() != GamePhase::Terminal {
                    g.observer_mut().toggle_hud();
                }
                g.key_down(key);
                render(&document, g.state());
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().key_up(&Key::from_dom(&event.key()));
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        // Key-ups are lost while unfocused
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().release_all_keys();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        // Layout changes
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.layout_changed();
                render(&document, g.state());
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.observer_mut().abandon_name();
                g.reset();
                render(&doc, g.state());
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("name-submit") {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let Some(input) = doc
                    .get_element_by_id("name-input")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                if game.borrow_mut().observer_mut().submit_name(&input.value()) {
                    input.set_value("");
                }
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use stellar_arena::driver::{GameLoop, GameObserver, RunSummary};
    use stellar_arena::platform::IntervalScheduler;
    use stellar_arena::sim::{Key, Playfield, Steer, choose_steer};
    use stellar_arena::stats::PlayerStats;
    use stellar_arena::tuning::Tuning;

    /// Frame cap so a lucky autopilot still terminates
    const MAX_FRAMES: u64 = 60 * 60;

    #[derive(Default)]
    struct LogObserver {
        last_score: u64,
        result: Option<RunSummary>,
    }

    impl GameObserver for LogObserver {
        fn on_score_update(&mut self, score: u64) {
            if score != self.last_score {
                log::debug!("Score: {}", score);
                self.last_score = score;
            }
        }

        fn on_game_over(&mut self, summary: &RunSummary) {
            self.result = Some(*summary);
        }
    }

    /// Reference balance, or the JSON override at `path` when it loads cleanly
    pub fn load_tuning_or_default(path: Option<&str>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match Tuning::from_file(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning override from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning override {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run(seed: u64, tuning: Tuning) {
        let playfield = Playfield::new(800.0, 600.0);
        let mut game = GameLoop::new(
            seed,
            tuning,
            Box::new(playfield),
            IntervalScheduler::sixty_hz(),
            LogObserver::default(),
        );

        game.key_down(Key::Activate);
        game.key_up(&Key::Activate);

        while let Some(handle) = game.scheduler_mut().wait_next() {
            match choose_steer(game.state()) {
                Steer::Left => {
                    game.key_up(&Key::Right);
                    game.key_down(Key::Left);
                }
                Steer::Right => {
                    game.key_up(&Key::Left);
                    game.key_down(Key::Right);
                }
                Steer::None => {
                    game.key_up(&Key::Left);
                    game.key_up(&Key::Right);
                }
            }
            game.on_frame(handle);

            if game.state().frame >= MAX_FRAMES {
                log::info!("Frame cap reached, ending demo");
                game.teardown();
            }
        }

        let summary = game.observer().result.unwrap_or_else(|| game.summary());
        let mut stats = PlayerStats::new();
        let unlocked = stats.record_run(&summary);
        log::info!(
            "Demo finished: score {}, tokens {}, level {}, {} frames, {} achievement(s)",
            summary.final_score,
            summary.tokens_collected,
            summary.level,
            summary.frames,
            unlocked.len()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Stellar Arena (native) starting...");
    log::info!("Native mode plays a headless demo - run with `trunk serve` for the web version");

    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0x5EED);
    let tuning = headless::load_tuning_or_default(args.get(2).map(String::as_str));
    headless::run(seed, tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
