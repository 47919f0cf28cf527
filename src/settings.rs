//! Presentation preferences
//!
//! Persisted separately from the leaderboard in LocalStorage. None of these
//! affect the simulation.

use serde::{Deserialize, Serialize};

use crate::driver::TerminalHook;

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Red flash when the ship is hit
    pub collision_flash: bool,
    /// Flash duration in milliseconds
    pub collision_flash_ms: u32,

    // === HUD ===
    /// Score and level overlay, toggled with `h`
    pub show_hud: bool,

    // === Leaderboard ===
    /// Ask for a name before recording a finished run
    pub prompt_for_name: bool,

    // === Accessibility ===
    /// Reduced motion (no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collision_flash: true,
            collision_flash_ms: 500,

            show_hud: true,

            prompt_for_name: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective collision flash (respects reduced_motion)
    pub fn effective_collision_flash(&self) -> bool {
        self.collision_flash && !self.reduced_motion
    }

    /// Which terminal hook the loop should use
    pub fn terminal_hook(&self) -> TerminalHook {
        if self.prompt_for_name {
            TerminalHook::NameRequired
        } else {
            TerminalHook::GameOver
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "stellar_arena_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_flash() {
        let mut settings = Settings::default();
        assert!(settings.effective_collision_flash());
        settings.reduced_motion = true;
        assert!(!settings.effective_collision_flash());
    }

    #[test]
    fn test_terminal_hook_follows_prompt() {
        let mut settings = Settings::default();
        assert_eq!(settings.terminal_hook(), TerminalHook::NameRequired);
        settings.prompt_for_name = false;
        assert_eq!(settings.terminal_hook(), TerminalHook::GameOver);
    }

    #[test]
    fn test_old_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "show_hud": false }"#).unwrap();
        assert!(!settings.show_hud);
        assert!(settings.prompt_for_name);
        assert_eq!(settings.collision_flash_ms, 500);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // Older builds stored an fps toggle
        let settings: Settings = serde_json::from_str(r#"{ "show_fps": true, "reduced_motion": true }"#).unwrap();
        assert!(settings.reduced_motion);
        assert!(settings.show_hud);
    }
}
