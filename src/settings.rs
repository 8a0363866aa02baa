//! Game settings and preferences
//!
//! Persisted as one JSON value, separately from the checkpoint keys.

use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::platform::storage::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gates every sound effect
    pub sound_on: bool,
    /// Editor help overlay
    pub show_help: bool,

    // === Editor defaults ===
    /// Seconds between attacks in a custom level
    pub editor_attack_interval_secs: f32,
    pub editor_player_lives: u32,
    pub editor_player_missiles: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_on: true,
            show_help: true,
            editor_attack_interval_secs: 1.5,
            editor_player_lives: 3,
            editor_player_missiles: 2,
        }
    }
}

impl Settings {
    /// Store key
    const STORAGE_KEY: &'static str = "xenophobia_settings";

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), GameError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp editor defaults into the ranges their sliders accept
    fn sanitized(mut self) -> Self {
        if !(0.0..=3.0).contains(&self.editor_attack_interval_secs) {
            log::warn!(
                "Attack interval {} out of range, clamped",
                self.editor_attack_interval_secs
            );
            self.editor_attack_interval_secs = self.editor_attack_interval_secs.clamp(0.0, 3.0);
        }
        self.editor_player_lives = self.editor_player_lives.clamp(1, 10);
        self.editor_player_missiles = self.editor_player_missiles.min(20);
        self
    }
}
