//! Sound effects
//!
//! The simulation only reports [`GameEvent`]s; this module maps them to
//! sound ids and forwards them to whatever backend implements
//! [`SoundSink`]. Nothing is forwarded while sound is off or while the
//! sound's asset has not finished loading.

use crate::assets::{AssetCatalog, AssetKey};
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player shot or missile launch
    Shot,
    /// Enemy cannon
    EnemyShot,
    /// Any explosion: enemy kill, player hit
    Explosion,
    /// Laser column
    Laser,
    /// Looping background hum
    Ambience,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 5] = [
        SoundEffect::Shot,
        SoundEffect::EnemyShot,
        SoundEffect::Explosion,
        SoundEffect::Laser,
        SoundEffect::Ambience,
    ];

    /// File stem under `sounds/`
    pub fn file_stem(self) -> &'static str {
        match self {
            SoundEffect::Shot => "shot",
            SoundEffect::EnemyShot => "enemy_shot",
            SoundEffect::Explosion => "enemy_exp",
            SoundEffect::Laser => "laser",
            SoundEffect::Ambience => "ambience",
        }
    }

    pub fn looping(self) -> bool {
        self == SoundEffect::Ambience
    }

    /// The sound a simulation event makes, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::PlayerFired | GameEvent::MissileLaunched => Some(SoundEffect::Shot),
            GameEvent::EnemyFired => Some(SoundEffect::EnemyShot),
            GameEvent::LaserFired => Some(SoundEffect::Laser),
            GameEvent::EnemyDestroyed { .. }
            | GameEvent::PlayerHit
            | GameEvent::PlayerDestroyed => Some(SoundEffect::Explosion),
            GameEvent::PowerupCollected(_) | GameEvent::AttackLaunched(_) => None,
        }
    }
}

/// Backend that actually makes noise
pub trait SoundSink {
    fn play(&mut self, effect: SoundEffect);
    /// Silence anything still playing (loops included)
    fn stop_all(&mut self);
}

/// Sink that drops everything; used headless
#[derive(Debug, Default)]
pub struct SilentSink;

impl SoundSink for SilentSink {
    fn play(&mut self, _effect: SoundEffect) {}
    fn stop_all(&mut self) {}
}

/// Sink that remembers what it was asked to play
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub played: Vec<SoundEffect>,
    pub stops: u32,
}

impl SoundSink for RecordingSink {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }

    fn stop_all(&mut self) {
        self.stops += 1;
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn SoundSink>,
    muted: bool,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(SilentSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn SoundSink>) -> Self {
        Self { sink, muted: false }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute/unmute all audio; muting also cuts running loops
    pub fn set_muted(&mut self, muted: bool) {
        if muted && !self.muted {
            self.sink.stop_all();
        }
        self.muted = muted;
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect, assets: &AssetCatalog) {
        if self.muted || !assets.is_loaded(AssetKey::Sound(effect)) {
            return;
        }
        self.sink.play(effect);
    }

    /// Play the sounds for a batch of simulation events
    pub fn play_events(&mut self, events: &[GameEvent], assets: &AssetCatalog) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect, assets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares its log with the test after being boxed into the manager
    #[derive(Default, Clone)]
    struct SharedSink(Rc<RefCell<RecordingSink>>);

    impl SoundSink for SharedSink {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().play(effect);
        }
        fn stop_all(&mut self) {
            self.0.borrow_mut().stop_all();
        }
    }

    fn loaded_catalog() -> AssetCatalog {
        let mut assets = AssetCatalog::new();
        assets.mark_all_loaded();
        assets
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::MissileLaunched),
            Some(SoundEffect::Shot)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PlayerDestroyed),
            Some(SoundEffect::Explosion)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::AttackLaunched(crate::sim::EnemyId(1))),
            None
        );
    }

    #[test]
    fn test_mute_gates_playback() {
        let shared = SharedSink::default();
        let mut audio = AudioManager::new(Box::new(shared.clone()));
        let assets = loaded_catalog();
        audio.play_events(&[GameEvent::PlayerFired, GameEvent::LaserFired], &assets);
        audio.set_muted(true);
        audio.play(SoundEffect::Shot, &assets);
        let log = shared.0.borrow();
        assert_eq!(log.played, vec![SoundEffect::Shot, SoundEffect::Laser]);
        assert_eq!(log.stops, 1);
    }

    #[test]
    fn test_unloaded_sound_is_skipped() {
        let shared = SharedSink::default();
        let mut audio = AudioManager::new(Box::new(shared.clone()));
        let mut assets = AssetCatalog::new();
        audio.play(SoundEffect::Laser, &assets);
        assets.on_loaded(AssetKey::Sound(SoundEffect::Laser));
        audio.play(SoundEffect::Laser, &assets);
        assert_eq!(shared.0.borrow().played, vec![SoundEffect::Laser]);
    }
}
