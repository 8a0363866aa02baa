//! Sprite and sound handle catalog
//!
//! Handles are registered up front with their file and draw size. The host
//! loads the files however it likes and reports back through
//! [`AssetCatalog::on_loaded`] / [`AssetCatalog::on_failed`]. Drawing code
//! asks [`AssetCatalog::sprite`] and skips anything that is not loaded yet.

use std::collections::HashMap;

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::consts::{ENEMY_CELL_H, ENEMY_CELL_W, PLAYER_SIZE, SHOT_H, SHOT_W};
use crate::sim::kinds::EnemyKind;
use crate::sim::objects::{EXPLOSION_FRAMES, MINE_SIZE, MISSILE_SIZE, POWERUP_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Player,
    PlayerLeft,
    PlayerRight,
    Enemy(EnemyKind),
    /// Explosion animation frame
    Explosion(u8),
    PlayerShot,
    PlayerShotHit,
    EnemyShot,
    EnemyShotHit,
    Life,
    Shield,
    ShieldPowerup,
    Missile,
    /// Mine blink frame
    Mine(u8),
    Star,
    Pause,
    Play,
    SoundOn,
    SoundOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Sprite(SpriteId),
    Sound(SoundEffect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    /// Never retried; the asset is just not drawn or played
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub path: String,
    /// Size the sprite is drawn at (zero for sounds)
    pub size: Vec2,
    pub state: LoadState,
}

impl Handle {
    fn new(path: String, size: Vec2) -> Self {
        Self {
            path,
            size,
            state: LoadState::Pending,
        }
    }

    pub fn loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    handles: HashMap<AssetKey, Handle>,
    ready: bool,
}

impl AssetCatalog {
    pub fn new() -> Self {
        let cell = Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H);
        let player = Vec2::splat(PLAYER_SIZE);
        let mut catalog = Self::default();
        let mut sprite = |id: SpriteId, file: String, size: Vec2| {
            catalog
                .handles
                .insert(AssetKey::Sprite(id), Handle::new(format!("images/{file}.png"), size));
        };

        sprite(SpriteId::Player, "player".into(), player);
        sprite(SpriteId::PlayerLeft, "playerLeft".into(), player);
        sprite(SpriteId::PlayerRight, "playerRight".into(), player);
        for kind in EnemyKind::ALL {
            sprite(SpriteId::Enemy(kind), format!("enemy{}", kind.tag()), kind.sprite_size());
        }
        for frame in 0..EXPLOSION_FRAMES as u8 {
            sprite(SpriteId::Explosion(frame), format!("explosion{}", frame + 1), cell);
        }
        let shot = Vec2::new(SHOT_W, SHOT_H);
        let hit = Vec2::splat(MINE_SIZE);
        sprite(SpriteId::PlayerShot, "laserRed".into(), shot);
        sprite(SpriteId::PlayerShotHit, "laserRedShot".into(), hit);
        sprite(SpriteId::EnemyShot, "laserGreen".into(), shot);
        sprite(SpriteId::EnemyShotHit, "laserGreenShot".into(), hit);
        sprite(SpriteId::Life, "life".into(), player / 2.0);
        sprite(SpriteId::Shield, "shield".into(), player + Vec2::new(12.0, 5.0));
        sprite(SpriteId::ShieldPowerup, "shieldPowerup".into(), Vec2::splat(POWERUP_SIZE));
        sprite(SpriteId::Missile, "missile".into(), MISSILE_SIZE);
        sprite(SpriteId::Mine(0), "mine1".into(), Vec2::splat(MINE_SIZE));
        sprite(SpriteId::Mine(1), "mine2".into(), Vec2::splat(MINE_SIZE));
        sprite(SpriteId::Star, "star".into(), Vec2::splat(16.0));
        for (id, file) in [
            (SpriteId::Pause, "pause"),
            (SpriteId::Play, "play"),
            (SpriteId::SoundOn, "sound_on"),
            (SpriteId::SoundOff, "sound_off"),
        ] {
            sprite(id, file.into(), Vec2::splat(32.0));
        }

        for effect in SoundEffect::ALL {
            catalog.handles.insert(
                AssetKey::Sound(effect),
                Handle::new(format!("sounds/{}.mp3", effect.file_stem()), Vec2::ZERO),
            );
        }
        catalog
    }

    pub fn handle(&self, key: AssetKey) -> Option<&Handle> {
        self.handles.get(&key)
    }

    pub fn is_loaded(&self, key: AssetKey) -> bool {
        self.handle(key).is_some_and(Handle::loaded)
    }

    /// Loaded sprite handle, or `None` while it is pending or failed
    pub fn sprite(&self, id: SpriteId) -> Option<&Handle> {
        self.handle(AssetKey::Sprite(id)).filter(|h| h.loaded())
    }

    /// Everything still waiting on the host, with its file path
    pub fn pending(&self) -> Vec<(AssetKey, &str)> {
        let mut pending: Vec<_> = self
            .handles
            .iter()
            .filter(|(_, h)| h.state == LoadState::Pending)
            .map(|(k, h)| (*k, h.path.as_str()))
            .collect();
        pending.sort_by(|a, b| a.1.cmp(b.1));
        pending
    }

    /// Record a finished load
    ///
    /// Returns true exactly once: on the load that completes the set the
    /// game needs before it can show the menu.
    pub fn on_loaded(&mut self, key: AssetKey) -> bool {
        match self.handles.get_mut(&key) {
            Some(handle) => handle.state = LoadState::Loaded,
            None => {
                log::warn!("Load notification for unknown asset {:?}", key);
                return false;
            }
        }
        if !self.ready && self.core_loaded() {
            self.ready = true;
            log::info!("Core sprites loaded");
            return true;
        }
        false
    }

    pub fn on_failed(&mut self, key: AssetKey, reason: &str) {
        if let Some(handle) = self.handles.get_mut(&key) {
            log::warn!("Load fail: {} ({})", handle.path, reason);
            handle.state = LoadState::Failed;
        }
    }

    /// Star and every enemy sprite are in
    fn core_loaded(&self) -> bool {
        self.is_loaded(AssetKey::Sprite(SpriteId::Star))
            && EnemyKind::ALL
                .iter()
                .all(|k| self.is_loaded(AssetKey::Sprite(SpriteId::Enemy(*k))))
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Headless hosts have nothing to load
    pub fn mark_all_loaded(&mut self) {
        for handle in self.handles.values_mut() {
            handle.state = LoadState::Loaded;
        }
        self.ready = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let assets = AssetCatalog::new();
        let carrier = assets
            .handle(AssetKey::Sprite(SpriteId::Enemy(EnemyKind::Carrier)))
            .expect("registered");
        assert_eq!(carrier.path, "images/enemy5.png");
        assert_eq!(carrier.size, Vec2::new(72.0, 48.0));
        assert_eq!(
            assets
                .handle(AssetKey::Sound(SoundEffect::Explosion))
                .map(|h| h.path.as_str()),
            Some("sounds/enemy_exp.mp3")
        );
        assert!(assets.sprite(SpriteId::Player).is_none());
        assert!(!assets.pending().is_empty());
    }

    #[test]
    fn test_ready_fires_once() {
        let mut assets = AssetCatalog::new();
        assert!(!assets.on_loaded(AssetKey::Sprite(SpriteId::Star)));
        let mut fired = 0;
        for kind in EnemyKind::ALL {
            if assets.on_loaded(AssetKey::Sprite(SpriteId::Enemy(kind))) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(assets.is_ready());
        assert!(!assets.on_loaded(AssetKey::Sprite(SpriteId::Star)));
    }

    #[test]
    fn test_failed_sprite_stays_hidden() {
        let mut assets = AssetCatalog::new();
        assets.on_failed(AssetKey::Sprite(SpriteId::Mine(0)), "404");
        assert!(assets.sprite(SpriteId::Mine(0)).is_none());
        assert!(
            !assets
                .pending()
                .iter()
                .any(|(k, _)| *k == AssetKey::Sprite(SpriteId::Mine(0)))
        );
    }
}
