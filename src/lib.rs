//! Xenophobia - a vertical shoot-em-up
//!
//! Core modules:
//! - `sim`: Deterministic simulation (paths, enemies, projectiles, levels)
//! - `editor`: Level editor operating on the live enemy roster
//! - `game`: Session flow (menu, progression, checkpoints, pause)
//! - `renderer`: Narrow 2D drawing contract and scene composition
//! - `platform`: Input, key-value storage and the fixed-step clock
//! - `persistence`: Checkpoint save/load

pub mod assets;
pub mod audio;
pub mod editor;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use game::Game;
pub use settings::Settings;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICKS_PER_SECOND: u32 = 30;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 480.0;
    pub const FIELD_HEIGHT: f32 = 560.0;
    /// The player may not fly above this line
    pub const BOUNDARY: f32 = FIELD_HEIGHT - 200.0;

    /// Canonical enemy cell; formation spacing derives from it
    pub const ENEMY_CELL_W: f32 = 36.0;
    pub const ENEMY_CELL_H: f32 = 24.0;
    /// Columns per formation row
    pub const GRID_COLUMNS: usize = 8;

    pub const SHOT_W: f32 = 5.0;
    pub const SHOT_H: f32 = 15.0;

    pub const PLAYER_SIZE: f32 = 36.0;
    pub const PLAYER_SPEED: f32 = 8.0;
    /// Ticks that must elapse between player shots
    pub const PLAYER_SHOT_COOLDOWN: u32 = 10;
    pub const PLAYER_START_LIVES: u32 = 3;
    pub const PLAYER_START_MISSILES: u32 = 2;

    /// Formation-wide wander oscillator
    pub const WANDER_MAX: f32 = 10.0;
    pub const WANDER_MIN: f32 = -10.0;
    pub const WANDER_SPEED: f32 = 0.2;

    /// Ticks the game-over banner waits before the session ends
    pub const GAME_OVER_DELAY: i32 = 15;
}

/// Dimensions of the play field handed to everything that needs bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    /// Top edge of the player's movement band
    pub boundary: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: consts::FIELD_WIDTH,
            height: consts::FIELD_HEIGHT,
            boundary: consts::BOUNDARY,
        }
    }
}

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Rectangle spanned by two corner points in any order
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        Self {
            pos: min,
            size: (a - b).abs(),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Strict overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.pos.x
            && self.pos.x < other.right()
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }

    /// Strict containment of a point (edges excluded)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.pos.x && p.x < self.right() && p.y > self.pos.y && p.y < self.bottom()
    }
}

/// Anything with a bounding box that can take part in collision tests
pub trait Bounded {
    fn bounds(&self) -> Rect;

    fn collides_with<B: Bounded + ?Sized>(&self, other: &B) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}
