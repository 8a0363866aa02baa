//! Player and short-lived entities
//!
//! Shots, lasers, missiles, mines, powerups, explosions and the life tray.
//! Each has a position, an activity flag and a narrow update/collision
//! contract; the tick driver decides what happens on contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::path::PointPath;
use super::tick::TickInput;
use crate::consts::{
    PLAYER_SHOT_COOLDOWN, PLAYER_SIZE, PLAYER_SPEED, SHOT_H, SHOT_W,
};
use crate::{Bounded, Field, Rect};

pub const PLAYER_SHOT_SPEED: f32 = -10.0;
pub const ENEMY_SHOT_SPEED: f32 = 10.0;
/// Ticks an exploded shot lingers before it disappears
pub const SHOT_EXPLOSION_TICKS: u32 = 20;

pub const LASER_TICKS: i32 = 15;

pub const MISSILE_SPEED: f32 = -7.0;
pub const MISSILE_SIZE: Vec2 = Vec2::new(PLAYER_SIZE / 1.25, PLAYER_SIZE);
pub const MISSILE_DAMAGE: i32 = 2;

pub const MINE_SIZE: f32 = 28.0;
pub const MINE_BLINK_TICKS: u32 = 15;
pub const MINE_DAMAGE: i32 = 3;

pub const POWERUP_SIZE: f32 = 20.0;
pub const POWERUP_FALL: f32 = 4.0;
/// Score awarded for a shield pickup while already shielded
pub const SHIELD_BONUS: u32 = 500;

pub const EXPLOSION_FRAMES: u32 = 4;
const EXPLOSION_FRAME_TICKS: u32 = 2;

const BLINK_TICKS: u32 = 10;
const BLINK_IMMOBILE_TICKS: u32 = 30;
const RESPAWN_BLINKS: u32 = 3;
const LIFE_FLIGHT_TICKS: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotPhase {
    Flying,
    /// Hit something; stays put while the impact sprite plays
    Exploding { ticks: u32 },
    Gone,
}

/// Straight vertical bolt, fired by the player (upward) or enemies (downward)
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub speed: f32,
    pub phase: ShotPhase,
}

impl Bounded for Shot {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, SHOT_W, SHOT_H)
    }
}

impl Shot {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            speed,
            phase: ShotPhase::Flying,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != ShotPhase::Gone
    }

    pub fn update(&mut self, field: &Field) {
        match &mut self.phase {
            ShotPhase::Flying => {
                self.pos.y += self.speed;
                if self.pos.y < 0.0 || self.pos.y > field.height {
                    self.phase = ShotPhase::Gone;
                }
            }
            ShotPhase::Exploding { ticks } => {
                *ticks += 1;
                if *ticks > SHOT_EXPLOSION_TICKS {
                    self.phase = ShotPhase::Gone;
                }
            }
            ShotPhase::Gone => {}
        }
    }

    /// Explode on contact; a shot strikes at most once
    pub fn strike(&mut self, target: &Rect) -> bool {
        if self.phase == ShotPhase::Flying && self.bounds().overlaps(target) {
            self.phase = ShotPhase::Exploding { ticks: 0 };
            true
        } else {
            false
        }
    }
}

/// Column growing downward from its origin for a fixed number of ticks
#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    timer: i32,
    step: f32,
    pub active: bool,
}

impl Bounded for Laser {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

impl Laser {
    pub fn new(origin: Vec2, width: f32, field: &Field) -> Self {
        let height = field.height - origin.y;
        Self {
            pos: origin,
            width,
            height,
            timer: LASER_TICKS,
            step: height / LASER_TICKS as f32,
            active: true,
        }
    }

    pub fn update(&mut self) {
        self.timer -= 1;
        if self.timer < 0 {
            self.active = false;
        }
        self.pos.y += self.step;
        self.height -= self.step;
    }
}

/// Anything enemies fire at the player
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyProjectile {
    Shot(Shot),
    Laser(Laser),
}

impl EnemyProjectile {
    pub fn update(&mut self, field: &Field) {
        match self {
            EnemyProjectile::Shot(s) => s.update(field),
            EnemyProjectile::Laser(l) => l.update(),
        }
    }

    /// Whether the projectile damages `target` this tick
    ///
    /// Shots are spent on contact, lasers keep burning.
    pub fn strike(&mut self, target: &Rect) -> bool {
        match self {
            EnemyProjectile::Shot(s) => s.strike(target),
            EnemyProjectile::Laser(l) => l.active && l.bounds().overlaps(target),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            EnemyProjectile::Shot(s) => s.is_active(),
            EnemyProjectile::Laser(l) => l.active,
        }
    }
}

/// Area blast on first contact
#[derive(Debug, Clone, PartialEq)]
pub struct Missile {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub active: bool,
}

impl Bounded for Missile {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

impl Missile {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: MISSILE_SIZE,
            speed: MISSILE_SPEED,
            active: true,
        }
    }

    pub fn update(&mut self, field: &Field) {
        self.pos.y += self.speed;
        if self.pos.y < 0.0 || self.pos.y > field.height {
            self.active = false;
        }
    }

    /// Detonate on contact; returns the blast, which the caller applies
    pub fn strike(&mut self, target: &Rect) -> Option<Explosion> {
        if !self.active || !self.bounds().overlaps(target) {
            return None;
        }
        self.active = false;
        Some(Explosion::new(Rect::new(
            self.pos.x - 2.0 * self.size.x,
            self.pos.y - self.size.y,
            self.size.x * 5.0,
            self.size.y * 3.0,
        )))
    }
}

/// Anything the player fires
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerProjectile {
    Shot(Shot),
    Missile(Missile),
}

impl PlayerProjectile {
    pub fn update(&mut self, field: &Field) {
        match self {
            PlayerProjectile::Shot(s) => s.update(field),
            PlayerProjectile::Missile(m) => m.update(field),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            PlayerProjectile::Shot(s) => s.is_active(),
            PlayerProjectile::Missile(m) => m.active,
        }
    }
}

/// Four frame explosion stretched over a rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub rect: Rect,
    pub frame: u32,
    time: u32,
    pub active: bool,
}

impl Bounded for Explosion {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Explosion {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            frame: 0,
            time: 0,
            active: true,
        }
    }

    pub fn update(&mut self) {
        self.time += 1;
        if self.time > EXPLOSION_FRAME_TICKS {
            self.time = 0;
            self.frame += 1;
            if self.frame >= EXPLOSION_FRAMES {
                self.active = false;
            }
        }
    }
}

/// Stationary mine left by a mine layer
#[derive(Debug, Clone, PartialEq)]
pub struct Mine {
    pub pos: Vec2,
    /// Which of the two blink sprites is showing
    pub lit: bool,
    blink_timer: u32,
    pub active: bool,
}

impl Bounded for Mine {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, MINE_SIZE, MINE_SIZE)
    }
}

impl Mine {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            lit: false,
            blink_timer: MINE_BLINK_TICKS,
            active: true,
        }
    }

    pub fn update(&mut self) {
        self.blink_timer = self.blink_timer.saturating_sub(1);
        if self.blink_timer == 0 {
            self.lit = !self.lit;
            self.blink_timer = MINE_BLINK_TICKS;
        }
    }

    /// Detonates against `target`; returns whether it went off
    pub fn touch(&mut self, target: &Rect) -> bool {
        if self.active && self.bounds().overlaps(target) {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Shot down by the player
    pub fn destroy(&mut self) -> Explosion {
        self.active = false;
        Explosion::new(self.bounds())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    Missile,
    Shield,
    Life,
}

impl PowerupKind {
    /// Drop table for a destroyed enemy: 2% missile, 3% shield, 1% life
    pub fn roll(r: f32) -> Option<Self> {
        if r < 0.02 {
            Some(PowerupKind::Missile)
        } else if r < 0.05 {
            Some(PowerupKind::Shield)
        } else if r < 0.06 {
            Some(PowerupKind::Life)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Powerup {
    pub kind: PowerupKind,
    pub pos: Vec2,
    pub active: bool,
}

impl Bounded for Powerup {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, POWERUP_SIZE, POWERUP_SIZE)
    }
}

impl Powerup {
    pub fn new(kind: PowerupKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            active: true,
        }
    }

    /// Fall one step; returns the kind when the player catches it
    pub fn update(&mut self, field: &Field, player: &Rect) -> Option<PowerupKind> {
        self.pos.y += POWERUP_FALL;
        if self.pos.y > field.height {
            self.active = false;
            None
        } else if self.bounds().overlaps(player) {
            self.active = false;
            Some(self.kind)
        } else {
            None
        }
    }
}

/// Icon in the life tray; fresh lives fly in from where they were caught
#[derive(Debug, Clone, PartialEq)]
pub struct Life {
    pub pos: Vec2,
    path: Option<PointPath>,
}

impl Life {
    pub fn new(pos: Vec2) -> Self {
        Self { pos, path: None }
    }

    pub fn is_flying(&self) -> bool {
        self.path.is_some()
    }

    pub fn update(&mut self) {
        if let Some(path) = self.path.as_mut() {
            self.pos += path.next();
            if path.is_finished() {
                self.path = None;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Normal,
    Left,
    Right,
    Destroyed,
}

/// Result of damaging the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerHit {
    /// Invulnerable while blinking
    Ignored,
    /// Shield took it
    Absorbed,
    LostLife,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Displacement requested by the last mobile update
    pub vel: Vec2,
    pub lives: Vec<Life>,
    pub missiles: u32,
    pub shielded: bool,
    pub state: PlayerState,
    pub visible: bool,
    blinks: u32,
    blink_ticks: u32,
    immobile: u32,
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

impl Player {
    pub fn new(field: &Field) -> Self {
        Self {
            pos: Self::spawn_point(field),
            size: Vec2::splat(PLAYER_SIZE),
            vel: Vec2::ZERO,
            lives: Vec::new(),
            missiles: 0,
            shielded: false,
            state: PlayerState::Normal,
            visible: true,
            blinks: 0,
            blink_ticks: 0,
            immobile: 0,
        }
    }

    fn spawn_point(field: &Field) -> Vec2 {
        Vec2::new(field.width / 2.0, field.height - PLAYER_SIZE)
    }

    /// Where the life icon with index `i` sits in the tray
    pub fn life_slot(i: usize, field: &Field) -> Vec2 {
        let i = i as f32;
        Vec2::new(
            i * (PLAYER_SIZE / 2.0) + (i + 1.0) * 10.0,
            field.height - (PLAYER_SIZE / 2.0 + 5.0),
        )
    }

    pub fn lives_left(&self) -> usize {
        self.lives.len()
    }

    pub fn is_blinking(&self) -> bool {
        self.blinks > 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == PlayerState::Destroyed
    }

    /// Fresh ship with `lives` lives, blinking while it settles in
    pub fn setup_lives(&mut self, lives: u32, field: &Field) {
        self.pos = Self::spawn_point(field);
        self.state = PlayerState::Normal;
        self.shielded = false;
        self.visible = true;
        self.blink(RESPAWN_BLINKS);
        self.lives = (0..lives as usize)
            .map(|i| Life::new(Self::life_slot(i, field)))
            .collect();
    }

    /// Add a life that flies from `from` into the next tray slot
    pub fn add_life(&mut self, from: Vec2, field: &Field) {
        let slot = Self::life_slot(self.lives.len(), field);
        self.lives.push(Life {
            pos: from,
            path: Some(PointPath::new(vec![from, slot], vec![LIFE_FLIGHT_TICKS], 1.0)),
        });
    }

    /// Raise the shield; returns the bonus for picking one up while shielded
    pub fn shield(&mut self) -> u32 {
        let bonus = if self.shielded { SHIELD_BONUS } else { 0 };
        self.shielded = true;
        bonus
    }

    pub fn blink(&mut self, blinks: u32) {
        self.blinks = blinks;
        self.immobile = BLINK_IMMOBILE_TICKS;
    }

    /// Take `damage`; heavy hits (more than 1) strip the shield first
    pub fn hit(&mut self, damage: i32, field: &Field) -> PlayerHit {
        if self.is_blinking() || self.is_destroyed() {
            return PlayerHit::Ignored;
        }
        if damage > 1 {
            self.shielded = false;
        }
        if self.shielded {
            self.shielded = false;
            return PlayerHit::Absorbed;
        }
        self.lives.pop();
        if self.lives.is_empty() {
            self.state = PlayerState::Destroyed;
            PlayerHit::Destroyed
        } else {
            self.pos = Self::spawn_point(field);
            self.blink(RESPAWN_BLINKS);
            PlayerHit::LostLife
        }
    }

    /// Move and fire for one tick
    ///
    /// `shot_timer` counts ticks since the last shot and is reset when
    /// anything is fired.
    pub fn update(
        &mut self,
        input: &TickInput,
        shot_timer: &mut u32,
        field: &Field,
        out: &mut Vec<PlayerProjectile>,
    ) {
        if self.is_destroyed() {
            return;
        }
        if self.immobile > 0 {
            self.immobile -= 1;
        } else {
            self.steer(input);
            if *shot_timer > PLAYER_SHOT_COOLDOWN {
                if input.fire {
                    *shot_timer = 0;
                    out.push(PlayerProjectile::Shot(Shot::new(
                        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y),
                        PLAYER_SHOT_SPEED,
                    )));
                }
                if input.missile && self.missiles > 0 {
                    *shot_timer = 0;
                    out.push(PlayerProjectile::Missile(Missile::new(self.pos)));
                    self.missiles -= 1;
                }
            }
        }
        self.pos.x = self.pos.x.clamp(0.0, field.width - self.size.x);
        self.pos.y = self.pos.y.clamp(field.boundary, field.height - self.size.y);
        if self.blinks > 0 {
            self.blink_ticks += 1;
            if self.blink_ticks >= BLINK_TICKS {
                self.visible = !self.visible;
                if self.visible {
                    self.blinks -= 1;
                }
                self.blink_ticks = 0;
            }
        }
    }

    fn steer(&mut self, input: &TickInput) {
        if input.left {
            self.vel.x = -PLAYER_SPEED;
            self.state = PlayerState::Left;
        } else if input.right {
            self.vel.x = PLAYER_SPEED;
            self.state = PlayerState::Right;
        } else {
            self.vel.x = 0.0;
            self.state = PlayerState::Normal;
        }
        self.vel.y = if input.up {
            -PLAYER_SPEED
        } else if input.down {
            PLAYER_SPEED
        } else {
            0.0
        };
        self.pos += self.vel;
    }
}
