//! Game state and world-level operations
//!
//! One explicit context object holds every entity collection, the timers and
//! the RNG. Anything that reaches across entities (damage with its side
//! effects, active-pool replacement, escorts) lives here.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyId, EnemyMode, EnemySpec, Escort};
use super::kinds::{EnemyKind, Salvo};
use super::objects::{
    ENEMY_SHOT_SPEED, EnemyProjectile, Explosion, Laser, Mine, Player, PlayerHit,
    PlayerProjectile, Powerup, PowerupKind, Shot,
};
use super::path::AttackPath;
use super::scheduler::AttackFrequency;
use super::stars::Starfield;
use crate::consts::{ENEMY_CELL_H, ENEMY_CELL_W, GAME_OVER_DELAY, WANDER_MAX, WANDER_MIN, WANDER_SPEED};
use crate::{Bounded, Field};

/// Top-level session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Menu,
    Single,
    /// Reserved; plays like `Single`
    Multi,
    Edit,
}

/// Things that happened during a tick, drained by the session for audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PlayerFired,
    MissileLaunched,
    EnemyFired,
    LaserFired,
    EnemyDestroyed { kind: EnemyKind, score: u32 },
    PlayerHit,
    PlayerDestroyed,
    PowerupCollected(PowerupKind),
    AttackLaunched(EnemyId),
}

/// Formation-wide horizontal oscillator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wander {
    pub offset: f32,
    pub speed: f32,
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            offset: 0.0,
            speed: WANDER_SPEED,
        }
    }
}

impl Wander {
    pub fn step(&mut self) {
        self.offset += self.speed;
        if self.offset > WANDER_MAX || self.offset < WANDER_MIN {
            self.speed = -self.speed;
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub field: Field,
    pub mode: GameMode,
    pub score: u64,
    pub player: Player,
    pub player_shots: Vec<PlayerProjectile>,
    pub enemy_shots: Vec<EnemyProjectile>,
    /// Live enemies in update order
    pub enemies: Vec<Enemy>,
    /// Enemies removed this level; still reachable for ancestor walks
    pub fallen: Vec<Enemy>,
    pub mines: Vec<Mine>,
    pub powerups: Vec<Powerup>,
    pub explosions: Vec<Explosion>,
    pub stars: Starfield,
    /// Attack-eligible enemies; duplicates weight the pick
    pub active_pool: Vec<EnemyId>,
    /// Ticks since the player last fired
    pub shot_timer: u32,
    pub attack_timer: f32,
    pub game_over_timer: i32,
    pub is_over: bool,
    /// `None` between levels; the scheduler then leaves its timer alone
    pub attack_freq: Option<AttackFrequency>,
    pub num_attacks: u32,
    /// Enemies that finished their entry; wander waits for all of them
    pub arrived: usize,
    pub wander: Wander,
    pub events: Vec<GameEvent>,
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        let field = Field::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = Starfield::new(&field, &mut rng);
        Self {
            seed,
            rng,
            field,
            mode: GameMode::Menu,
            score: 0,
            player: Player::new(&field),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            enemies: Vec::new(),
            fallen: Vec::new(),
            mines: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            stars,
            active_pool: Vec::new(),
            shot_timer: 0,
            attack_timer: 0.0,
            game_over_timer: 0,
            is_over: false,
            attack_freq: None,
            num_attacks: 0,
            arrived: 0,
            wander: Wander::default(),
            events: Vec::new(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new enemy id
    pub fn next_entity_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Build an enemy with a fresh id (not yet added to any collection)
    pub fn build_enemy(&mut self, spec: EnemySpec) -> Enemy {
        let id = self.next_entity_id();
        Enemy::new(id, spec, &self.field, &mut self.rng)
    }

    /// Build an enemy and append it to the live collection
    pub fn spawn_enemy(&mut self, spec: EnemySpec) -> EnemyId {
        let enemy = self.build_enemy(spec);
        let id = enemy.id;
        self.enemies.push(enemy);
        id
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Live or fallen enemy by id
    pub fn lookup(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemy(id)
            .or_else(|| self.fallen.iter().find(|e| e.id == id))
    }

    fn index_of(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    /// Reset every per-level collection and counter
    pub fn clear_entities(&mut self) {
        self.mines.clear();
        self.enemies.clear();
        self.fallen.clear();
        self.active_pool.clear();
        self.player_shots.clear();
        self.enemy_shots.clear();
        self.num_attacks = 0;
        self.arrived = 0;
    }

    /// Move inactive enemies out of the live collection
    pub fn retire_inactive(&mut self) {
        if self.enemies.iter().all(|e| e.active) {
            return;
        }
        let (live, dead): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.enemies).into_iter().partition(|e| e.active);
        self.enemies = live;
        self.fallen.extend(dead);
    }

    /// Damage an enemy, applying everything a kill entails
    ///
    /// A kill rolls the powerup drop, adds the score, leaves an explosion the
    /// size of the enemy and refills the attack pool from its ancestors.
    /// Returns whether the enemy was destroyed by this hit.
    pub fn damage_enemy(&mut self, id: EnemyId, amount: i32) -> bool {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let Some(wreck) = enemy.take_hit(amount) else {
            return false;
        };
        self.events.push(GameEvent::EnemyDestroyed {
            kind: wreck.kind,
            score: wreck.score,
        });
        if let Some(kind) = PowerupKind::roll(self.rng.random::<f32>()) {
            self.powerups.push(Powerup::new(kind, wreck.bounds.pos));
        }
        self.score += u64::from(wreck.score);
        self.explosions.push(Explosion::new(wreck.bounds));
        self.replace_in_pool(id);
        true
    }

    /// Substitute the nearest eligible ancestor for a removed pool member
    ///
    /// Every copy of `id` leaves the pool. The parent chain is then walked,
    /// skipping inactive or already pooled ancestors, and the first eligible
    /// one is added. Cycles and dead ends leave the pool as it is.
    pub fn replace_in_pool(&mut self, id: EnemyId) {
        if !self.active_pool.contains(&id) {
            return;
        }
        self.active_pool.retain(|&p| p != id);
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            if !seen.insert(cid) {
                return;
            }
            let Some(enemy) = self.lookup(cid) else {
                return;
            };
            if enemy.active && !self.active_pool.contains(&cid) {
                log::debug!("Pool: {:?} replaced by ancestor {:?}", id, cid);
                self.active_pool.push(cid);
                return;
            }
            current = enemy.parent;
        }
    }

    /// Damage the player; returns what the hit did
    pub fn hurt_player(&mut self, damage: i32) -> PlayerHit {
        let before = self.player.bounds();
        let hit = self.player.hit(damage, &self.field);
        match hit {
            PlayerHit::Ignored | PlayerHit::Absorbed => {}
            PlayerHit::LostLife => {
                self.explosions.push(Explosion::new(before));
                self.events.push(GameEvent::PlayerHit);
            }
            PlayerHit::Destroyed => {
                self.explosions.push(Explosion::new(before));
                self.events.push(GameEvent::PlayerDestroyed);
                self.is_over = true;
                self.game_over_timer = GAME_OVER_DELAY;
                log::info!("Player destroyed, score {}", self.score);
            }
        }
        hit
    }

    /// Order an enemy to attack; escorts follow along
    pub fn command_attack(&mut self, id: EnemyId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let field = self.field;
        let started = self.enemies[idx].attack(None, &field, &mut self.rng);
        if started {
            self.events.push(GameEvent::AttackLaunched(id));
            self.notify_escorts(idx);
        }
        started
    }

    /// Record offsets of `escorts` relative to `boss` as they stand now
    pub fn bind_escorts(&mut self, boss: EnemyId, escorts: &[EnemyId]) {
        let Some(boss_pos) = self.enemy(boss).map(|b| b.pos) else {
            return;
        };
        let bound: Vec<Escort> = escorts
            .iter()
            .filter_map(|&id| {
                self.enemy(id).map(|e| Escort {
                    id,
                    offset: e.pos - boss_pos,
                })
            })
            .collect();
        if let Some(b) = self.enemy_mut(boss) {
            b.escorts = bound;
        }
    }

    /// Drive escorts of the enemy at `boss_idx`
    ///
    /// Each live escort is ordered to attack along a copy of the boss's run,
    /// and escorts already attacking are pinned to their offset from the
    /// boss. Dead escorts are dropped from the list.
    pub fn notify_escorts(&mut self, boss_idx: usize) {
        let boss = &self.enemies[boss_idx];
        if boss.escorts.is_empty() {
            return;
        }
        let boss_pos = boss.pos;
        let blueprint: Option<AttackPath> = boss.attack_path().cloned();
        let escorts = boss.escorts.clone();
        let field = self.field;
        let mut live = Vec::with_capacity(escorts.len());
        for escort in escorts {
            let Some(e) = self
                .enemies
                .iter_mut()
                .find(|e| e.id == escort.id && e.active)
            else {
                continue;
            };
            let path = blueprint.as_ref().and_then(AttackPath::clone_for_escort);
            e.attack(path, &field, &mut self.rng);
            if e.mode == EnemyMode::Attack {
                e.pos = boss_pos + escort.offset;
            }
            live.push(escort);
        }
        self.enemies[boss_idx].escorts = live;
    }

    /// Turn what enemies fired this tick into live entities
    pub fn absorb_salvo(&mut self, salvo: Salvo) {
        for pos in salvo.shots {
            self.enemy_shots
                .push(EnemyProjectile::Shot(Shot::new(pos, ENEMY_SHOT_SPEED)));
            self.events.push(GameEvent::EnemyFired);
        }
        for laser in salvo.lasers {
            self.enemy_shots.push(EnemyProjectile::Laser(Laser::new(
                laser.origin,
                laser.width,
                &self.field,
            )));
            self.events.push(GameEvent::LaserFired);
        }
        self.mines.extend(salvo.mines.into_iter().map(Mine::new));
        let cell = Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H);
        for r in salvo.reinforcements {
            let mut enemy =
                self.build_enemy(EnemySpec::new(r.kind, r.pos, cell).shot_freq(r.shot_freq));
            enemy.mode = EnemyMode::Hover;
            enemy.always_attack = true;
            self.arrived += 1;
            enemy.attack(None, &self.field, &mut self.rng);
            self.enemies.push(enemy);
        }
    }

    /// Apply a caught powerup
    pub fn collect_powerup(&mut self, kind: PowerupKind, at: Vec2) {
        match kind {
            PowerupKind::Missile => self.player.missiles += 1,
            PowerupKind::Shield => self.score += u64::from(self.player.shield()),
            PowerupKind::Life => self.player.add_life(at, &self.field),
        }
        self.events.push(GameEvent::PowerupCollected(kind));
    }

    /// Whether every live enemy has finished entering
    pub fn formation_settled(&self) -> bool {
        self.arrived >= self.enemies.len()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
