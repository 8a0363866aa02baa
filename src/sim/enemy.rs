//! Enemy state machine
//!
//! INIT -> HOVER -> ATTACK -> RETURN -> HOVER, driven one tick at a time.
//! The enemy only mutates itself; anything it fires or asks for (ramming the
//! player, reinforcements) is reported back to the caller.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::kinds::{EnemyKind, Mount, Salvo, WanderStyle, Weapon};
use super::path::{
    AttackPath, EntryPath, EntryPattern, Path, PathContext, PointPath, Quarry, return_path,
};
use crate::consts::WANDER_MAX;
use crate::{Bounded, Field, Rect};

/// Monotonic spawn id; parent links and pools refer to enemies by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMode {
    Init,
    Hover,
    Attack,
    Return,
}

/// An enemy flying in formation with a boss, at a fixed offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escort {
    pub id: EnemyId,
    pub offset: Vec2,
}

/// Position and health captured when an editor session starts playing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditSnapshot {
    pub pos: Vec2,
    pub health: i32,
}

/// Editor-only bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditMarks {
    /// Drawn with a selection box
    pub selected: bool,
    /// Marked eligible to attack when the custom level is played
    pub attacker: bool,
    pub snapshot: Option<EditSnapshot>,
}

/// Construction parameters shared by levels, the editor and reinforcements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpec {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub shot_freq: f32,
    pub speed: f32,
    pub entry: Option<EntryPattern>,
    pub parent: Option<EnemyId>,
}

impl EnemySpec {
    /// One cell-sized enemy at `pos` with speed 1 and no entry path
    pub fn new(kind: EnemyKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            pos,
            size,
            shot_freq: 0.0,
            speed: 1.0,
            entry: None,
            parent: None,
        }
    }

    pub fn shot_freq(mut self, freq: f32) -> Self {
        self.shot_freq = freq;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn entry(mut self, entry: EntryPattern) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn parent(mut self, parent: Option<EnemyId>) -> Self {
        self.parent = parent;
        self
    }
}

/// World facts an enemy reads during its update
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext {
    pub field: Field,
    pub player: Rect,
    pub quarry: Quarry,
}

/// What happened to an enemy during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnemyReport {
    /// Finished its entry this tick
    pub arrived: bool,
    /// Touched the player while attacking
    pub rammed: bool,
}

/// Left behind when an enemy is destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wreck {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub score: u32,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub score: u32,
    pub mode: EnemyMode,
    pub speed: f32,
    /// Ticks between shots, fed to the weapon when armed
    pub shot_freq: f32,
    /// Formation link, never owning
    pub parent: Option<EnemyId>,
    pub escorts: Vec<Escort>,
    /// Re-attack as soon as a return leg completes
    pub always_attack: bool,
    pub active: bool,
    /// Formation slot recorded when an attack starts from HOVER
    pub anchor: Vec2,
    pub edit: EditMarks,
    entry: Option<EntryPath>,
    entry_run: Option<PointPath>,
    attack_path: Option<AttackPath>,
    path: Option<Path>,
    weapon: Weapon,
    hover_weapon: Option<Weapon>,
}

impl Bounded for Enemy {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

impl Enemy {
    pub fn new<R: Rng + ?Sized>(id: EnemyId, spec: EnemySpec, field: &Field, rng: &mut R) -> Self {
        let kind = spec.kind;
        let speed = if kind.honors_speed() { spec.speed } else { 1.0 };
        let entry = spec.entry.map(|p| EntryPath::new(p, kind.entry_floor()));
        let entry_run = entry.map(|e| e.instantiate(spec.pos, field, rng));
        let weapon = Weapon::arm(kind, spec.shot_freq, rng);
        let hover_weapon = kind
            .fires_while_hovering()
            .then(|| Weapon::arm(kind, spec.shot_freq, rng));
        Self {
            id,
            kind,
            pos: spec.pos,
            size: spec.size,
            health: kind.health(),
            score: kind.score(),
            mode: EnemyMode::Init,
            speed,
            shot_freq: spec.shot_freq,
            parent: spec.parent,
            escorts: Vec::new(),
            always_attack: false,
            active: true,
            anchor: spec.pos,
            edit: EditMarks::default(),
            entry,
            entry_run,
            attack_path: kind.attack_pattern().map(AttackPath::new),
            path: None,
            weapon,
            hover_weapon,
        }
    }

    /// Copy for the editor: same type, size, health and tuning, fresh state
    ///
    /// Weapons are re-armed and a new entry path is built, so nothing the
    /// copy does can leak back into the original.
    pub fn spawn_copy<R: Rng + ?Sized>(
        &self,
        id: EnemyId,
        pos: Vec2,
        field: &Field,
        rng: &mut R,
    ) -> Enemy {
        let mut spec = EnemySpec::new(self.kind, pos, self.size).shot_freq(self.shot_freq);
        spec.entry = self.entry.map(|e| e.pattern);
        let mut copy = Enemy::new(id, spec, field, rng);
        copy.speed = self.speed;
        copy.health = self.health;
        copy.score = self.score;
        copy
    }

    pub fn entry_pattern(&self) -> Option<EntryPattern> {
        self.entry.map(|e| e.pattern)
    }

    pub fn has_attack_path(&self) -> bool {
        self.attack_path.is_some()
    }

    pub fn attack_path(&self) -> Option<&AttackPath> {
        self.attack_path.as_ref()
    }

    /// Place the enemy at the start of its entry run
    pub fn begin_entry(&mut self) {
        if let Some(start) = self.entry_run.as_ref().and_then(PointPath::start_point) {
            self.pos = start;
        }
    }

    /// Build a new entry run ending at the current position and rewind to INIT
    pub fn restart_entry<R: Rng + ?Sized>(&mut self, field: &Field, rng: &mut R) {
        self.entry_run = self.entry.map(|e| e.instantiate(self.pos, field, rng));
        self.path = None;
        self.mode = EnemyMode::Init;
        self.begin_entry();
    }

    /// Re-derive weapons after the shot frequency changed
    pub fn rearm<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.weapon = Weapon::arm(self.kind, self.shot_freq, rng);
        if self.hover_weapon.is_some() {
            self.hover_weapon = Some(Weapon::arm(self.kind, self.shot_freq, rng));
        }
    }

    /// Start an attack run
    ///
    /// Ignored while attacking or entering, when off the field horizontally,
    /// or when the enemy has no attack path. Returns whether the run began.
    pub fn attack<R: Rng + ?Sized>(&mut self, path: Option<Path>, field: &Field, rng: &mut R) -> bool {
        if matches!(self.mode, EnemyMode::Attack | EnemyMode::Init)
            || self.pos.x < 0.0
            || self.pos.x > field.width
        {
            return false;
        }
        let Some(template) = self.attack_path.as_mut() else {
            return false;
        };
        if self.mode == EnemyMode::Hover {
            self.anchor = self.pos;
        }
        let run = match path {
            Some(p) => p,
            None => template.instantiate(self.pos, self.speed, field, rng),
        };
        self.mode = EnemyMode::Attack;
        self.path = Some(run);
        self.weapon.start_run();
        true
    }

    /// Advance one tick
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        ctx: &EnemyContext,
        rng: &mut R,
        out: &mut Salvo,
    ) -> EnemyReport {
        let mut report = EnemyReport::default();
        match self.mode {
            EnemyMode::Init => {
                let done = match self.entry_run.as_mut() {
                    Some(run) => {
                        self.pos += run.next();
                        run.is_finished()
                    }
                    None => true,
                };
                if done {
                    if let Some(last) = self.entry_run.as_ref().and_then(PointPath::last_point) {
                        self.pos = last;
                    }
                    self.mode = EnemyMode::Hover;
                    report.arrived = true;
                }
            }
            EnemyMode::Hover => {
                if let Some(weapon) = self.hover_weapon.as_mut() {
                    let mount = Mount {
                        bounds: Rect::from_pos_size(self.pos, self.size),
                        field: ctx.field,
                    };
                    weapon.fire(&mount, rng, out);
                }
            }
            EnemyMode::Attack => {
                self.follow_path(ctx);
                report.rammed = self.collides_with(&ctx.player);
                if self.path.as_ref().is_none_or(Path::is_finished) {
                    self.mode = EnemyMode::Return;
                    self.pos.y = 0.0;
                    self.path = Some(Path::Points(return_path(self.pos, self.anchor)));
                }
                let mount = Mount {
                    bounds: self.bounds(),
                    field: ctx.field,
                };
                self.weapon.fire(&mount, rng, out);
            }
            EnemyMode::Return => {
                self.follow_path(ctx);
                if self.path.as_ref().is_none_or(Path::is_finished) {
                    self.mode = EnemyMode::Hover;
                    self.path = None;
                    if self.always_attack {
                        self.attack(None, &ctx.field, rng);
                    }
                }
            }
        }
        report
    }

    fn follow_path(&mut self, ctx: &EnemyContext) {
        let path_ctx = PathContext {
            mover: self.bounds(),
            quarry: ctx.quarry,
            field: ctx.field,
        };
        if let Some(path) = self.path.as_mut() {
            self.pos += path.next(&path_ctx);
        }
    }

    /// Apply one step of the formation wander oscillator
    pub fn wander(&mut self, speed: f32, field: &Field) {
        match self.kind.wander_style() {
            WanderStyle::Formation => {
                if self.mode == EnemyMode::Attack {
                    self.anchor.x += speed;
                } else {
                    self.pos.x += speed;
                }
            }
            WanderStyle::Patrol => {
                let mut v = 0.5 * speed * ((field.width / 2.0 - 20.0) / WANDER_MAX);
                if self.pos.x > field.width - self.size.x || self.pos.x < 0.0 {
                    v = -v;
                }
                self.pos.x += v;
            }
        }
    }

    /// Subtract health; returns the wreck the first time health runs out
    ///
    /// Hits on an already destroyed enemy are ignored.
    pub fn take_hit(&mut self, amount: i32) -> Option<Wreck> {
        if !self.active {
            return None;
        }
        self.health -= amount;
        if self.health > 0 {
            return None;
        }
        self.active = false;
        Some(Wreck {
            id: self.id,
            kind: self.kind,
            score: self.score,
            bounds: self.bounds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ENEMY_CELL_H, ENEMY_CELL_W};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn cell() -> Vec2 {
        Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H)
    }

    fn ctx() -> EnemyContext {
        EnemyContext {
            field: Field::default(),
            player: Rect::new(240.0, 524.0, 36.0, 36.0),
            quarry: Quarry {
                pos: Vec2::new(240.0, 524.0),
                vel: Vec2::ZERO,
            },
        }
    }

    fn hovering(kind: EnemyKind, rng: &mut Pcg32) -> Enemy {
        let spec = EnemySpec::new(kind, Vec2::new(100.0, 80.0), cell()).shot_freq(30.0);
        let mut e = Enemy::new(EnemyId(1), spec, &Field::default(), rng);
        e.mode = EnemyMode::Hover;
        e
    }

    #[test]
    fn test_entry_arrives_on_slot() {
        let mut rng = Pcg32::seed_from_u64(1);
        let slot = Vec2::new(60.0, 100.0);
        let spec = EnemySpec::new(EnemyKind::Drone, slot, cell()).entry(EntryPattern::Vertical);
        let mut e = Enemy::new(EnemyId(1), spec, &Field::default(), &mut rng);
        e.begin_entry();
        assert_eq!(e.pos, Vec2::new(60.0, 100.0 - 560.0));
        let mut out = Salvo::default();
        let mut arrivals = 0;
        for _ in 0..200 {
            if e.update(&ctx(), &mut rng, &mut out).arrived {
                arrivals += 1;
            }
        }
        assert_eq!(arrivals, 1);
        assert_eq!(e.mode, EnemyMode::Hover);
        assert_eq!(e.pos, slot);
    }

    #[test]
    fn test_attack_guards() {
        let mut rng = Pcg32::seed_from_u64(2);
        let field = Field::default();
        let spec = EnemySpec::new(EnemyKind::Drone, Vec2::new(10.0, 10.0), cell());
        let mut entering = Enemy::new(EnemyId(1), spec, &field, &mut rng);
        assert!(!entering.attack(None, &field, &mut rng));

        let mut sentinel = hovering(EnemyKind::Sentinel, &mut rng);
        assert!(!sentinel.attack(None, &field, &mut rng));
        assert_eq!(sentinel.mode, EnemyMode::Hover);

        let mut off_field = hovering(EnemyKind::Drone, &mut rng);
        off_field.pos.x = -1.0;
        assert!(!off_field.attack(None, &field, &mut rng));

        let mut drone = hovering(EnemyKind::Drone, &mut rng);
        assert!(drone.attack(None, &field, &mut rng));
        assert_eq!(drone.anchor, Vec2::new(100.0, 80.0));
        assert!(!drone.attack(None, &field, &mut rng));
    }

    #[test]
    fn test_attack_cycle_returns_to_anchor() {
        let mut rng = Pcg32::seed_from_u64(3);
        let field = Field::default();
        let mut e = hovering(EnemyKind::Gunner, &mut rng);
        let mut c = ctx();
        // Keep the player out of the way
        c.player = Rect::new(-500.0, -500.0, 1.0, 1.0);
        assert!(e.attack(None, &field, &mut rng));
        let mut out = Salvo::default();
        let mut saw_return = false;
        for _ in 0..300 {
            e.update(&c, &mut rng, &mut out);
            saw_return |= e.mode == EnemyMode::Return;
            if saw_return && e.mode == EnemyMode::Hover {
                break;
            }
        }
        assert!(saw_return);
        assert_eq!(e.mode, EnemyMode::Hover);
        assert!((e.pos - Vec2::new(100.0, 80.0)).length() < 1e-2);
        assert!(!out.shots.is_empty());
    }

    #[test]
    fn test_always_attack_reattacks() {
        let mut rng = Pcg32::seed_from_u64(4);
        let field = Field::default();
        let mut e = hovering(EnemyKind::Drone, &mut rng);
        e.always_attack = true;
        e.attack(None, &field, &mut rng);
        let mut c = ctx();
        c.player = Rect::new(-500.0, -500.0, 1.0, 1.0);
        let mut out = Salvo::default();
        let mut returns = 0;
        let mut last = e.mode;
        for _ in 0..600 {
            e.update(&c, &mut rng, &mut out);
            if last == EnemyMode::Return && e.mode != EnemyMode::Return {
                returns += 1;
                assert_eq!(e.mode, EnemyMode::Attack);
            }
            last = e.mode;
        }
        assert!(returns >= 2);
    }

    #[test]
    fn test_rams_player() {
        let mut rng = Pcg32::seed_from_u64(5);
        let field = Field::default();
        let mut e = hovering(EnemyKind::Drone, &mut rng);
        e.attack(None, &field, &mut rng);
        let mut c = ctx();
        c.player = Rect::new(0.0, 0.0, 480.0, 560.0);
        let report = e.update(&c, &mut rng, &mut Salvo::default());
        assert!(report.rammed);
    }

    #[test]
    fn test_take_hit_once() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut e = hovering(EnemyKind::Sentinel, &mut rng);
        assert!(e.take_hit(1).is_none());
        let wreck = e.take_hit(1).expect("second hit destroys");
        assert_eq!(wreck.score, 300);
        assert!(!e.active);
        assert!(e.take_hit(5).is_none());
        assert_eq!(e.health, 0);
    }

    #[test]
    fn test_spawn_copy_is_independent() {
        let mut rng = Pcg32::seed_from_u64(7);
        let field = Field::default();
        let spec = EnemySpec::new(EnemyKind::Twin, Vec2::new(50.0, 50.0), cell())
            .shot_freq(45.0)
            .speed(1.5)
            .entry(EntryPattern::Vertical)
            .parent(Some(EnemyId(99)));
        let source = Enemy::new(EnemyId(1), spec, &field, &mut rng);
        let before = source.clone();
        let mut copy = source.spawn_copy(EnemyId(2), Vec2::new(90.0, 60.0), &field, &mut rng);
        assert_eq!(copy.speed, 1.5);
        assert_eq!(copy.shot_freq, 45.0);
        assert_eq!(copy.parent, None);
        assert_eq!(copy.entry_pattern(), Some(EntryPattern::Vertical));
        copy.begin_entry();
        copy.pos += Vec2::new(5.0, 5.0);
        copy.mode = EnemyMode::Hover;
        copy.attack(None, &field, &mut rng);
        copy.update(&ctx(), &mut rng, &mut Salvo::default());
        assert_eq!(source, before);
    }

    #[test]
    fn test_formation_wander_moves_anchor_while_attacking() {
        let mut rng = Pcg32::seed_from_u64(8);
        let field = Field::default();
        let mut e = hovering(EnemyKind::Drone, &mut rng);
        e.wander(0.2, &field);
        assert!((e.pos.x - 100.2).abs() < 1e-4);
        e.attack(None, &field, &mut rng);
        let x = e.pos.x;
        e.wander(0.2, &field);
        assert_eq!(e.pos.x, x);
        assert!((e.anchor.x - 100.4).abs() < 1e-4);
    }

    #[test]
    fn test_patrol_wander_bounces() {
        let mut rng = Pcg32::seed_from_u64(9);
        let field = Field::default();
        let mut e = hovering(EnemyKind::Sentinel, &mut rng);
        e.wander(0.2, &field);
        assert!((e.pos.x - (100.0 + 0.5 * 0.2 * 22.0)).abs() < 1e-3);
        e.pos.x = 470.0;
        e.wander(0.2, &field);
        assert!(e.pos.x < 470.0);
    }

    #[test]
    fn test_hover_weapon_fires_in_formation() {
        let mut rng = Pcg32::seed_from_u64(10);
        let mut e = hovering(EnemyKind::Sentinel, &mut rng);
        let mut out = Salvo::default();
        for _ in 0..40 {
            e.update(&ctx(), &mut rng, &mut out);
        }
        assert_eq!(out.lasers.len(), 1);
        let mut drone = hovering(EnemyKind::Drone, &mut rng);
        let mut quiet = Salvo::default();
        for _ in 0..40 {
            drone.update(&ctx(), &mut rng, &mut quiet);
        }
        assert!(quiet.is_empty());
    }
}
