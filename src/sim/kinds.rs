//! Per-type enemy behavior table
//!
//! Every enemy type maps to a fixed profile (score, health, attack pattern,
//! wander style) and a weapon state machine armed from its shot frequency.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::path::AttackPattern;
use crate::consts::{ENEMY_CELL_H, ENEMY_CELL_W};
use crate::{Field, Rect};

/// Enemy types, tagged 1 through 9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    Drone,
    Gunner,
    Twin,
    Hunter,
    Carrier,
    Sentinel,
    MineLayer,
    Dreadnought,
    Mothership,
}

/// How an enemy reacts to the formation wander oscillator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WanderStyle {
    /// Drift with the formation
    Formation,
    /// Swing across the whole field, bouncing off the walls
    Patrol,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 9] = [
        EnemyKind::Drone,
        EnemyKind::Gunner,
        EnemyKind::Twin,
        EnemyKind::Hunter,
        EnemyKind::Carrier,
        EnemyKind::Sentinel,
        EnemyKind::MineLayer,
        EnemyKind::Dreadnought,
        EnemyKind::Mothership,
    ];

    /// Types offered by the editor palette
    pub const PALETTE: [EnemyKind; 8] = [
        EnemyKind::Drone,
        EnemyKind::Gunner,
        EnemyKind::Twin,
        EnemyKind::Hunter,
        EnemyKind::Carrier,
        EnemyKind::Sentinel,
        EnemyKind::MineLayer,
        EnemyKind::Dreadnought,
    ];

    /// Pool a mothership draws small reinforcements from
    pub const SMALL_FRY: [EnemyKind; 3] = [EnemyKind::Drone, EnemyKind::Gunner, EnemyKind::Twin];

    pub fn tag(self) -> u8 {
        match self {
            EnemyKind::Drone => 1,
            EnemyKind::Gunner => 2,
            EnemyKind::Twin => 3,
            EnemyKind::Hunter => 4,
            EnemyKind::Carrier => 5,
            EnemyKind::Sentinel => 6,
            EnemyKind::MineLayer => 7,
            EnemyKind::Dreadnought => 8,
            EnemyKind::Mothership => 9,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Points awarded on destruction
    pub fn score(self) -> u32 {
        match self {
            EnemyKind::Drone => 10,
            EnemyKind::Gunner => 20,
            EnemyKind::Twin => 50,
            EnemyKind::Hunter => 100,
            EnemyKind::Carrier => 250,
            EnemyKind::Sentinel => 300,
            EnemyKind::MineLayer => 200,
            EnemyKind::Dreadnought => 400,
            EnemyKind::Mothership => 2000,
        }
    }

    pub fn health(self) -> i32 {
        match self {
            EnemyKind::Drone | EnemyKind::Gunner | EnemyKind::Twin | EnemyKind::Hunter => 1,
            EnemyKind::Carrier => 3,
            EnemyKind::Sentinel | EnemyKind::MineLayer => 2,
            EnemyKind::Dreadnought => 5,
            EnemyKind::Mothership => 20,
        }
    }

    /// `None` for types that never leave the formation
    pub fn attack_pattern(self) -> Option<AttackPattern> {
        match self {
            EnemyKind::Drone | EnemyKind::Gunner | EnemyKind::Twin | EnemyKind::Dreadnought => {
                Some(AttackPattern::Standard)
            }
            EnemyKind::Hunter => Some(AttackPattern::Pursuit),
            EnemyKind::Carrier => Some(AttackPattern::Sweep),
            EnemyKind::MineLayer => Some(AttackPattern::Evasion),
            EnemyKind::Sentinel | EnemyKind::Mothership => None,
        }
    }

    /// Whether a per-instance speed is honored at construction (others fly at 1)
    pub fn honors_speed(self) -> bool {
        matches!(
            self,
            EnemyKind::Drone | EnemyKind::Gunner | EnemyKind::Twin | EnemyKind::MineLayer
        )
    }

    /// Types that keep firing while hovering in formation
    pub fn fires_while_hovering(self) -> bool {
        matches!(self, EnemyKind::Sentinel | EnemyKind::Mothership)
    }

    /// Extra ticks added to the randomized entry duration
    pub fn entry_floor(self) -> f32 {
        match self {
            EnemyKind::Mothership => 30.0,
            _ => 0.0,
        }
    }

    pub fn wander_style(self) -> WanderStyle {
        match self {
            EnemyKind::Sentinel => WanderStyle::Patrol,
            _ => WanderStyle::Formation,
        }
    }

    /// Natural sprite size in enemy cells
    pub fn sprite_size(self) -> Vec2 {
        let cell = Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H);
        match self {
            EnemyKind::Carrier => cell * 2.0,
            EnemyKind::Dreadnought => Vec2::new(cell.x * 3.0, cell.y),
            EnemyKind::Mothership => cell * 3.0,
            _ => cell,
        }
    }
}

/// A laser column requested by a weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSpec {
    pub origin: Vec2,
    pub width: f32,
}

/// An enemy a weapon asks to be spawned next to its owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reinforcement {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub shot_freq: f32,
}

/// Everything a weapon produced this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Salvo {
    pub shots: Vec<Vec2>,
    pub lasers: Vec<LaserSpec>,
    pub mines: Vec<Vec2>,
    pub reinforcements: Vec<Reinforcement>,
}

impl Salvo {
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
            && self.lasers.is_empty()
            && self.mines.is_empty()
            && self.reinforcements.is_empty()
    }
}

/// Where a weapon is mounted this tick
#[derive(Debug, Clone, Copy)]
pub struct Mount {
    pub bounds: Rect,
    pub field: Field,
}

/// Alternating left/right cannon
#[derive(Debug, Clone, PartialEq)]
pub struct TwinCannon {
    timer: f32,
    freq: f32,
    left: bool,
}

impl TwinCannon {
    fn new(freq: f32) -> Self {
        Self {
            timer: freq,
            freq,
            left: true,
        }
    }

    fn fire<R: Rng + ?Sized>(&mut self, mount: &Mount, rng: &mut R, out: &mut Salvo) {
        self.timer -= 1.0;
        if self.timer <= 0.0 {
            let b = mount.bounds;
            let divisor = if self.left { 4.0 } else { 1.75 };
            out.shots
                .push(Vec2::new(b.pos.x + b.size.x / divisor, b.bottom()));
            self.left = !self.left;
            self.timer = self.freq / 2.0 + rng.random::<f32>() * (self.freq / 2.0);
        }
    }
}

/// Weapon state machine; one variant per armed enemy type
#[derive(Debug, Clone, PartialEq)]
pub enum Weapon {
    Unarmed,
    /// Single shot from the bottom center
    Gunner { timer: f32, freq: f32 },
    Twin(TwinCannon),
    /// Two shots at once
    Hunter { timer: f32, freq: f32 },
    /// Twin cannon plus a slow laser
    Carrier {
        cannon: TwinCannon,
        laser_timer: f32,
        freq: f32,
    },
    Sentinel { laser_timer: f32, freq: f32 },
    /// One mine per attack run, only below the boundary
    MineLayer { timer: f32, freq: f32, spent: bool },
    /// Six gun battery with an occasional full volley
    Dreadnought { timer: f32, freq: f32 },
    /// Launches reinforcements or a wide laser
    Mothership { timer: f32, freq: f32 },
}

impl Weapon {
    /// Fresh weapon for `kind` firing roughly every `freq` ticks
    pub fn arm<R: Rng + ?Sized>(kind: EnemyKind, freq: f32, rng: &mut R) -> Self {
        match kind {
            EnemyKind::Drone => Weapon::Unarmed,
            EnemyKind::Gunner => Weapon::Gunner {
                timer: rng.random::<f32>() * freq,
                freq,
            },
            EnemyKind::Twin => Weapon::Twin(TwinCannon::new(freq)),
            EnemyKind::Hunter => Weapon::Hunter {
                timer: rng.random::<f32>() * freq,
                freq,
            },
            EnemyKind::Carrier => Weapon::Carrier {
                cannon: TwinCannon::new(freq),
                laser_timer: freq,
                freq,
            },
            EnemyKind::Sentinel => Weapon::Sentinel {
                laser_timer: freq,
                freq,
            },
            EnemyKind::MineLayer => Weapon::MineLayer {
                timer: rng.random::<f32>() * freq,
                freq,
                spent: false,
            },
            EnemyKind::Dreadnought => Weapon::Dreadnought {
                timer: freq / 5.0,
                freq,
            },
            EnemyKind::Mothership => Weapon::Mothership { timer: freq, freq },
        }
    }

    /// Called when the owner starts a new attack run
    pub fn start_run(&mut self) {
        if let Weapon::MineLayer { spent, .. } = self {
            *spent = false;
        }
    }

    /// Advance one tick, appending anything fired to `out`
    pub fn fire<R: Rng + ?Sized>(&mut self, mount: &Mount, rng: &mut R, out: &mut Salvo) {
        let b = mount.bounds;
        match self {
            Weapon::Unarmed => {}
            Weapon::Gunner { timer, freq } => {
                *timer -= 1.0;
                if *timer <= 0.0 {
                    out.shots.push(Vec2::new(b.pos.x + b.size.x / 2.0, b.bottom()));
                    *timer = *freq / 2.0 + rng.random::<f32>() * (*freq / 2.0);
                }
            }
            Weapon::Twin(cannon) => cannon.fire(mount, rng, out),
            Weapon::Hunter { timer, freq } => {
                *timer -= 1.0;
                if *timer <= 0.0 {
                    out.shots.push(Vec2::new(b.pos.x + b.size.x / 4.0, b.bottom()));
                    out.shots.push(Vec2::new(b.pos.x + b.size.x / 1.75, b.bottom()));
                    *timer = rng.random::<f32>() * *freq;
                }
            }
            Weapon::Carrier {
                cannon,
                laser_timer,
                freq,
            } => {
                cannon.fire(mount, rng, out);
                *laser_timer -= 1.0;
                if *laser_timer < 0.0 {
                    out.lasers.push(LaserSpec {
                        origin: Vec2::new(b.pos.x + b.size.x / 2.0, b.bottom() - 5.0),
                        width: 3.0,
                    });
                    *laser_timer = rng.random::<f32>() * *freq * 3.0 + *freq;
                }
            }
            Weapon::Sentinel { laser_timer, freq } => {
                *laser_timer -= 1.0;
                if *laser_timer < 0.0 {
                    out.lasers.push(LaserSpec {
                        origin: Vec2::new(b.pos.x + b.size.x / 2.0, b.bottom() - 5.0),
                        width: 3.0,
                    });
                    *laser_timer = rng.random::<f32>() * *freq + *freq;
                }
            }
            Weapon::MineLayer { timer, freq, spent } => {
                let in_lane = b.pos.y > mount.field.boundary
                    && b.pos.x > 0.0
                    && b.pos.x < mount.field.width;
                if in_lane && !*spent {
                    *timer -= 1.0;
                    if *timer <= 0.0 {
                        out.mines.push(b.pos);
                        *spent = true;
                        *timer = rng.random::<f32>() * *freq;
                    }
                }
            }
            Weapon::Dreadnought { timer, freq } => {
                *timer -= 1.0;
                if *timer <= 0.0 {
                    let roll = rng.random::<f32>();
                    let y = b.bottom() - 5.0;
                    if roll < 0.2 {
                        for gun in 1..6 {
                            out.shots
                                .push(Vec2::new(b.pos.x + gun as f32 * b.size.x / 6.0, y));
                        }
                    } else {
                        let gun = (roll * 6.0).floor();
                        out.shots.push(Vec2::new(b.pos.x + gun * b.size.x / 6.0, y));
                    }
                    *timer = *freq / 5.0 + roll;
                }
            }
            Weapon::Mothership { timer, freq } => {
                *timer -= 1.0;
                if *timer > 0.0 {
                    return;
                }
                *timer = *freq / 2.0 + rng.random::<f32>() * (*freq / 2.0);
                let cell = Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H);
                let roll = rng.random::<f32>();
                if roll < 0.3 {
                    for pos in [
                        Vec2::new(b.pos.x - cell.x, b.pos.y + 10.0),
                        Vec2::new(b.right(), b.pos.y + 10.0),
                    ] {
                        out.reinforcements.push(Reinforcement {
                            kind: EnemyKind::Hunter,
                            pos,
                            shot_freq: 50.0,
                        });
                    }
                } else if roll < 0.8 {
                    for pos in [
                        Vec2::new(b.pos.x + 10.0, b.bottom()),
                        Vec2::new(b.right() - (10.0 + cell.x), b.bottom()),
                    ] {
                        let pick = rng.random_range(0..EnemyKind::SMALL_FRY.len());
                        out.reinforcements.push(Reinforcement {
                            kind: EnemyKind::SMALL_FRY[pick],
                            pos,
                            shot_freq: 30.0,
                        });
                    }
                } else {
                    out.lasers.push(LaserSpec {
                        origin: Vec2::new(b.pos.x + b.size.x / 2.0 - 3.0, b.bottom() - 40.0),
                        width: 5.0,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn mount(x: f32, y: f32, kind: EnemyKind) -> Mount {
        let size = kind.sprite_size();
        Mount {
            bounds: Rect::new(x, y, size.x, size.y),
            field: Field::default(),
        }
    }

    fn run(weapon: &mut Weapon, m: &Mount, ticks: usize, rng: &mut Pcg32) -> Salvo {
        let mut out = Salvo::default();
        for _ in 0..ticks {
            weapon.fire(m, rng, &mut out);
        }
        out
    }

    #[test]
    fn test_tags_round_trip() {
        for kind in EnemyKind::ALL {
            assert_eq!(EnemyKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EnemyKind::from_tag(0), None);
        assert_eq!(EnemyKind::from_tag(10), None);
    }

    #[test]
    fn test_profiles() {
        assert_eq!(EnemyKind::Mothership.score(), 2000);
        assert_eq!(EnemyKind::Mothership.health(), 20);
        assert_eq!(EnemyKind::Carrier.sprite_size(), Vec2::new(72.0, 48.0));
        assert_eq!(EnemyKind::Dreadnought.sprite_size(), Vec2::new(108.0, 24.0));
        assert!(EnemyKind::Sentinel.attack_pattern().is_none());
        assert_eq!(EnemyKind::Hunter.attack_pattern(), Some(AttackPattern::Pursuit));
        assert_eq!(EnemyKind::Mothership.entry_floor(), 30.0);
    }

    #[test]
    fn test_drone_never_fires() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::arm(EnemyKind::Drone, 30.0, &mut rng);
        let out = run(&mut w, &mount(10.0, 10.0, EnemyKind::Drone), 200, &mut rng);
        assert!(out.is_empty());
    }

    #[test]
    fn test_twin_alternates_guns() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut w = Weapon::arm(EnemyKind::Twin, 10.0, &mut rng);
        let m = mount(100.0, 50.0, EnemyKind::Twin);
        let out = run(&mut w, &m, 10, &mut rng);
        assert_eq!(out.shots, vec![Vec2::new(109.0, 74.0)]);
        let out = run(&mut w, &m, 10, &mut rng);
        assert_eq!(out.shots.len(), 1);
        assert!((out.shots[0].x - (100.0 + 36.0 / 1.75)).abs() < 1e-4);
    }

    #[test]
    fn test_hunter_fires_pairs() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut w = Weapon::arm(EnemyKind::Hunter, 20.0, &mut rng);
        let out = run(&mut w, &mount(0.0, 0.0, EnemyKind::Hunter), 100, &mut rng);
        assert!(!out.shots.is_empty());
        assert_eq!(out.shots.len() % 2, 0);
    }

    #[test]
    fn test_sentinel_laser_after_freq() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut w = Weapon::arm(EnemyKind::Sentinel, 5.0, &mut rng);
        let m = mount(200.0, 40.0, EnemyKind::Sentinel);
        let out = run(&mut w, &m, 5, &mut rng);
        assert!(out.lasers.is_empty());
        let out = run(&mut w, &m, 1, &mut rng);
        assert_eq!(out.lasers.len(), 1);
        assert_eq!(out.lasers[0].width, 3.0);
        assert_eq!(out.lasers[0].origin, Vec2::new(218.0, 59.0));
    }

    #[test]
    fn test_mine_layer_one_mine_per_run() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = Weapon::arm(EnemyKind::MineLayer, 4.0, &mut rng);
        let above = mount(100.0, 100.0, EnemyKind::MineLayer);
        assert!(run(&mut w, &above, 50, &mut rng).mines.is_empty());
        let below = mount(100.0, 400.0, EnemyKind::MineLayer);
        let out = run(&mut w, &below, 50, &mut rng);
        assert_eq!(out.mines, vec![Vec2::new(100.0, 400.0)]);
        w.start_run();
        let out = run(&mut w, &below, 50, &mut rng);
        assert_eq!(out.mines.len(), 1);
    }

    #[test]
    fn test_mine_layer_needs_field_lane() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = Weapon::arm(EnemyKind::MineLayer, 1.0, &mut rng);
        let outside = mount(-10.0, 400.0, EnemyKind::MineLayer);
        assert!(run(&mut w, &outside, 20, &mut rng).mines.is_empty());
    }

    #[test]
    fn test_dreadnought_guns_along_hull() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut w = Weapon::arm(EnemyKind::Dreadnought, 10.0, &mut rng);
        let m = mount(0.0, 0.0, EnemyKind::Dreadnought);
        let out = run(&mut w, &m, 400, &mut rng);
        assert!(!out.shots.is_empty());
        for shot in &out.shots {
            assert_eq!(shot.y, 19.0);
            assert!(shot.x >= 0.0 && shot.x < 108.0);
        }
    }

    #[test]
    fn test_mothership_launches_pairs() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut w = Weapon::arm(EnemyKind::Mothership, 6.0, &mut rng);
        let m = mount(100.0, 40.0, EnemyKind::Mothership);
        let out = run(&mut w, &m, 600, &mut rng);
        assert!(!out.reinforcements.is_empty());
        assert_eq!(out.reinforcements.len() % 2, 0);
        for r in &out.reinforcements {
            match r.kind {
                EnemyKind::Hunter => assert_eq!(r.shot_freq, 50.0),
                k => {
                    assert!(EnemyKind::SMALL_FRY.contains(&k));
                    assert_eq!(r.shot_freq, 30.0);
                }
            }
        }
        assert!(out.lasers.iter().all(|l| l.width == 5.0));
    }
}
