//! Level catalog
//!
//! Each level is a declarative load procedure over a [`LevelBuilder`]: a
//! grid of enemy rows, optional bosses and escorts, carved-out squares and
//! the list of enemies the attack scheduler may pick.

use glam::Vec2;

use super::enemy::{EnemyId, EnemySpec};
use super::kinds::EnemyKind;
use super::path::EntryPattern;
use super::scheduler::AttackFrequency;
use super::state::GameState;
use crate::consts::{ENEMY_CELL_H, ENEMY_CELL_W, GRID_COLUMNS};

use EnemyKind::{Carrier, Dreadnought, Drone, Gunner, Hunter, MineLayer, Mothership, Sentinel, Twin};
use EntryPattern::{Horizontal, Scatter, Vertical};

/// Left edge of the first grid column
pub const INIT_X: f32 = ENEMY_CELL_W / 1.5;
/// Top row of the formation area
pub const TOP_Y: f32 = 40.0;
/// Vertical grid spacing
pub const Y_DIFF: f32 = ENEMY_CELL_H * 1.6;

/// Levels grouped into worlds, played in order
pub const WORLDS: [&[Level]; 5] = [
    &[LEVEL_1, LEVEL_2, LEVEL_3, LEVEL_4],
    &[LEVEL_5, LEVEL_6, LEVEL_7, LEVEL_8],
    &[LEVEL_9, LEVEL_10, LEVEL_11, LEVEL_12],
    &[LEVEL_13, LEVEL_14, LEVEL_15, LEVEL_16],
    &[LEVEL_17],
];

/// One grid row: every column gets the same type and tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub kind: EnemyKind,
    pub shot_freq: f32,
    pub speed: f32,
}

const fn row(kind: EnemyKind, shot_freq: f32, speed: f32) -> Row {
    Row {
        kind,
        shot_freq,
        speed,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Level {
    pub freq: AttackFrequency,
    load: fn(&mut LevelBuilder<'_>),
}

impl Level {
    /// Replace the world's enemies with this level's roster
    pub fn load(&self, state: &mut GameState) {
        state.clear_entities();
        state.attack_freq = Some(self.freq);
        state.attack_timer = self.freq.ticks(0, 0);
        let mut builder = LevelBuilder::new(state);
        (self.load)(&mut builder);
    }
}

/// Look up a campaign level by world and level index
pub fn level(world: usize, level: usize) -> Option<&'static Level> {
    WORLDS.get(world).and_then(|w| w.get(level))
}

/// Position after (`world`, `level`), or `None` once the campaign is over
pub fn next(world: usize, level: usize) -> Option<(usize, usize)> {
    let len = WORLDS.get(world)?.len();
    if level + 1 < len {
        Some((world, level + 1))
    } else if world + 1 < WORLDS.len() {
        Some((world + 1, 0))
    } else {
        None
    }
}

/// Wrap the editor roster as a playable level
///
/// The roster stays as authored; only the attack policy and the pool of
/// marked attackers (those with an attack path) are set.
pub fn load_custom(state: &mut GameState, interval_secs: f32, attackers: &[EnemyId]) {
    state.attack_freq = Some(AttackFrequency::EditorInterval {
        secs: interval_secs,
    });
    state.active_pool = attackers
        .iter()
        .copied()
        .filter(|&id| state.enemy(id).is_some_and(|e| e.has_attack_path()))
        .collect();
    state.num_attacks = 0;
    state.arrived = 0;
    state.attack_timer = AttackFrequency::EditorInterval {
        secs: interval_secs,
    }
    .ticks(state.enemies.len(), 0);
}

/// Builds one level's roster inside the world
pub struct LevelBuilder<'a> {
    state: &'a mut GameState,
    grid: Vec<EnemyId>,
    /// Horizontal grid spacing
    pub xd: f32,
    /// Center line of the field
    pub mid: f32,
}

impl<'a> LevelBuilder<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        let xd = (state.field.width - ENEMY_CELL_W) / GRID_COLUMNS as f32;
        let mid = state.field.width / 2.0;
        Self {
            state,
            grid: Vec::new(),
            xd,
            mid,
        }
    }

    fn cell() -> Vec2 {
        Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H)
    }

    /// Lay out rows top-down starting at `y0`; each enemy below the first
    /// row is parented to the one above it
    pub fn grid(&mut self, rows: &[Row], y0: f32, entry: EntryPattern) {
        let mut y = y0;
        for (i, r) in rows.iter().enumerate() {
            let mut x = INIT_X;
            for j in 0..GRID_COLUMNS {
                let parent = (i > 0).then(|| self.grid[(i - 1) * GRID_COLUMNS + j]);
                let spec = EnemySpec::new(r.kind, Vec2::new(x, y), Self::cell())
                    .shot_freq(r.shot_freq)
                    .speed(r.speed)
                    .entry(entry)
                    .parent(parent);
                let id = self.state.spawn_enemy(spec);
                self.grid.push(id);
                x += self.xd;
            }
            y += Y_DIFF;
        }
    }

    /// Single enemy outside the grid, `cells` grid steps wide and tall
    /// beyond the canonical cell
    pub fn extra(
        &mut self,
        kind: EnemyKind,
        pos: Vec2,
        cells: Vec2,
        shot_freq: f32,
        entry: EntryPattern,
    ) -> EnemyId {
        let size = Self::cell() + Vec2::new(cells.x * self.xd, cells.y * Y_DIFF);
        self.state
            .spawn_enemy(EnemySpec::new(kind, pos, size).shot_freq(shot_freq).entry(entry))
    }

    /// Grid enemy by row-major index
    pub fn at(&self, i: usize) -> EnemyId {
        self.grid[i]
    }

    pub fn range(&self, from: usize, to: usize) -> Vec<EnemyId> {
        self.grid[from..to].to_vec()
    }

    /// The last `n` grid enemies
    pub fn last(&self, n: usize) -> Vec<EnemyId> {
        self.grid[self.grid.len() - n..].to_vec()
    }

    pub fn all(&self) -> Vec<EnemyId> {
        self.grid.clone()
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn escorts(&mut self, boss: EnemyId, escorts: &[EnemyId]) {
        self.state.bind_escorts(boss, escorts);
    }

    /// Make `child` a formation member of `parent`
    pub fn adopt(&mut self, parent: EnemyId, child: EnemyId) {
        if let Some(c) = self.state.enemy_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Deactivate a `w` x `h` block of the grid at column `x`, row `y`
    pub fn remove_square(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for i in y..y + h {
            for j in x..x + w {
                let Some(&id) = self.grid.get(i * GRID_COLUMNS + j) else {
                    continue;
                };
                if let Some(e) = self.state.enemy_mut(id) {
                    e.active = false;
                }
            }
        }
    }

    /// Put `front` ahead of the grid, start every entry run and set the pool
    pub fn finish(&mut self, front: &[EnemyId], pool: Vec<EnemyId>) {
        let all = std::mem::take(&mut self.state.enemies);
        let (mut leading, rest): (Vec<_>, Vec<_>) =
            all.into_iter().partition(|e| front.contains(&e.id));
        leading.sort_by_key(|e| front.iter().position(|&f| f == e.id));
        leading.extend(rest);
        for e in leading.iter_mut() {
            e.begin_entry();
        }
        self.state.enemies = leading;
        self.state.active_pool = pool;
        log::info!(
            "Level loaded: {} enemies, {} in attack pool",
            self.state.enemies.len(),
            self.state.active_pool.len()
        );
    }
}

fn repeat(ids: &[EnemyId], times: usize) -> Vec<EnemyId> {
    ids.iter()
        .flat_map(|&id| std::iter::repeat_n(id, times))
        .collect()
}

pub const LEVEL_1: Level = Level {
    freq: AttackFrequency::Linear {
        base: 60.0,
        per_enemy: 1.0,
    },
    load: |b| {
        let y0 = TOP_Y + Y_DIFF;
        b.grid(
            &[
                row(Twin, 20.0, 1.0),
                row(Gunner, 50.0, 1.0),
                row(Gunner, 50.0, 1.0),
                row(Drone, 0.0, 1.0),
                row(Drone, 0.0, 1.0),
            ],
            y0,
            Vertical,
        );
        let h = b.extra(Hunter, Vec2::new(INIT_X + b.xd * 3.0, y0 - Y_DIFF), Vec2::ZERO, 30.0, Vertical);
        b.adopt(h, b.at(3));
        let pool = b.all();
        b.finish(&[h], pool);
    },
};

/// Hunters over columns 1 and 6, each adopting the enemy below it
fn flank_hunters(b: &mut LevelBuilder<'_>, y0: f32) -> [EnemyId; 2] {
    let h1 = b.extra(Hunter, Vec2::new(INIT_X + b.xd, y0 - Y_DIFF), Vec2::ZERO, 30.0, Vertical);
    b.adopt(h1, b.at(1));
    let h2 = b.extra(Hunter, Vec2::new(INIT_X + b.xd * 6.0, y0 - Y_DIFF), Vec2::ZERO, 30.0, Vertical);
    b.adopt(h2, b.at(6));
    [h1, h2]
}

pub const LEVEL_2: Level = Level {
    freq: AttackFrequency::Linear {
        base: 40.0,
        per_enemy: 1.0,
    },
    load: |b| {
        let y0 = TOP_Y + Y_DIFF;
        b.grid(
            &[
                row(Twin, 20.0, 1.0),
                row(Twin, 20.0, 1.0),
                row(Gunner, 40.0, 1.0),
                row(Gunner, 50.0, 1.0),
                row(Drone, 0.0, 1.0),
            ],
            y0,
            Vertical,
        );
        let hunters = flank_hunters(b, y0);
        let pool = b.last(GRID_COLUMNS);
        b.finish(&hunters, pool);
    },
};

pub const LEVEL_3: Level = Level {
    freq: AttackFrequency::Linear {
        base: 0.0,
        per_enemy: 2.0,
    },
    load: |b| {
        let y0 = TOP_Y + Y_DIFF;
        b.grid(
            &[
                row(Twin, 15.0, 1.0),
                row(Twin, 20.0, 1.0),
                row(Twin, 20.0, 1.0),
                row(Gunner, 40.0, 1.0),
                row(Drone, 0.0, 1.0),
            ],
            y0,
            Vertical,
        );
        let hunters = flank_hunters(b, y0);
        let mut pool = hunters.to_vec();
        pool.extend(b.last(2 * GRID_COLUMNS));
        b.finish(&hunters, pool);
    },
};

pub const LEVEL_4: Level = Level {
    freq: AttackFrequency::Constant(35.0),
    load: |b| {
        b.grid(
            &[
                row(Hunter, 30.0, 1.0),
                row(Twin, 15.0, 1.0),
                row(Twin, 20.0, 1.0),
                row(Gunner, 30.0, 1.0),
                row(Gunner, 40.0, 1.0),
                row(Drone, 0.0, 1.0),
            ],
            TOP_Y,
            Vertical,
        );
        let pool = b.range(GRID_COLUMNS, 2 * GRID_COLUMNS);
        b.finish(&[], pool);
    },
};

pub const LEVEL_5: Level = Level {
    freq: AttackFrequency::Linear {
        base: 0.0,
        per_enemy: 1.0,
    },
    load: |b| {
        b.grid(
            &[
                row(Hunter, 30.0, 1.0),
                row(Twin, 15.0, 1.0),
                row(Gunner, 30.0, 1.0),
                row(Drone, 0.0, 2.0),
                row(Drone, 0.0, 2.0),
                row(Drone, 0.0, 2.0),
            ],
            TOP_Y,
            Vertical,
        );
        let pool = b.last(3 * GRID_COLUMNS);
        b.finish(&[], pool);
    },
};

const CARRIER_ROWS: [Row; 5] = [
    row(Twin, 30.0, 1.0),
    row(Twin, 15.0, 1.0),
    row(Gunner, 30.0, 1.0),
    row(Drone, 0.0, 2.0),
    row(Drone, 0.0, 2.0),
];

/// A carrier spans two grid cells each way
const CARRIER_CELLS: Vec2 = Vec2::new(1.0, 1.0);

pub const LEVEL_6: Level = Level {
    freq: AttackFrequency::Constant(40.0),
    load: |b| {
        b.grid(&CARRIER_ROWS, TOP_Y, Scatter);
        let c = GRID_COLUMNS;
        let b1 = b.extra(Carrier, Vec2::new(INIT_X + b.xd, TOP_Y), CARRIER_CELLS, 20.0, Vertical);
        let e1 = b.range(c * 2, c * 2 + 4);
        b.escorts(b1, &e1);
        let b2 = b.extra(Carrier, Vec2::new(INIT_X + b.xd * 5.0, TOP_Y), CARRIER_CELLS, 20.0, Vertical);
        let e2 = b.range(c * 2 + 4, c * 2 + 8);
        b.escorts(b2, &e2);
        b.remove_square(1, 0, 2, 2);
        b.remove_square(5, 0, 2, 2);
        let mut pool = repeat(&[b1, b2], 2);
        pool.extend(b.last(2 * c));
        b.finish(&[b1, b2], pool);
    },
};

pub const LEVEL_7: Level = Level {
    freq: AttackFrequency::Constant(30.0),
    load: |b| {
        b.grid(&CARRIER_ROWS, TOP_Y, Scatter);
        let c = GRID_COLUMNS;
        let mut escorts = vec![b.at(2), b.at(5), b.at(c + 2), b.at(c + 5)];
        escorts.extend(b.range(c * 2 + 2, c * 2 + 6));
        escorts.extend(b.range(c * 3 + 2, c * 3 + 6));
        let boss = b.extra(Carrier, Vec2::new(INIT_X + b.xd * 3.0, TOP_Y), CARRIER_CELLS, 20.0, Vertical);
        b.escorts(boss, &escorts);
        b.remove_square(3, 0, 2, 2);
        let mut pool = repeat(&[boss], 4);
        pool.extend(b.last(c));
        b.finish(&[boss], pool);
    },
};

pub const LEVEL_8: Level = Level {
    freq: AttackFrequency::Constant(50.0),
    load: |b| {
        b.grid(
            &[
                row(Twin, 30.0, 1.0),
                row(Twin, 15.0, 1.0),
                row(Gunner, 30.0, 2.0),
                row(Drone, 0.0, 2.0),
            ],
            TOP_Y + 2.0 * Y_DIFF,
            Scatter,
        );
        let mut bosses = Vec::with_capacity(4);
        for k in 0..4 {
            let x = INIT_X + (2 * k) as f32 * b.xd;
            let boss = b.extra(Carrier, Vec2::new(x, TOP_Y), CARRIER_CELLS, 20.0, Vertical);
            let pair = [b.at(2 * k), b.at(2 * k + 1)];
            b.escorts(boss, &pair);
            bosses.push(boss);
        }
        let mut pool = repeat(&bosses, 3);
        pool.extend(b.last(GRID_COLUMNS));
        b.finish(&bosses, pool);
    },
};

const HUNTER_ROWS: [Row; 6] = [
    row(Hunter, 30.0, 1.0),
    row(Twin, 15.0, 1.0),
    row(Gunner, 30.0, 1.0),
    row(Drone, 0.0, 2.0),
    row(Drone, 0.0, 2.0),
    row(Drone, 0.0, 2.0),
];

pub const LEVEL_9: Level = Level {
    freq: AttackFrequency::Constant(50.0),
    load: |b| {
        let y0 = TOP_Y + Y_DIFF;
        let sentinel = b.extra(Sentinel, Vec2::new(b.mid, y0 - Y_DIFF), Vec2::ZERO, 60.0, Scatter);
        b.grid(&HUNTER_ROWS, y0, Scatter);
        let pool = b.last(3 * GRID_COLUMNS);
        b.finish(&[sentinel], pool);
    },
};

pub const LEVEL_10: Level = Level {
    freq: AttackFrequency::Constant(30.0),
    load: |b| {
        b.grid(&HUNTER_ROWS, TOP_Y + Y_DIFF, Scatter);
        let s = b.extra(Sentinel, Vec2::new(b.mid, TOP_Y), Vec2::ZERO, 60.0, Scatter);
        let m1 = b.extra(MineLayer, Vec2::new(b.mid - b.xd, TOP_Y), Vec2::ZERO, 25.0, Scatter);
        let m2 = b.extra(MineLayer, Vec2::new(b.mid + b.xd, TOP_Y), Vec2::ZERO, 25.0, Scatter);
        let layers = repeat(&[m1, m2], 3);
        let mut pool = layers.clone();
        pool.extend(layers);
        pool.extend(b.last(2 * GRID_COLUMNS));
        b.finish(&[s, m1, m2], pool);
    },
};

const MINEFIELD_ROWS: [Row; 6] = [
    row(Hunter, 30.0, 1.0),
    row(Twin, 15.0, 1.0),
    row(Gunner, 20.0, 1.0),
    row(Gunner, 30.0, 2.0),
    row(Drone, 0.0, 2.0),
    row(Drone, 0.0, 2.0),
];

pub const LEVEL_11: Level = Level {
    freq: AttackFrequency::Constant(25.0),
    load: |b| {
        b.grid(&MINEFIELD_ROWS, TOP_Y + Y_DIFF, Scatter);
        let s1 = b.extra(Sentinel, Vec2::new(b.mid - b.xd, TOP_Y), Vec2::ZERO, 60.0, Scatter);
        let s2 = b.extra(Sentinel, Vec2::new(b.mid + b.xd, TOP_Y), Vec2::ZERO, 60.0, Scatter);
        let m1 = b.extra(MineLayer, Vec2::new(b.mid, TOP_Y), Vec2::ZERO, 25.0, Scatter);
        let m2 = b.extra(MineLayer, Vec2::new(b.mid - 2.0 * b.xd, TOP_Y), Vec2::ZERO, 25.0, Scatter);
        let m3 = b.extra(MineLayer, Vec2::new(b.mid + 2.0 * b.xd, TOP_Y), Vec2::ZERO, 25.0, Scatter);
        let layers = repeat(&[m1, m2, m3], 3);
        let mut pool = layers.clone();
        pool.extend(layers);
        pool.extend(b.last(3 * GRID_COLUMNS));
        b.finish(&[s1, s2, m1, m2, m3], pool);
    },
};

/// A dreadnought spans three grid cells
const DREADNOUGHT_CELLS: Vec2 = Vec2::new(2.0, 0.0);

/// Two dreadnoughts and two mine layers across the top row
fn heavy_top_row(b: &mut LevelBuilder<'_>) -> [EnemyId; 4] {
    let d1 = b.extra(Dreadnought, Vec2::new(INIT_X + b.xd, TOP_Y), DREADNOUGHT_CELLS, 40.0, Scatter);
    let d2 = b.extra(Dreadnought, Vec2::new(INIT_X + 4.0 * b.xd, TOP_Y), DREADNOUGHT_CELLS, 40.0, Scatter);
    let m1 = b.extra(MineLayer, Vec2::new(INIT_X, TOP_Y), Vec2::ZERO, 25.0, Scatter);
    let m2 = b.extra(MineLayer, Vec2::new(INIT_X + 7.0 * b.xd, TOP_Y), Vec2::ZERO, 25.0, Scatter);
    [d1, d2, m1, m2]
}

pub const LEVEL_12: Level = Level {
    freq: AttackFrequency::Constant(25.0),
    load: |b| {
        b.grid(&MINEFIELD_ROWS, TOP_Y + Y_DIFF, Scatter);
        let [d1, d2, m1, m2] = heavy_top_row(b);
        let mut pool = repeat(&[d1, d2], 2);
        pool.extend(repeat(&[m1, m2], 3));
        pool.extend(b.last(2 * GRID_COLUMNS));
        b.finish(&[m1, m2, d1, d2], pool);
    },
};

pub const LEVEL_13: Level = Level {
    freq: AttackFrequency::Constant(20.0),
    load: |b| {
        b.grid(
            &[
                row(MineLayer, 20.0, 1.0),
                row(MineLayer, 20.0, 1.0),
                row(Drone, 0.0, 2.5),
                row(Drone, 0.0, 2.0),
                row(Drone, 0.0, 2.0),
                row(Drone, 0.0, 2.0),
            ],
            TOP_Y + Y_DIFF,
            Horizontal,
        );
        let mut pool = b.last(GRID_COLUMNS);
        pool.extend(b.range(GRID_COLUMNS, 2 * GRID_COLUMNS));
        b.finish(&[], pool);
    },
};

pub const LEVEL_14: Level = Level {
    freq: AttackFrequency::Constant(30.0),
    load: |b| {
        b.grid(
            &[
                row(Hunter, 20.0, 1.0),
                row(Twin, 15.0, 1.5),
                row(Twin, 20.0, 1.0),
                row(Gunner, 10.0, 1.5),
                row(Gunner, 30.0, 1.0),
                row(Drone, 0.0, 2.0),
            ],
            TOP_Y + Y_DIFF,
            Horizontal,
        );
        let front = heavy_top_row(b);
        let pool = b.all();
        b.finish(&front, pool);
    },
};

pub const LEVEL_15: Level = Level {
    freq: AttackFrequency::Constant(40.0),
    load: |b| {
        b.grid(
            &[
                row(Hunter, 25.0, 1.0),
                row(Twin, 15.0, 1.5),
                row(Gunner, 10.0, 1.7),
                row(Gunner, 15.0, 1.3),
                row(Drone, 0.0, 2.0),
            ],
            TOP_Y + Y_DIFF,
            Horizontal,
        );
        let s1 = b.extra(Sentinel, Vec2::new(INIT_X, TOP_Y), Vec2::ZERO, 50.0, Scatter);
        let s2 = b.extra(Sentinel, Vec2::new(b.mid, TOP_Y), Vec2::ZERO, 50.0, Scatter);
        let s3 = b.extra(Sentinel, Vec2::new(INIT_X + 7.0 * b.xd, TOP_Y), Vec2::ZERO, 50.0, Scatter);
        let pool = b.last(2 * GRID_COLUMNS);
        b.finish(&[s1, s2, s3], pool);
    },
};

pub const LEVEL_16: Level = Level {
    freq: AttackFrequency::Constant(13.0),
    load: |b| {
        b.grid(
            &[
                row(Hunter, 60.0, 1.0),
                row(Twin, 30.0, 1.5),
                row(Twin, 25.0, 1.2),
                row(Gunner, 25.0, 1.5),
                row(Gunner, 20.0, 1.4),
                row(Drone, 0.0, 1.8),
                row(Drone, 0.0, 1.6),
            ],
            TOP_Y + Y_DIFF,
            Scatter,
        );
        let pool = b.all();
        b.finish(&[], pool);
    },
};

pub const LEVEL_17: Level = Level {
    freq: AttackFrequency::Constant(45.0),
    load: |b| {
        b.grid(
            &[
                row(Twin, 35.0, 1.2),
                row(Gunner, 20.0, 1.2),
                row(Drone, 0.0, 1.2),
            ],
            TOP_Y + 3.0 * Y_DIFF,
            Scatter,
        );
        let boss = b.extra(
            Mothership,
            Vec2::new(INIT_X + 2.0 * b.xd, TOP_Y),
            Vec2::new(3.0, 2.0),
            50.0,
            Vertical,
        );
        let lane = TOP_Y + 2.0 * Y_DIFF;
        let mut layers = [boss; 4];
        for (slot, col) in layers.iter_mut().zip([0.0, 1.0, 6.0, 7.0]) {
            *slot = b.extra(MineLayer, Vec2::new(INIT_X + col * b.xd, lane), Vec2::ZERO, 25.0, Scatter);
        }
        let c1 = b.extra(Carrier, Vec2::new(INIT_X, TOP_Y), CARRIER_CELLS, 20.0, Scatter);
        let c2 = b.extra(Carrier, Vec2::new(INIT_X + 6.0 * b.xd, TOP_Y), CARRIER_CELLS, 20.0, Scatter);
        let pool = b.range(1, b.len());
        let [m1, m2, m3, m4] = layers;
        b.finish(&[boss, m1, m2, m3, m4, c1, c2], pool);
    },
};
