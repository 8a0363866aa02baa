//! Parametric motion paths
//!
//! Every path yields a per-tick displacement. Paths never touch the entity
//! they drive; the caller adds the returned vector to its own position.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Field, Rect};

/// Ticks the return leg takes to bring an attacker back to its anchor
pub const RETURN_TICKS: f32 = 30.0;
/// Tick budget of a pursuit run before it gives up and dives
pub const PURSUIT_TICKS: i32 = 90;
/// Dive speed once a pursuit is exhausted
const PURSUIT_DIVE: Vec2 = Vec2::new(0.0, 8.0);
/// Horizontal push used to bring an evader back inside the field
const EVASION_REENTRY: f32 = 12.0;
const EVASION_FALL: f32 = 7.0;

/// The target a pursuit or evasion path reacts to
#[derive(Debug, Clone, Copy, Default)]
pub struct Quarry {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// What a reactive path needs to know each tick
#[derive(Debug, Clone, Copy)]
pub struct PathContext {
    /// Bounds of the entity being driven
    pub mover: Rect,
    pub quarry: Quarry,
    pub field: Field,
}

/// Waypoint interpolation at constant velocity per segment
///
/// Each segment lasts `ceil(duration)` ticks (at least one) and the step is
/// chosen so a full segment lands exactly on its end waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPath {
    points: Vec<Vec2>,
    durations: Vec<f32>,
    segment: usize,
    tick: u32,
    segment_ticks: u32,
    step: Vec2,
    finished: bool,
    teleports: bool,
}

fn ticks_for(duration: f32) -> u32 {
    if duration.is_finite() && duration > 1.0 {
        duration.ceil() as u32
    } else {
        1
    }
}

impl PointPath {
    /// Build a path; durations are divided by `speed` (non-positive speeds count as 1)
    pub fn new(points: Vec<Vec2>, durations: Vec<f32>, speed: f32) -> Self {
        let speed = if speed > 0.0 { speed } else { 1.0 };
        let durations: Vec<f32> = durations.into_iter().map(|d| d / speed).collect();
        let mut path = Self {
            points,
            durations,
            segment: 0,
            tick: 0,
            segment_ticks: 1,
            step: Vec2::ZERO,
            finished: false,
            teleports: false,
        };
        if path.points.len() < 2 {
            path.finished = true;
        } else {
            path.begin_segment(0);
        }
        path
    }

    /// Rebuild from already scaled durations (used when cloning)
    fn from_scaled(points: Vec<Vec2>, durations: Vec<f32>) -> Self {
        Self::new(points, durations, 1.0)
    }

    /// Entry paths start by moving their entity onto the first waypoint
    pub fn teleporting(mut self) -> Self {
        self.teleports = true;
        self
    }

    fn begin_segment(&mut self, segment: usize) {
        let duration = self.durations.get(segment).copied().unwrap_or(1.0);
        self.segment = segment;
        self.tick = 0;
        self.segment_ticks = ticks_for(duration);
        let delta = self.points[segment + 1] - self.points[segment];
        self.step = delta / self.segment_ticks as f32;
    }

    /// Displacement for this tick; zero once finished
    pub fn next(&mut self) -> Vec2 {
        if self.finished {
            return Vec2::ZERO;
        }
        let step = self.step;
        self.tick += 1;
        if self.tick >= self.segment_ticks {
            let following = self.segment + 1;
            if following + 1 >= self.points.len() {
                self.finished = true;
            } else {
                self.begin_segment(following);
            }
        }
        step
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Cut the path short
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Where the entity must be placed before the first step, if anywhere
    pub fn start_point(&self) -> Option<Vec2> {
        if self.teleports {
            self.points.first().copied()
        } else {
            None
        }
    }

    pub fn last_point(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Segment durations after speed scaling
    pub fn durations(&self) -> &[f32] {
        &self.durations
    }

    /// Number of ticks a given segment runs for
    pub fn segment_ticks(&self, segment: usize) -> u32 {
        ticks_for(self.durations.get(segment).copied().unwrap_or(1.0))
    }
}

/// Steers toward a moving target, leading by its velocity
#[derive(Debug, Clone, PartialEq)]
pub struct Pursuit {
    remaining: i32,
    finished: bool,
}

impl Pursuit {
    pub fn new(budget: i32) -> Self {
        Self {
            remaining: budget,
            finished: false,
        }
    }

    fn next(&mut self, ctx: &PathContext) -> Vec2 {
        if self.finished {
            return Vec2::ZERO;
        }
        self.remaining -= 1;
        let me = ctx.mover;
        if me.pos.y > ctx.field.height {
            self.finished = true;
            return Vec2::ZERO;
        }
        // Threshold measured against the field width, as tuned
        if self.remaining <= 0 || me.pos.y > ctx.field.width - 1.5 * me.size.y {
            return PURSUIT_DIVE;
        }
        let q = ctx.quarry;
        let lead = Vec2::new(
            q.pos.x + 5.0 * q.vel.x - me.pos.x + (q.pos.x - me.pos.x) / 1.5,
            q.pos.y - me.pos.y,
        );
        let dir = lead.normalize_or_zero();
        Vec2::new(9.0 * dir.x, 6.0 * dir.y)
    }
}

/// Falls steadily while sidestepping the target
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evasion {
    finished: bool,
}

impl Evasion {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, ctx: &PathContext) -> Vec2 {
        if self.finished {
            return Vec2::ZERO;
        }
        let me = ctx.mover;
        let width = ctx.field.width;
        if me.pos.y > ctx.field.height {
            self.finished = true;
            return Vec2::ZERO;
        }
        if me.pos.x < 0.0 {
            return Vec2::new(EVASION_REENTRY, 0.0);
        }
        if me.pos.x > width {
            return Vec2::new(-EVASION_REENTRY, 0.0);
        }
        let q = ctx.quarry;
        let lead = Vec2::new(
            q.pos.x + 10.0 * q.vel.x - me.pos.x + (q.pos.x - me.pos.x) / 1.5,
            q.pos.y + 3.0 * q.vel.y - me.pos.y,
        );
        let dir = lead.normalize_or_zero();
        let mut x_vel = -10.0 * dir.x;
        let hugging_left = me.pos.x < me.size.x && x_vel < 0.0;
        let hugging_right = me.pos.x > width - 2.0 * me.size.x && x_vel > 0.0;
        if hugging_left || hugging_right || lead.x.abs() > width / 2.0 {
            x_vel = 0.0;
        }
        Vec2::new(x_vel, EVASION_FALL)
    }
}

/// A live path owned by one entity
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    Points(PointPath),
    Pursuit(Pursuit),
    Evasion(Evasion),
}

impl Path {
    pub fn next(&mut self, ctx: &PathContext) -> Vec2 {
        match self {
            Path::Points(p) => p.next(),
            Path::Pursuit(p) => p.next(ctx),
            Path::Evasion(p) => p.next(ctx),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            Path::Points(p) => p.finished,
            Path::Pursuit(p) => p.finished,
            Path::Evasion(p) => p.finished,
        }
    }

    pub fn last_point(&self) -> Option<Vec2> {
        match self {
            Path::Points(p) => p.last_point(),
            _ => None,
        }
    }
}

/// Offensive run shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Swoop sideways then cross back down to the bottom edge
    Standard,
    /// Run to the nearer side wall, then sweep across the field
    Sweep,
    /// Chase the player
    Pursuit,
    /// Fall while dodging the player
    Evasion,
}

/// Attack path factory bound to one enemy
///
/// Remembers the waypoints of its last instantiation so escorts can fly
/// the same run without sharing its progress.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackPath {
    pattern: AttackPattern,
    blueprint: Option<PointPath>,
}

impl AttackPath {
    pub fn new(pattern: AttackPattern) -> Self {
        Self {
            pattern,
            blueprint: None,
        }
    }

    pub fn pattern(&self) -> AttackPattern {
        self.pattern
    }

    /// Fresh run starting from `origin`
    pub fn instantiate<R: Rng + ?Sized>(
        &mut self,
        origin: Vec2,
        speed: f32,
        field: &Field,
        rng: &mut R,
    ) -> Path {
        let (w, h) = (field.width, field.height);
        let points = match self.pattern {
            AttackPattern::Pursuit => return Path::Pursuit(Pursuit::new(PURSUIT_TICKS)),
            AttackPattern::Evasion => return Path::Evasion(Evasion::new()),
            AttackPattern::Standard => {
                let dir = if rng.random::<f32>() < 0.5 { -1.0 } else { 1.0 };
                PointPath::new(
                    vec![
                        origin,
                        origin + Vec2::new(dir * w / 4.0, h / 6.0),
                        Vec2::new(origin.x - dir * w / 3.0, h),
                    ],
                    vec![30.0, 80.0],
                    speed,
                )
            }
            AttackPattern::Sweep => {
                let (x1, x2) = if origin.x < w / 2.0 { (0.0, w) } else { (w, 0.0) };
                PointPath::new(
                    vec![
                        origin,
                        Vec2::new(x1, origin.y + h / 8.0),
                        Vec2::new(x2, h - origin.y),
                    ],
                    vec![40.0, 150.0],
                    1.0,
                )
            }
        };
        self.blueprint = Some(points.clone());
        Path::Points(points)
    }

    /// Same run for another entity with independent progress
    ///
    /// Waypoint runs reuse the last instantiated waypoints and already scaled
    /// durations. `None` when a waypoint run was never instantiated.
    pub fn clone_for_escort(&self) -> Option<Path> {
        match self.pattern {
            AttackPattern::Pursuit => Some(Path::Pursuit(Pursuit::new(PURSUIT_TICKS))),
            AttackPattern::Evasion => Some(Path::Evasion(Evasion::new())),
            AttackPattern::Standard | AttackPattern::Sweep => self.blueprint.as_ref().map(|p| {
                Path::Points(PointPath::from_scaled(
                    p.points().to_vec(),
                    p.durations().to_vec(),
                ))
            }),
        }
    }
}

/// How an enemy flies into its formation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPattern {
    /// Drop in from one field height above the slot
    Vertical,
    /// Slide in from one field width to the side nearer the slot
    Horizontal,
    /// Drop in from a random column above the field
    Scatter,
}

/// Entry path factory with a randomized duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryPath {
    pub pattern: EntryPattern,
    /// Floor added under the random spread
    pub min_ticks: f32,
}

impl EntryPath {
    pub fn new(pattern: EntryPattern, min_ticks: f32) -> Self {
        Self { pattern, min_ticks }
    }

    /// Path ending on `slot`; its start point is where the entity must teleport
    pub fn instantiate<R: Rng + ?Sized>(&self, slot: Vec2, field: &Field, rng: &mut R) -> PointPath {
        let start = match self.pattern {
            EntryPattern::Vertical => Vec2::new(slot.x, slot.y - field.height),
            EntryPattern::Horizontal => {
                let dir = if slot.x < field.width / 2.0 {
                    -field.width
                } else {
                    field.width
                };
                Vec2::new(slot.x + dir, slot.y)
            }
            EntryPattern::Scatter => {
                Vec2::new(rng.random::<f32>() * field.width, slot.y - field.height)
            }
        };
        let duration = self.min_ticks + 20.0 + rng.random::<f32>() * 40.0;
        PointPath::new(vec![start, slot], vec![duration], 1.0).teleporting()
    }
}

/// Straight run from `from` back to the formation anchor
pub fn return_path(from: Vec2, anchor: Vec2) -> PointPath {
    PointPath::new(vec![from, anchor], vec![RETURN_TICKS], 1.0)
}
