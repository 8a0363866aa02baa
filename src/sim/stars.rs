//! Ambient star field scrolling behind the action

use glam::Vec2;
use rand::Rng;

use crate::Field;

const INITIAL_STARS: usize = 30;
const MIN_SIZE: f32 = 5.0;
const MAX_SIZE: f32 = 18.0;
const MIN_SPEED: f32 = 0.2;
const MAX_SPEED: f32 = 0.7;
/// Mean ticks between new stars
const SPAWN_FREQ: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    pub stars: Vec<Star>,
    timer: f32,
}

impl Starfield {
    /// Field scattered with the initial stars
    pub fn new<R: Rng + ?Sized>(field: &Field, rng: &mut R) -> Self {
        let mut sky = Self::default();
        for _ in 0..INITIAL_STARS {
            let pos = Vec2::new(
                rng.random::<f32>() * field.width,
                rng.random::<f32>() * field.height,
            );
            sky.add(pos, rng);
        }
        sky
    }

    fn add<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) {
        self.stars.push(Star {
            pos,
            size: rng.random::<f32>() * (MAX_SIZE - MIN_SIZE) + MIN_SIZE,
            speed: rng.random::<f32>() * (MAX_SPEED - MIN_SPEED) + MIN_SPEED,
        });
    }

    pub fn update<R: Rng + ?Sized>(&mut self, field: &Field, rng: &mut R) {
        self.timer -= 1.0;
        if self.timer <= 0.0 {
            let x = rng.random::<f32>() * field.width;
            self.add(Vec2::new(x, 0.0), rng);
            self.timer = rng.random::<f32>() * SPAWN_FREQ + SPAWN_FREQ / 2.0;
        }
        self.stars.retain_mut(|star| {
            star.pos.y += star.speed;
            star.pos.y < field.height
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_initial_sky() {
        let mut rng = Pcg32::seed_from_u64(1);
        let field = Field::default();
        let sky = Starfield::new(&field, &mut rng);
        assert_eq!(sky.stars.len(), INITIAL_STARS);
        for s in &sky.stars {
            assert!((MIN_SIZE..MAX_SIZE).contains(&s.size));
            assert!((MIN_SPEED..MAX_SPEED).contains(&s.speed));
        }
    }

    #[test]
    fn test_stars_drift_and_expire() {
        let mut rng = Pcg32::seed_from_u64(2);
        let field = Field::default();
        let mut sky = Starfield::default();
        sky.stars.push(Star {
            pos: Vec2::new(10.0, field.height - 0.1),
            size: 5.0,
            speed: 0.5,
        });
        sky.update(&field, &mut rng);
        // The bottom star fell off and a fresh one spawned at the top
        assert_eq!(sky.stars.len(), 1);
        assert!(sky.stars[0].pos.y < 1.0);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut rng = Pcg32::seed_from_u64(3);
        let field = Field::default();
        let mut sky = Starfield::default();
        for _ in 0..300 {
            sky.update(&field, &mut rng);
        }
        // One star every 25..75 ticks, none old enough to leave yet
        assert!((4..=13).contains(&sky.stars.len()));
    }
}
