//! Attack scheduler
//!
//! A single countdown picks the next attacker from the active pool.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyId;
use super::state::GameState;
use crate::consts::TICKS_PER_SECOND;

/// Per-level policy for the mean ticks between attacks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackFrequency {
    Constant(f32),
    /// Grows with the number of live enemies
    Linear { base: f32, per_enemy: f32 },
    /// Tapers as attacks accumulate, never below `floor`
    ///
    /// No built-in level uses it yet.
    AttackScaled { base: f32, per_attack: f32, floor: f32 },
    /// Editor setting expressed in seconds
    EditorInterval { secs: f32 },
}

impl AttackFrequency {
    pub fn ticks(&self, live_enemies: usize, attacks: u32) -> f32 {
        match *self {
            AttackFrequency::Constant(f) => f,
            AttackFrequency::Linear { base, per_enemy } => base + per_enemy * live_enemies as f32,
            AttackFrequency::AttackScaled {
                base,
                per_attack,
                floor,
            } => (base - per_attack * attacks as f32).max(floor),
            AttackFrequency::EditorInterval { secs } => TICKS_PER_SECOND as f32 * secs,
        }
    }
}

/// Launch an attack if the timer ran out; returns the enemy picked
///
/// With an empty pool nothing happens and the timer is left as it is.
pub fn run(state: &mut GameState) -> Option<EnemyId> {
    if state.attack_timer > 0.0 || state.active_pool.is_empty() {
        return None;
    }
    let pick = state.rng.random_range(0..state.active_pool.len());
    let id = state.active_pool[pick];
    let started = state.command_attack(id);
    state.num_attacks += 1;
    log::debug!("Attack #{}: {:?} (started: {})", state.num_attacks, id, started);
    if let Some(policy) = state.attack_freq {
        let f = policy.ticks(state.enemies.len(), state.num_attacks);
        state.attack_timer = state.rng.random::<f32>() * f + f / 8.0;
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ENEMY_CELL_H, ENEMY_CELL_W};
    use crate::sim::enemy::{EnemyMode, EnemySpec};
    use crate::sim::kinds::EnemyKind;
    use glam::Vec2;

    fn hovering_pool(state: &mut GameState, n: usize) {
        for i in 0..n {
            let id = state.spawn_enemy(EnemySpec::new(
                EnemyKind::Drone,
                Vec2::new(30.0 + i as f32 * 50.0, 80.0),
                Vec2::new(ENEMY_CELL_W, ENEMY_CELL_H),
            ));
            if let Some(e) = state.enemy_mut(id) {
                e.mode = EnemyMode::Hover;
            }
            state.active_pool.push(id);
        }
    }

    #[test]
    fn test_policies() {
        assert_eq!(AttackFrequency::Constant(35.0).ticks(10, 3), 35.0);
        let linear = AttackFrequency::Linear {
            base: 60.0,
            per_enemy: 1.0,
        };
        assert_eq!(linear.ticks(41, 0), 101.0);
        let scaled = AttackFrequency::AttackScaled {
            base: 60.0,
            per_attack: 2.0,
            floor: 20.0,
        };
        assert_eq!(scaled.ticks(0, 5), 50.0);
        assert_eq!(scaled.ticks(0, 100), 20.0);
        assert_eq!(AttackFrequency::EditorInterval { secs: 1.5 }.ticks(0, 0), 45.0);
    }

    #[test]
    fn test_empty_pool_leaves_timer() {
        let mut state = GameState::new(1);
        state.attack_freq = Some(AttackFrequency::Constant(40.0));
        state.attack_timer = -3.0;
        assert_eq!(run(&mut state), None);
        assert_eq!(state.attack_timer, -3.0);
        assert_eq!(state.num_attacks, 0);
    }

    #[test]
    fn test_waits_for_timer() {
        let mut state = GameState::new(2);
        hovering_pool(&mut state, 3);
        state.attack_timer = 1.0;
        assert_eq!(run(&mut state), None);
    }

    #[test]
    fn test_picks_and_reschedules() {
        let mut state = GameState::new(3);
        hovering_pool(&mut state, 3);
        state.attack_freq = Some(AttackFrequency::Constant(40.0));
        let picked = run(&mut state).expect("pool is not empty");
        assert!(state.active_pool.contains(&picked));
        assert_eq!(state.enemy(picked).map(|e| e.mode), Some(EnemyMode::Attack));
        assert_eq!(state.num_attacks, 1);
        assert!(state.attack_timer >= 5.0 && state.attack_timer < 45.0);
    }

    #[test]
    fn test_undefined_policy_keeps_timer() {
        let mut state = GameState::new(4);
        hovering_pool(&mut state, 1);
        state.attack_timer = 0.0;
        assert!(run(&mut state).is_some());
        assert_eq!(state.attack_timer, 0.0);
    }
}
