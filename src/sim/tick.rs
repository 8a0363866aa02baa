//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::enemy::{EnemyContext, EnemyMode};
use super::kinds::Salvo;
use super::objects::{EnemyProjectile, MINE_DAMAGE, MISSILE_DAMAGE, PlayerProjectile};
use super::path::Quarry;
use super::scheduler;
use super::state::{GameEvent, GameState};
use crate::Bounded;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire the cannon (space)
    pub fire: bool,
    /// Launch a missile (shift)
    pub missile: bool,
}

/// What the session has to react to after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// Every enemy is gone
    LevelCleared,
    /// The post-death countdown ran out
    GameOver,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> TickOutcome {
    state.time_ticks += 1;
    let field = state.field;

    // Player moves and fires; fresh shots fly this same tick
    let mut fired = Vec::new();
    state
        .player
        .update(input, &mut state.shot_timer, &field, &mut fired);
    for p in &fired {
        state.events.push(match p {
            PlayerProjectile::Shot(_) => GameEvent::PlayerFired,
            PlayerProjectile::Missile(_) => GameEvent::MissileLaunched,
        });
    }
    state.player_shots.extend(fired);

    let mut shots = std::mem::take(&mut state.player_shots);
    for shot in shots.iter_mut() {
        shot.update(&field);
        resolve_player_projectile(state, shot);
    }
    for life in state.player.lives.iter_mut() {
        life.update();
    }
    shots.retain(PlayerProjectile::is_active);
    state.player_shots = shots;

    let mut powerups = std::mem::take(&mut state.powerups);
    for p in powerups.iter_mut() {
        if let Some(kind) = p.update(&field, &state.player.bounds()) {
            state.collect_powerup(kind, p.pos);
        }
    }
    powerups.retain(|p| p.active);
    state.powerups = powerups;

    let mut enemy_shots = std::mem::take(&mut state.enemy_shots);
    for shot in enemy_shots.iter_mut() {
        shot.update(&field);
        if shot.strike(&state.player.bounds()) {
            state.hurt_player(1);
        }
    }
    enemy_shots.retain(EnemyProjectile::is_active);
    state.enemy_shots = enemy_shots;

    update_enemies(state);
    state.retire_inactive();

    let mut mines = std::mem::take(&mut state.mines);
    for mine in mines.iter_mut() {
        mine.update();
        if mine.touch(&state.player.bounds()) {
            state.hurt_player(MINE_DAMAGE);
        }
    }
    mines.retain(|m| m.active);
    state.mines = mines;

    state.wander.step();
    for explosion in state.explosions.iter_mut() {
        explosion.update();
    }
    state.explosions.retain(|e| e.active);
    state.stars.update(&field, &mut state.rng);

    scheduler::run(state);

    if state.enemies.is_empty() {
        log::info!("Level cleared after {} ticks", state.time_ticks);
        return TickOutcome::LevelCleared;
    }

    state.shot_timer += 1;
    state.attack_timer -= 1.0;

    if state.is_over {
        state.game_over_timer -= 1;
        if state.game_over_timer <= 0 {
            return TickOutcome::GameOver;
        }
    }
    TickOutcome::Running
}

/// Test one player projectile against every enemy and mine
fn resolve_player_projectile(state: &mut GameState, projectile: &mut PlayerProjectile) {
    match projectile {
        PlayerProjectile::Shot(shot) => {
            for idx in 0..state.enemies.len() {
                let enemy = &state.enemies[idx];
                if enemy.active && shot.strike(&enemy.bounds()) {
                    let id = enemy.id;
                    state.damage_enemy(id, 1);
                }
            }
            for mine in state.mines.iter_mut() {
                if mine.active && shot.strike(&mine.bounds()) {
                    state.explosions.push(mine.destroy());
                }
            }
        }
        PlayerProjectile::Missile(missile) => {
            let targets = state
                .enemies
                .iter()
                .filter(|e| e.active)
                .map(|e| e.bounds())
                .chain(state.mines.iter().filter(|m| m.active).map(|m| m.bounds()));
            let mut blast = None;
            for target in targets {
                if let Some(b) = missile.strike(&target) {
                    blast = Some(b);
                    break;
                }
            }
            let Some(blast) = blast else {
                return;
            };
            let caught: Vec<_> = state
                .enemies
                .iter()
                .filter(|e| e.active && e.collides_with(&blast.rect))
                .map(|e| e.id)
                .collect();
            log::debug!("Missile blast caught {} enemies", caught.len());
            for id in caught {
                state.damage_enemy(id, MISSILE_DAMAGE);
            }
            state.explosions.push(blast);
        }
    }
}

/// Run every live enemy's state machine, then absorb what they fired
///
/// Reinforcements spawned here join the roster after the loop and are first
/// updated on the next tick.
fn update_enemies(state: &mut GameState) {
    let field = state.field;
    let mut salvo = Salvo::default();
    for idx in 0..state.enemies.len() {
        if !state.enemies[idx].active {
            continue;
        }
        let ctx = EnemyContext {
            field,
            player: state.player.bounds(),
            quarry: Quarry {
                pos: state.player.pos,
                vel: state.player.vel,
            },
        };
        let report = state.enemies[idx].update(&ctx, &mut state.rng, &mut salvo);
        if report.arrived {
            state.arrived += 1;
        }
        if report.rammed {
            let id = state.enemies[idx].id;
            state.hurt_player(1);
            state.damage_enemy(id, 1);
        }
        let enemy = &state.enemies[idx];
        if enemy.mode == EnemyMode::Attack && !enemy.escorts.is_empty() {
            state.notify_escorts(idx);
        }
        if state.formation_settled() {
            let speed = state.wander.speed;
            state.enemies[idx].wander(speed, &field);
        }
    }
    state.absorb_salvo(salvo);
}
