//! Scene composition
//!
//! Draws whatever screen the session is on. Sprites that are not loaded
//! (pending or failed) are skipped; everything else still draws.

use glam::Vec2;

use super::{Align, RenderTarget, palette};
use crate::assets::{AssetCatalog, SpriteId};
use crate::consts::SHOT_W;
use crate::editor::{self, Button, Editor, HELP, Slider};
use crate::game::{Game, Screen};
use crate::sim::kinds::EnemyKind;
use crate::sim::objects::{
    EnemyProjectile, MINE_SIZE, PlayerProjectile, PlayerState, PowerupKind, Shot, ShotPhase,
};
use crate::sim::state::GameState;
use crate::{Bounded, Rect};

const HUD_TEXT: f32 = 18.0;
const HELP_TEXT: f32 = 14.0;
const SLIDER_TEXT: f32 = 12.0;

pub fn draw_frame(target: &mut dyn RenderTarget, game: &Game) {
    let field = game.state.field;
    target.fill_rect(Rect::new(0.0, 0.0, field.width, field.height), palette::BACKGROUND);
    match game.screen() {
        Screen::Loading => {
            target.text(
                "Loading...",
                Vec2::new(field.width / 2.0, field.height / 2.0),
                24.0,
                palette::TEXT,
                Align::Center,
            );
            return;
        }
        Screen::Menu => draw_menu(target, &game.state, &game.assets),
        Screen::Playing => {
            draw_world(target, &game.state, &game.assets, None);
            draw_hud(target, game);
        }
        Screen::GameOver { won } => {
            draw_world(target, &game.state, &game.assets, None);
            draw_hud(target, game);
            let banner = if won { "You Win!" } else { "Game Over!" };
            target.text(
                banner,
                Vec2::new(field.width / 2.0, field.height / 2.0 + 20.0),
                30.0,
                palette::TEXT,
                Align::Center,
            );
        }
        Screen::Editor => {
            if game.editor.is_playing() {
                draw_world(target, &game.state, &game.assets, None);
                draw_hud(target, game);
            } else {
                draw_world(target, &game.state, &game.assets, Some(&game.editor));
                draw_editor(target, &game.state, &game.assets, &game.editor);
            }
            for button in game.editor.buttons() {
                draw_button(target, button, 16.0);
            }
        }
    }
    for button in game.buttons() {
        draw_button(target, button, HUD_TEXT);
    }
    draw_toggles(target, game);
}

fn sprite(target: &mut dyn RenderTarget, assets: &AssetCatalog, id: SpriteId, dest: Rect) {
    if let Some(handle) = assets.sprite(id) {
        target.blit(handle, dest);
    }
}

fn draw_menu(target: &mut dyn RenderTarget, state: &GameState, assets: &AssetCatalog) {
    let (w, h) = (state.field.width, state.field.height);
    draw_stars(target, state, assets);
    target.text("Xenophobia", Vec2::new(w / 2.0, h / 6.0), 56.0, palette::TEXT, Align::Center);
    target.text(
        "Destroy the aliens, because",
        Vec2::new(w / 2.0, h / 4.0),
        24.0,
        palette::TEXT,
        Align::Center,
    );
    target.text(
        "they are different from you.",
        Vec2::new(w / 2.0, h / 4.0 + 24.0),
        24.0,
        palette::TEXT,
        Align::Center,
    );

    // Score table in two columns
    let top = h / 2.0 + 60.0;
    let mut at = Vec2::new(50.0, top);
    for (i, kind) in EnemyKind::ALL.into_iter().enumerate() {
        if i == 4 {
            at = Vec2::new(at.x + w / 2.0 - 30.0, top);
        }
        let Some(handle) = assets.sprite(SpriteId::Enemy(kind)) else {
            continue;
        };
        let size = handle.size;
        target.blit(handle, Rect::from_pos_size(at, size));
        target.text(
            &format!(" = {}", kind.score()),
            Vec2::new(at.x + size.x + 5.0, at.y + (size.y + 20.0) / 2.0),
            22.0,
            palette::TEXT,
            Align::Left,
        );
        at.y += size.y + 20.0;
    }
}

fn draw_stars(target: &mut dyn RenderTarget, state: &GameState, assets: &AssetCatalog) {
    let Some(handle) = assets.sprite(SpriteId::Star) else {
        return;
    };
    for star in &state.stars.stars {
        target.blit(handle, Rect::from_pos_size(star.pos, Vec2::splat(star.size)));
    }
}

/// Everything on the field; `editing` adds selection, attacker and link marks
fn draw_world(
    target: &mut dyn RenderTarget,
    state: &GameState,
    assets: &AssetCatalog,
    editing: Option<&Editor>,
) {
    let w = state.field.width;
    draw_stars(target, state, assets);

    let player = &state.player;
    if player.visible && !player.is_destroyed() {
        let id = match player.state {
            PlayerState::Left => SpriteId::PlayerLeft,
            PlayerState::Right => SpriteId::PlayerRight,
            PlayerState::Normal | PlayerState::Destroyed => SpriteId::Player,
        };
        sprite(target, assets, id, player.bounds());
        if player.shielded {
            let dest = Rect::from_pos_size(
                player.pos - Vec2::new(6.0, 8.0),
                player.size + Vec2::new(12.0, 5.0),
            );
            sprite(target, assets, SpriteId::Shield, dest);
        }
    }
    target.line(
        Vec2::new(0.0, state.field.boundary),
        Vec2::new(w, state.field.boundary),
        palette::BOUNDARY,
        1.0,
    );

    for projectile in &state.player_shots {
        match projectile {
            PlayerProjectile::Shot(shot) => {
                draw_shot(target, assets, shot, SpriteId::PlayerShot, SpriteId::PlayerShotHit)
            }
            PlayerProjectile::Missile(m) => sprite(target, assets, SpriteId::Missile, m.bounds()),
        }
    }
    for p in &state.powerups {
        let id = match p.kind {
            PowerupKind::Missile => SpriteId::Missile,
            PowerupKind::Shield => SpriteId::ShieldPowerup,
            PowerupKind::Life => SpriteId::Life,
        };
        let bounds = p.bounds();
        sprite(target, assets, id, bounds);
        let radius = std::f32::consts::SQRT_2 * bounds.size.x / 2.0;
        target.circle(
            bounds.pos + Vec2::splat(radius / 1.5),
            radius,
            palette::OUTLINE,
            false,
        );
    }
    for projectile in &state.enemy_shots {
        match projectile {
            EnemyProjectile::Shot(shot) => {
                draw_shot(target, assets, shot, SpriteId::EnemyShot, SpriteId::EnemyShotHit)
            }
            EnemyProjectile::Laser(laser) => target.fill_rect(laser.bounds(), palette::LASER),
        }
    }
    for enemy in &state.enemies {
        let bounds = enemy.bounds();
        sprite(target, assets, SpriteId::Enemy(enemy.kind), bounds);
        if editing.is_none() {
            continue;
        }
        if enemy.edit.selected {
            target.stroke_rect(bounds, palette::OUTLINE, 1.0);
        }
        let center = bounds.center();
        if enemy.edit.attacker || state.active_pool.contains(&enemy.id) {
            target.circle(center, 1.2 * (bounds.size.x / 2.0), palette::ATTACKER, false);
        }
        if let Some(parent) =
            editor::nearest_live_ancestor(state, enemy.id).and_then(|id| state.lookup(id))
        {
            target.line(center, parent.bounds().center(), palette::ATTACKER, 1.0);
        }
    }
    for life in &player.lives {
        sprite(
            target,
            assets,
            SpriteId::Life,
            Rect::from_pos_size(life.pos, player.size / 2.0),
        );
    }
    for explosion in &state.explosions {
        sprite(target, assets, SpriteId::Explosion(explosion.frame as u8), explosion.rect);
    }
    for mine in &state.mines {
        sprite(target, assets, SpriteId::Mine(u8::from(mine.lit)), mine.bounds());
    }
}

fn draw_shot(
    target: &mut dyn RenderTarget,
    assets: &AssetCatalog,
    shot: &Shot,
    flying: SpriteId,
    impact: SpriteId,
) {
    match shot.phase {
        ShotPhase::Flying => sprite(target, assets, flying, shot.bounds()),
        ShotPhase::Exploding { .. } => {
            let center = Vec2::new(shot.pos.x + SHOT_W / 2.0, shot.pos.y);
            let size = Vec2::splat(MINE_SIZE);
            sprite(target, assets, impact, Rect::from_pos_size(center - size / 2.0, size));
        }
        ShotPhase::Gone => {}
    }
}

fn draw_hud(target: &mut dyn RenderTarget, game: &Game) {
    let w = game.state.field.width;
    let label = if game.screen() == Screen::Editor {
        "Custom Level".to_string()
    } else {
        let (world, level) = game.position();
        format!("Level {}-{}", world + 1, level + 1)
    };
    let y = 18.0;
    target.text(&label, Vec2::new(10.0, y), HUD_TEXT, palette::TEXT, Align::Left);
    target.text(
        &format!("Missiles: {}", game.state.player.missiles),
        Vec2::new(w / 3.0, y),
        HUD_TEXT,
        palette::TEXT,
        Align::Left,
    );
    target.text(
        &format!("Score: {}", game.state.score),
        Vec2::new(w / 1.7, y),
        HUD_TEXT,
        palette::TEXT,
        Align::Left,
    );
}

fn draw_editor(target: &mut dyn RenderTarget, state: &GameState, assets: &AssetCatalog, editor: &Editor) {
    for entry in &editor.palette {
        sprite(target, assets, SpriteId::Enemy(entry.kind), entry.rect);
    }
    if let Some(rect) = editor.marquee() {
        target.stroke_rect(rect, palette::OUTLINE, 1.0);
    } else if let Some((from, to)) = editor.link_line(state) {
        target.line(from, to, palette::ATTACKER, 1.0);
    }
    if editor.show_help {
        let boundary = state.field.boundary;
        for (i, line) in HELP.iter().enumerate() {
            // The wrapped second half of the linking hint is indented
            let x = if line.starts_with('-') { 10.0 } else { 30.0 };
            let y = boundary - 160.0 + 20.0 * i as f32;
            target.text(line, Vec2::new(x, y), HELP_TEXT, palette::TEXT, Align::Left);
        }
    }
    for slider in editor.visible_sliders() {
        draw_slider(target, slider);
    }
}

fn draw_slider(target: &mut dyn RenderTarget, slider: &Slider) {
    let knob = slider.knob();
    target.line(
        Vec2::new(slider.pos.x, knob.y),
        Vec2::new(slider.pos.x + slider.width, knob.y),
        palette::SLIDER_TRACK,
        slider.height / 4.0,
    );
    target.circle(knob, slider.radius(), palette::SLIDER_KNOB, true);
    let mid = slider.pos.x + slider.width / 2.0;
    target.text(slider.label, Vec2::new(mid, slider.pos.y), SLIDER_TEXT, palette::TEXT, Align::Center);
    target.text(
        &format!("{:.3} {}", slider.display_value(), slider.units),
        Vec2::new(mid, slider.pos.y + 13.0),
        SLIDER_TEXT,
        palette::TEXT,
        Align::Center,
    );
}

fn draw_button(target: &mut dyn RenderTarget, button: &Button, text_size: f32) {
    let fill = if button.hover {
        palette::BUTTON_HOVER
    } else {
        palette::BUTTON
    };
    target.fill_rect(button.rect, fill);
    target.stroke_rect(button.rect, palette::TEXT, 1.0);
    target.text(
        &button.label,
        Vec2::new(button.rect.center().x, button.rect.pos.y + button.rect.size.y / 1.45),
        text_size,
        palette::TEXT,
        Align::Center,
    );
}

/// Pause and sound icons, top right
fn draw_toggles(target: &mut dyn RenderTarget, game: &Game) {
    let pause = if game.is_paused() {
        SpriteId::Play
    } else {
        SpriteId::Pause
    };
    sprite(target, &game.assets, pause, game.pause_button());
    let sound = if game.settings.sound_on {
        SpriteId::SoundOn
    } else {
        SpriteId::SoundOff
    };
    sprite(target, &game.assets, sound, game.sound_button());
}
