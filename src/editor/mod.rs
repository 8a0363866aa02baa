//! Level editor
//!
//! The editor works directly on the live enemy roster in [`GameState`]:
//! while editing, `state.enemies` is the custom level. Playing snapshots
//! every enemy's position and health, hands the roster to the simulation
//! and restores the snapshot on stop.

pub mod widgets;

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::TICKS_PER_SECOND;
use crate::platform::input::Modifiers;
use crate::sim::enemy::{EditSnapshot, Enemy, EnemyId, EnemyMode, EnemySpec};
use crate::sim::kinds::EnemyKind;
use crate::sim::levels;
use crate::sim::path::EntryPattern;
use crate::sim::state::GameState;
use crate::{Bounded, Field, Rect, Settings};
pub use widgets::{Button, Slider};

/// Horizontal gap between a copy and its source in a filled row
const COPY_GAP: f32 = 15.0;
const ENEMY_SLIDER_WIDTH: f32 = 75.0;
/// Shot interval a freshly placed enemy starts with, in ticks
const NEW_ENEMY_SHOT_FREQ: f32 = 30.0;

pub const HELP: [&str; 8] = [
    "-Click and drag from a template below to create a new enemy.",
    "-Shift click or click and drag to select multiple enemies.",
    "-Type 'c' to copy an enemy or 'shift-c' to fill a row with copies.",
    "-Hit the delete key to remove selected enemies.",
    "-Type 'a' to set selected enemies as attackers.",
    "-Control click and drag from one enemy to another to make the",
    "second enemy attack after the first is destroyed.",
    "-Use sliders to modify values. Values are copied along with enemies.",
];

/// What the session has to do after an editor input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    /// Start simulating the custom level
    Play,
    /// Return from simulation to editing
    Stop,
    /// Leave the editor for the main menu
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderSlot {
    AttackInterval,
    PlayerLives,
    PlayerMissiles,
    Health,
    ShotInterval,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    /// Dragging the selection
    Move,
    Slider(SliderSlot),
    /// Control-drag from an enemy that is choosing its parent
    Link(EnemyId),
    Marquee { anchor: Vec2, rect: Rect },
}

/// Template below the boundary; dragging one out places a new enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub kind: EnemyKind,
    pub rect: Rect,
}

#[derive(Debug)]
pub struct Editor {
    field: Field,
    pub palette: Vec<PaletteEntry>,
    selected: Vec<EnemyId>,
    pub attack_interval: Slider,
    pub player_lives: Slider,
    pub player_missiles: Slider,
    pub health: Slider,
    pub shot_interval: Slider,
    pub speed: Slider,
    pub show_enemy_sliders: bool,
    pub show_help: bool,
    pub main_button: Button,
    pub play_button: Button,
    pub help_button: Button,
    drag: Drag,
    pointer: Vec2,
    playing: bool,
    /// Roster order captured when play starts
    roster: Vec<EnemyId>,
    /// Enemies kept while the editor is closed
    stash: Vec<Enemy>,
}

impl Editor {
    pub fn new(field: &Field, settings: &Settings) -> Self {
        let mut palette = Vec::with_capacity(EnemyKind::PALETTE.len());
        let mut x = 0.0;
        for kind in EnemyKind::PALETTE {
            let size = kind.sprite_size();
            palette.push(PaletteEntry {
                kind,
                rect: Rect::from_pos_size(Vec2::new(x, field.boundary + 10.0), size),
            });
            x += size.x + 10.0;
        }

        let bottom = field.height - 35.0;
        let mut attack_interval = Slider::new(
            "Time between Attacks",
            "sec.",
            Vec2::new(20.0, bottom),
            110.0,
            14.0,
            0.0,
            3.0,
            0.0,
        );
        let mut player_lives =
            Slider::new("Player Health", "", Vec2::new(160.0, bottom), 80.0, 14.0, 1.0, 10.0, 1.0);
        let mut player_missiles =
            Slider::new("Player Missiles", "", Vec2::new(260.0, bottom), 90.0, 14.0, 0.0, 20.0, 1.0);
        attack_interval.set_value(settings.editor_attack_interval_secs);
        player_lives.set_value(settings.editor_player_lives as f32);
        player_missiles.set_value(settings.editor_player_missiles as f32);

        let w = ENEMY_SLIDER_WIDTH;
        let right = field.width - 10.0;
        Self {
            field: *field,
            palette,
            selected: Vec::new(),
            attack_interval,
            player_lives,
            player_missiles,
            health: Slider::new("Health", "", Vec2::ZERO, w, 12.0, 1.0, 10.0, 1.0),
            shot_interval: Slider::new("Shot Freq.", "sec.", Vec2::ZERO, w, 12.0, 0.0, 3.0, 0.0),
            speed: Slider::new("Speed", "", Vec2::ZERO, w, 12.0, 0.1, 3.0, 0.1),
            show_enemy_sliders: false,
            show_help: settings.show_help,
            main_button: Button::right_aligned("MAIN", right, field.height - 31.0, 16.0),
            play_button: Button::right_aligned("PLAY", right, field.height - 62.0, 16.0),
            help_button: Button::right_aligned(
                if settings.show_help { "HIDE" } else { "HELP" },
                right,
                field.boundary - 64.0,
                14.0,
            ),
            drag: Drag::Idle,
            pointer: Vec2::ZERO,
            playing: false,
            roster: Vec::new(),
            stash: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn selection(&self) -> &[EnemyId] {
        &self.selected
    }

    /// Put the stashed roster back on the field
    pub fn enter(&mut self, state: &mut GameState) {
        state.clear_entities();
        state.explosions.clear();
        state.powerups.clear();
        state.attack_freq = None;
        state.is_over = false;
        state.player.lives.clear();
        state.player.visible = false;
        state.enemies = std::mem::take(&mut self.stash);
        self.drag = Drag::Idle;
        self.playing = false;
        log::info!("Editor opened with {} enemies", state.enemies.len());
    }

    /// Stash the roster and leave the field empty
    pub fn exit(&mut self, state: &mut GameState) {
        if self.playing {
            self.stop(state);
        }
        self.clear_selection(state);
        self.show_enemy_sliders = false;
        self.stash = std::mem::take(&mut state.enemies);
        state.clear_entities();
        state.player.visible = true;
    }

    /// Copy the global slider values into the persisted preferences
    pub fn store_preferences(&self, settings: &mut Settings) {
        settings.editor_attack_interval_secs = self.attack_interval.value();
        settings.editor_player_lives = self.player_lives.display_value().round() as u32;
        settings.editor_player_missiles = self.player_missiles.display_value().round() as u32;
        settings.show_help = self.show_help;
    }

    /// Sliders that are currently on screen
    pub fn visible_sliders(&self) -> Vec<&Slider> {
        let mut sliders = vec![&self.attack_interval, &self.player_lives, &self.player_missiles];
        if self.show_enemy_sliders {
            sliders.extend([&self.health, &self.shot_interval, &self.speed]);
        }
        sliders
    }

    /// Buttons that are currently on screen
    pub fn buttons(&self) -> Vec<&Button> {
        if self.playing {
            vec![&self.play_button]
        } else {
            vec![&self.main_button, &self.play_button, &self.help_button]
        }
    }

    /// Highlight whichever button is under the pointer
    pub fn hover(&mut self, p: Vec2) {
        for button in [&mut self.main_button, &mut self.play_button, &mut self.help_button] {
            button.hover = button.hit(p);
        }
    }

    pub fn marquee(&self) -> Option<Rect> {
        match self.drag {
            Drag::Marquee { rect, .. } => Some(rect),
            _ => None,
        }
    }

    /// Rubber band from the linking enemy to the pointer
    pub fn link_line(&self, state: &GameState) -> Option<(Vec2, Vec2)> {
        match self.drag {
            Drag::Link(id) => state.enemy(id).map(|e| (e.bounds().center(), self.pointer)),
            _ => None,
        }
    }

    fn slider_mut(&mut self, slot: SliderSlot) -> &mut Slider {
        match slot {
            SliderSlot::AttackInterval => &mut self.attack_interval,
            SliderSlot::PlayerLives => &mut self.player_lives,
            SliderSlot::PlayerMissiles => &mut self.player_missiles,
            SliderSlot::Health => &mut self.health,
            SliderSlot::ShotInterval => &mut self.shot_interval,
            SliderSlot::Speed => &mut self.speed,
        }
    }

    fn slider_at(&self, p: Vec2) -> Option<SliderSlot> {
        let mut slots = vec![
            (SliderSlot::AttackInterval, &self.attack_interval),
            (SliderSlot::PlayerLives, &self.player_lives),
            (SliderSlot::PlayerMissiles, &self.player_missiles),
        ];
        if self.show_enemy_sliders {
            slots.extend([
                (SliderSlot::Health, &self.health),
                (SliderSlot::ShotInterval, &self.shot_interval),
                (SliderSlot::Speed, &self.speed),
            ]);
        }
        slots.into_iter().find(|(_, s)| s.hit(p)).map(|(slot, _)| slot)
    }

    pub fn mouse_down(&mut self, state: &mut GameState, p: Vec2, mods: Modifiers) -> EditorAction {
        if self.playing {
            return if self.play_button.hit(p) {
                EditorAction::Stop
            } else {
                EditorAction::None
            };
        }
        self.pointer = p;
        if self.main_button.hit(p) {
            return EditorAction::Exit;
        }
        if self.play_button.hit(p) {
            return EditorAction::Play;
        }
        if self.help_button.hit(p) {
            self.show_help = !self.show_help;
            self.help_button
                .set_label(if self.show_help { "HIDE" } else { "HELP" });
            return EditorAction::None;
        }
        if let Some(slot) = self.slider_at(p) {
            self.drag = Drag::Slider(slot);
            return EditorAction::None;
        }

        let clicked = state
            .enemies
            .iter()
            .rev()
            .find(|e| e.bounds().contains(p))
            .map(|e| (e.id, e.edit.selected));
        if let Some((id, already_selected)) = clicked {
            if mods.control {
                self.drag = Drag::Link(id);
            } else {
                if !already_selected {
                    if !mods.shift {
                        self.clear_selection(state);
                    }
                    self.select(state, id);
                } else if mods.shift {
                    self.deselect(state, id);
                }
                self.drag = Drag::Move;
            }
            self.update_enemy_sliders(state);
            return EditorAction::None;
        }

        if let Some(entry) = self.palette.iter().find(|e| e.rect.contains(p)).copied() {
            self.clear_selection(state);
            let spec = EnemySpec::new(entry.kind, p, entry.kind.sprite_size())
                .shot_freq(NEW_ENEMY_SHOT_FREQ)
                .entry(EntryPattern::Vertical);
            let id = state.spawn_enemy(spec);
            if let Some(e) = state.enemy_mut(id) {
                e.mode = EnemyMode::Hover;
            }
            self.select(state, id);
            self.drag = Drag::Move;
            self.update_enemy_sliders(state);
            return EditorAction::None;
        }

        if !mods.shift {
            self.clear_selection(state);
        }
        self.drag = Drag::Marquee {
            anchor: p,
            rect: Rect::from_pos_size(p, Vec2::ZERO),
        };
        self.update_enemy_sliders(state);
        self.tidy(state);
        EditorAction::None
    }

    pub fn mouse_move(&mut self, state: &mut GameState, p: Vec2) {
        if self.playing {
            return;
        }
        let delta = p - self.pointer;
        match self.drag {
            Drag::Idle | Drag::Link(_) => {}
            Drag::Move => {
                for id in &self.selected {
                    if let Some(e) = state.enemy_mut(*id) {
                        e.pos += delta;
                    }
                }
                self.update_enemy_sliders(state);
            }
            Drag::Slider(slot) => {
                let value = self.slider_mut(slot).slide(delta.x);
                self.apply_slider(state, slot, value);
            }
            Drag::Marquee { anchor, .. } => {
                let rect = Rect::from_corners(anchor, p);
                self.drag = Drag::Marquee { anchor, rect };
                self.selected.clear();
                for e in state.enemies.iter_mut() {
                    e.edit.selected = e.collides_with(&rect);
                    if e.edit.selected {
                        self.selected.push(e.id);
                    }
                }
                self.update_enemy_sliders(state);
            }
        }
        self.pointer = p;
        self.tidy(state);
    }

    pub fn mouse_up(&mut self, state: &mut GameState, p: Vec2) {
        if self.playing {
            return;
        }
        if let Drag::Link(child) = self.drag {
            let hits: Vec<EnemyId> = state
                .enemies
                .iter()
                .filter(|e| e.id != child && e.bounds().contains(p))
                .map(|e| e.id)
                .collect();
            if hits.is_empty() {
                link(state, child, None);
            }
            // Overlapping targets: the last one that does not close a cycle wins
            for target in hits {
                link(state, child, Some(target));
            }
        }
        self.drag = Drag::Idle;
        self.tidy(state);
    }

    /// Deactivate every selected enemy
    pub fn delete_selected(&mut self, state: &mut GameState) {
        for id in self.selected.drain(..) {
            if let Some(e) = state.enemy_mut(id) {
                e.active = false;
            }
        }
        self.show_enemy_sliders = false;
        self.tidy(state);
    }

    /// Copy the most recently selected enemy
    ///
    /// Plain copy drops one clone down and to the side. With shift the
    /// source's row is filled with clones outward in both directions until
    /// they would leave the field.
    pub fn copy_selected(&mut self, state: &mut GameState, fill_row: bool) {
        let Some(&source_id) = self.selected.last() else {
            return;
        };
        let Some(source) = state.enemy(source_id).cloned() else {
            return;
        };
        let w = self.field.width;
        let step = source.size.x + COPY_GAP;
        let mut spots = Vec::new();
        if fill_row {
            self.clear_selection(state);
            self.select(state, source_id);
            let mut x = source.pos.x - step;
            while x > 0.0 {
                spots.push(Vec2::new(x, source.pos.y));
                x -= step;
            }
            x = source.pos.x + step;
            while x < w - source.size.x {
                spots.push(Vec2::new(x, source.pos.y));
                x += step;
            }
        } else {
            let half = source.size.x / 2.0;
            let x = if source.pos.x > w {
                source.pos.x - half
            } else {
                source.pos.x + half
            };
            spots.push(Vec2::new(x, source.pos.y + half));
        }
        for pos in spots {
            let id = state.next_entity_id();
            let copy = source.spawn_copy(id, pos, &self.field, &mut state.rng);
            state.enemies.push(copy);
            self.select(state, id);
        }
        self.update_enemy_sliders(state);
    }

    /// Flip the attacker mark on the selection
    ///
    /// When every selected enemy is already an attacker they are all
    /// unmarked; otherwise they are all marked.
    pub fn toggle_attackers(&mut self, state: &mut GameState) {
        let all = self
            .selected
            .iter()
            .all(|id| state.enemy(*id).is_some_and(|e| e.edit.attacker));
        for id in &self.selected {
            if let Some(e) = state.enemy_mut(*id) {
                e.edit.attacker = !all;
            }
        }
    }

    fn apply_slider(&mut self, state: &mut GameState, slot: SliderSlot, value: f32) {
        for id in &self.selected {
            let Some(e) = state.enemies.iter_mut().find(|e| e.id == *id) else {
                continue;
            };
            match slot {
                SliderSlot::Health => e.health = value.round() as i32,
                SliderSlot::ShotInterval => {
                    e.shot_freq = value * TICKS_PER_SECOND as f32;
                    e.rearm(&mut state.rng);
                }
                SliderSlot::Speed => e.speed = value,
                SliderSlot::AttackInterval | SliderSlot::PlayerLives | SliderSlot::PlayerMissiles => {}
            }
        }
    }

    /// Show the per-enemy sliders next to the selection when it is one type
    fn update_enemy_sliders(&mut self, state: &GameState) {
        let first = self.selected.first().and_then(|id| state.enemy(*id));
        let same_kind = first.is_some_and(|f| {
            self.selected
                .iter()
                .all(|id| state.enemy(*id).is_some_and(|e| e.kind == f.kind))
        });
        let Some(e) = first.filter(|_| same_kind) else {
            self.show_enemy_sliders = false;
            return;
        };
        self.show_enemy_sliders = true;
        let x = if e.pos.x < self.field.width - 120.0 {
            e.pos.x + e.size.x + 10.0
        } else {
            e.pos.x - ENEMY_SLIDER_WIDTH - 5.0
        };
        let y = e.pos.y + e.size.y;
        self.health.set_pos(Vec2::new(x, y));
        self.health.set_value(e.health as f32);
        self.shot_interval.set_pos(Vec2::new(x, y + 40.0));
        self.shot_interval
            .set_value(e.shot_freq / TICKS_PER_SECOND as f32);
        self.speed.set_pos(Vec2::new(x, y + 80.0));
        self.speed.set_value(e.speed);
    }

    fn select(&mut self, state: &mut GameState, id: EnemyId) {
        if let Some(e) = state.enemy_mut(id) {
            e.edit.selected = true;
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    fn deselect(&mut self, state: &mut GameState, id: EnemyId) {
        if let Some(e) = state.enemy_mut(id) {
            e.edit.selected = false;
        }
        self.selected.retain(|s| *s != id);
    }

    fn clear_selection(&mut self, state: &mut GameState) {
        for e in state.enemies.iter_mut() {
            e.edit.selected = false;
        }
        self.selected.clear();
    }

    /// Drop deleted enemies and pull strays back onto the field
    fn tidy(&mut self, state: &mut GameState) {
        state.enemies.retain(|e| e.active);
        let (w, h) = (self.field.width, self.field.height);
        for e in state.enemies.iter_mut() {
            if e.pos.x + e.size.x < 0.0 {
                e.pos.x = 0.0;
            } else if e.pos.x > w {
                e.pos.x = w - e.size.x;
            }
            if e.pos.y < 0.0 {
                e.pos.y = 0.0;
            } else if e.pos.y > h {
                e.pos.y = h - e.size.y;
            }
        }
        self.selected
            .retain(|id| state.enemies.iter().any(|e| e.id == *id));
    }

    /// Hand the roster to the simulation
    ///
    /// Positions and health are snapshotted so [`Editor::stop`] can undo
    /// everything the run does. Enemies marked as attackers that have an
    /// attack path form the pool.
    pub fn play(&mut self, state: &mut GameState) {
        self.clear_selection(state);
        self.show_enemy_sliders = false;
        self.drag = Drag::Idle;
        self.playing = true;
        self.play_button.set_label("STOP");
        self.roster = state.enemies.iter().map(|e| e.id).collect();

        let field = state.field;
        for e in state.enemies.iter_mut() {
            e.edit.snapshot = Some(EditSnapshot {
                pos: e.pos,
                health: e.health,
            });
            e.restart_entry(&field, &mut state.rng);
        }
        let attackers: Vec<EnemyId> = state
            .enemies
            .iter()
            .filter(|e| e.edit.attacker)
            .map(|e| e.id)
            .collect();

        state.fallen.clear();
        state.mines.clear();
        state.player_shots.clear();
        state.enemy_shots.clear();
        state.is_over = false;
        let lives = self.player_lives.display_value().round().max(1.0) as u32;
        state.player.setup_lives(lives, &field);
        state.player.missiles = self.player_missiles.display_value().round() as u32;
        levels::load_custom(state, self.attack_interval.value(), &attackers);
        log::info!(
            "Editor play: {} enemies, {} attackers",
            self.roster.len(),
            state.active_pool.len()
        );
    }

    /// Restore the roster as it was when play started
    pub fn stop(&mut self, state: &mut GameState) {
        self.playing = false;
        self.play_button.set_label("PLAY");
        let mut pool: Vec<Enemy> = std::mem::take(&mut state.enemies);
        pool.append(&mut state.fallen);
        let mut restored = Vec::with_capacity(self.roster.len());
        for id in self.roster.drain(..) {
            let Some(idx) = pool.iter().position(|e| e.id == id) else {
                continue;
            };
            let mut e = pool.swap_remove(idx);
            if let Some(snap) = e.edit.snapshot.take() {
                e.pos = snap.pos;
                e.health = snap.health;
            }
            e.active = true;
            e.mode = EnemyMode::Hover;
            restored.push(e);
        }
        state.clear_entities();
        state.explosions.clear();
        state.powerups.clear();
        state.attack_freq = None;
        state.is_over = false;
        state.player.lives.clear();
        state.player.visible = false;
        state.enemies = restored;
        log::info!("Editor stop: {} enemies restored", state.enemies.len());
    }
}

/// Make `target` the parent of `child`, or clear the link when `target` is
/// `None`
///
/// A link that would close a cycle is rejected and leaves the old parent.
/// Returns whether the parent changed.
pub fn link(state: &mut GameState, child: EnemyId, target: Option<EnemyId>) -> bool {
    let Some(target) = target else {
        if let Some(c) = state.enemy_mut(child) {
            c.parent = None;
        }
        return true;
    };
    let mut seen = HashSet::new();
    let mut current = Some(target);
    while let Some(id) = current {
        if id == child {
            log::debug!("Rejected link {:?} -> {:?}: cycle", child, target);
            return false;
        }
        if !seen.insert(id) {
            break;
        }
        current = state.lookup(id).and_then(|e| e.parent);
    }
    match state.enemy_mut(child) {
        Some(c) => {
            c.parent = Some(target);
            true
        }
        None => false,
    }
}

/// Closest ancestor still on the field, for drawing formation links
pub fn nearest_live_ancestor(state: &GameState, id: EnemyId) -> Option<EnemyId> {
    let mut seen = HashSet::new();
    let mut current = state.enemy(id)?.parent;
    while let Some(pid) = current {
        if !seen.insert(pid) {
            return None;
        }
        let parent = state.lookup(pid)?;
        if parent.active {
            return Some(pid);
        }
        current = parent.parent;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GameState, Editor) {
        let mut state = GameState::new(11);
        let mut editor = Editor::new(&state.field, &Settings::default());
        editor.enter(&mut state);
        (state, editor)
    }

    fn place(state: &mut GameState, kind: EnemyKind, pos: Vec2) -> EnemyId {
        let spec = EnemySpec::new(kind, pos, kind.sprite_size())
            .shot_freq(30.0)
            .entry(EntryPattern::Vertical);
        let id = state.spawn_enemy(spec);
        if let Some(e) = state.enemy_mut(id) {
            e.mode = EnemyMode::Hover;
        }
        id
    }

    fn click(editor: &mut Editor, state: &mut GameState, p: Vec2, mods: Modifiers) {
        editor.mouse_down(state, p, mods);
        editor.mouse_up(state, p);
    }

    const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
    };
    const CONTROL: Modifiers = Modifiers {
        shift: false,
        control: true,
    };

    #[test]
    fn test_link_rejects_cycle() {
        let (mut state, _) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Drone, Vec2::new(150.0, 50.0));
        assert!(link(&mut state, b, Some(a)));
        assert!(!link(&mut state, a, Some(b)));
        assert_eq!(state.enemy(a).and_then(|e| e.parent), None);
        assert_eq!(state.enemy(b).and_then(|e| e.parent), Some(a));
    }

    #[test]
    fn test_control_drag_links_and_empty_drop_unlinks() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Gunner, Vec2::new(150.0, 50.0));
        editor.mouse_down(&mut state, Vec2::new(60.0, 60.0), CONTROL);
        editor.mouse_move(&mut state, Vec2::new(160.0, 60.0));
        assert!(editor.link_line(&state).is_some());
        editor.mouse_up(&mut state, Vec2::new(160.0, 60.0));
        assert_eq!(state.enemy(a).and_then(|e| e.parent), Some(b));
        // The child did not move while linking
        assert_eq!(state.enemy(a).map(|e| e.pos), Some(Vec2::new(50.0, 50.0)));

        editor.mouse_down(&mut state, Vec2::new(60.0, 60.0), CONTROL);
        editor.mouse_up(&mut state, Vec2::new(300.0, 200.0));
        assert_eq!(state.enemy(a).and_then(|e| e.parent), None);
    }

    #[test]
    fn test_link_drop_skips_cycling_overlap() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Drone, Vec2::new(150.0, 50.0));
        let c = place(&mut state, EnemyKind::Drone, Vec2::new(155.0, 55.0));
        assert!(link(&mut state, b, Some(a)));

        // Both b and c sit under the drop point; b would close a cycle
        editor.mouse_down(&mut state, Vec2::new(60.0, 60.0), CONTROL);
        editor.mouse_move(&mut state, Vec2::new(160.0, 60.0));
        editor.mouse_up(&mut state, Vec2::new(160.0, 60.0));
        assert_eq!(state.enemy(a).and_then(|e| e.parent), Some(c));
        assert_eq!(state.enemy(b).and_then(|e| e.parent), Some(a));
    }

    #[test]
    fn test_palette_drag_creates_enemy() {
        let (mut state, mut editor) = setup();
        let entry = editor.palette[1];
        let grab = entry.rect.center();
        editor.mouse_down(&mut state, grab, Modifiers::default());
        editor.mouse_move(&mut state, Vec2::new(200.0, 100.0));
        editor.mouse_up(&mut state, Vec2::new(200.0, 100.0));
        assert_eq!(state.enemies.len(), 1);
        let e = &state.enemies[0];
        assert_eq!(e.kind, EnemyKind::Gunner);
        assert_eq!(e.pos, Vec2::new(200.0, 100.0));
        assert_eq!(editor.selection(), &[e.id]);
        assert!(editor.show_enemy_sliders);
    }

    #[test]
    fn test_marquee_selects_overlapping() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Drone, Vec2::new(120.0, 50.0));
        place(&mut state, EnemyKind::Drone, Vec2::new(300.0, 200.0));
        editor.mouse_down(&mut state, Vec2::new(40.0, 40.0), Modifiers::default());
        editor.mouse_move(&mut state, Vec2::new(130.0, 60.0));
        assert!(editor.marquee().is_some());
        editor.mouse_up(&mut state, Vec2::new(130.0, 60.0));
        assert_eq!(editor.selection(), &[a, b]);
        assert!(editor.marquee().is_none());
    }

    #[test]
    fn test_shift_click_toggles_membership() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Twin, Vec2::new(150.0, 50.0));
        click(&mut editor, &mut state, Vec2::new(60.0, 60.0), Modifiers::default());
        click(&mut editor, &mut state, Vec2::new(160.0, 60.0), SHIFT);
        assert_eq!(editor.selection(), &[a, b]);
        // Mixed types hide the per-enemy sliders
        assert!(!editor.show_enemy_sliders);
        click(&mut editor, &mut state, Vec2::new(60.0, 60.0), SHIFT);
        assert_eq!(editor.selection(), &[b]);
        assert!(editor.show_enemy_sliders);
    }

    #[test]
    fn test_drag_moves_selection() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        editor.mouse_down(&mut state, Vec2::new(60.0, 60.0), Modifiers::default());
        editor.mouse_move(&mut state, Vec2::new(90.0, 80.0));
        editor.mouse_up(&mut state, Vec2::new(90.0, 80.0));
        assert_eq!(state.enemy(a).map(|e| e.pos), Some(Vec2::new(80.0, 70.0)));
    }

    #[test]
    fn test_fill_row_copies() {
        let (mut state, mut editor) = setup();
        let src = place(&mut state, EnemyKind::Drone, Vec2::new(200.0, 80.0));
        click(&mut editor, &mut state, Vec2::new(210.0, 90.0), Modifiers::default());
        editor.copy_selected(&mut state, true);
        // Step 51: left at 149, 98, 47; right at 251, 302, 353, 404
        assert_eq!(state.enemies.len(), 8);
        assert_eq!(editor.selection().len(), 8);
        assert_eq!(editor.selection()[0], src);
        assert!(state.enemies.iter().all(|e| e.pos.y == 80.0));
        assert!(state.enemies.iter().all(|e| e.pos.x > 0.0 && e.pos.x < 480.0 - 36.0));
    }

    #[test]
    fn test_single_copy_offsets_and_keeps_tuning() {
        let (mut state, mut editor) = setup();
        let src = place(&mut state, EnemyKind::Gunner, Vec2::new(100.0, 80.0));
        if let Some(e) = state.enemy_mut(src) {
            e.health = 4;
        }
        click(&mut editor, &mut state, Vec2::new(110.0, 90.0), Modifiers::default());
        editor.copy_selected(&mut state, false);
        let copy = state.enemies.last().expect("copy added");
        assert_ne!(copy.id, src);
        assert_eq!(copy.pos, Vec2::new(118.0, 98.0));
        assert_eq!(copy.health, 4);
        assert_eq!(copy.parent, None);
        assert_eq!(state.enemy(src).map(|e| e.pos), Some(Vec2::new(100.0, 80.0)));
    }

    #[test]
    fn test_delete_and_attackers() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Drone, Vec2::new(150.0, 50.0));
        click(&mut editor, &mut state, Vec2::new(60.0, 60.0), Modifiers::default());
        editor.toggle_attackers(&mut state);
        assert!(state.enemy(a).is_some_and(|e| e.edit.attacker));
        editor.toggle_attackers(&mut state);
        assert!(state.enemy(a).is_some_and(|e| !e.edit.attacker));
        editor.delete_selected(&mut state);
        assert!(state.enemy(a).is_none());
        assert!(state.enemy(b).is_some());
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_health_slider_drag() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        click(&mut editor, &mut state, Vec2::new(60.0, 60.0), Modifiers::default());
        let knob = editor.health.knob();
        editor.mouse_down(&mut state, knob, Modifiers::default());
        // One step is 75 / 9 pixels
        editor.mouse_move(&mut state, knob + Vec2::new(75.0 / 9.0 * 3.0, 0.0));
        editor.mouse_up(&mut state, knob);
        assert_eq!(state.enemy(a).map(|e| e.health), Some(4));
    }

    #[test]
    fn test_strays_are_pulled_back() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        editor.mouse_down(&mut state, Vec2::new(60.0, 60.0), Modifiers::default());
        editor.mouse_move(&mut state, Vec2::new(-100.0, -100.0));
        editor.mouse_up(&mut state, Vec2::new(-100.0, -100.0));
        assert_eq!(state.enemy(a).map(|e| e.pos), Some(Vec2::ZERO));
    }

    #[test]
    fn test_play_then_stop_restores() {
        let (mut state, mut editor) = setup();
        let a = place(&mut state, EnemyKind::Gunner, Vec2::new(50.0, 50.0));
        let b = place(&mut state, EnemyKind::Drone, Vec2::new(150.0, 50.0));
        click(&mut editor, &mut state, Vec2::new(60.0, 60.0), Modifiers::default());
        editor.toggle_attackers(&mut state);
        editor.play(&mut state);
        assert!(editor.is_playing());
        assert_eq!(state.active_pool, vec![a]);
        assert_eq!(state.player.lives_left(), 3);
        assert!(state.enemies.iter().all(|e| e.mode == EnemyMode::Init));

        state.damage_enemy(b, 1);
        state.retire_inactive();
        if let Some(e) = state.enemy_mut(a) {
            e.pos = Vec2::new(300.0, 400.0);
        }
        editor.stop(&mut state);
        assert!(!editor.is_playing());
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.enemies[0].id, a);
        assert_eq!(state.enemies[0].pos, Vec2::new(50.0, 50.0));
        assert_eq!(state.enemies[1].health, 1);
        assert!(state.enemies.iter().all(|e| e.active));
        assert!(state.player.lives.is_empty());
    }

    #[test]
    fn test_exit_stashes_roster() {
        let (mut state, mut editor) = setup();
        place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 50.0));
        editor.exit(&mut state);
        assert!(state.enemies.is_empty());
        editor.enter(&mut state);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_buttons() {
        let (mut state, mut editor) = setup();
        let play = editor.play_button.rect.center();
        assert_eq!(
            editor.mouse_down(&mut state, play, Modifiers::default()),
            EditorAction::Play
        );
        let help = editor.help_button.rect.center();
        editor.mouse_down(&mut state, help, Modifiers::default());
        assert!(!editor.show_help);
        assert_eq!(editor.help_button.label, "HELP");
        let main = editor.main_button.rect.center();
        assert_eq!(
            editor.mouse_down(&mut state, main, Modifiers::default()),
            EditorAction::Exit
        );
    }

    #[test]
    fn test_nearest_live_ancestor_skips_dead() {
        let (mut state, _) = setup();
        let top = place(&mut state, EnemyKind::Twin, Vec2::new(50.0, 50.0));
        let mid = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 90.0));
        let low = place(&mut state, EnemyKind::Drone, Vec2::new(50.0, 130.0));
        link(&mut state, mid, Some(top));
        link(&mut state, low, Some(mid));
        assert_eq!(nearest_live_ancestor(&state, low), Some(mid));
        state.damage_enemy(mid, 1);
        state.retire_inactive();
        assert_eq!(nearest_live_ancestor(&state, low), Some(top));
    }
}
