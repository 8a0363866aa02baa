//! Session flow
//!
//! [`Game`] owns everything a running session needs: the simulation state,
//! the editor, preferences, the asset catalog, audio and the store that
//! checkpoints go to. The host forwards keys, pointer events, asset load
//! notifications and frame times; [`Game::render`] draws the current screen.

use glam::Vec2;

use crate::assets::{AssetCatalog, AssetKey};
use crate::audio::{AudioManager, SoundEffect};
use crate::consts::{PLAYER_START_LIVES, PLAYER_START_MISSILES};
use crate::editor::{Button, Editor, EditorAction, widgets::text_width};
use crate::persistence::SaveSlot;
use crate::platform::{FixedClock, Key, KeyState, KeyValueStore};
use crate::renderer::{self, RenderTarget};
use crate::sim::{GameMode, GameState, TickOutcome, levels, tick};
use crate::{GameError, Rect, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Waiting on the core sprites
    Loading,
    Menu,
    Playing,
    GameOver { won: bool },
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewGame,
    Continue,
    LevelEditor,
    RestartGame,
    ReplayLevel,
}

/// Startup options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { seed: 0x5eed }
    }
}

pub struct Game {
    pub state: GameState,
    pub editor: Editor,
    pub settings: Settings,
    pub assets: AssetCatalog,
    audio: AudioManager,
    store: Box<dyn KeyValueStore>,
    keys: KeyState,
    clock: FixedClock,
    screen: Screen,
    world: usize,
    level: usize,
    paused: bool,
    has_checkpoint: bool,
    buttons: Vec<(MenuChoice, Button)>,
    pause_button: Rect,
    sound_button: Rect,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("screen", &self.screen)
            .field("world", &self.world)
            .field("level", &self.level)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Start a session on a host surface
    ///
    /// Without a render target nothing can be shown; this is the only
    /// startup failure.
    pub fn boot(
        target: Option<&dyn RenderTarget>,
        config: GameConfig,
        store: Box<dyn KeyValueStore>,
        audio: AudioManager,
    ) -> Result<Self, GameError> {
        let target = target.ok_or(GameError::NoRenderContext)?;
        let size = target.size();
        log::info!("Booting on a {}x{} surface", size.x, size.y);
        Ok(Self::new(config, store, audio))
    }

    pub fn new(config: GameConfig, store: Box<dyn KeyValueStore>, mut audio: AudioManager) -> Self {
        let settings = Settings::load(store.as_ref());
        audio.set_muted(!settings.sound_on);
        let state = GameState::new(config.seed);
        let editor = Editor::new(&state.field, &settings);
        let has_checkpoint = SaveSlot::exists(store.as_ref());
        let w = state.field.width;
        Self {
            state,
            editor,
            settings,
            assets: AssetCatalog::new(),
            audio,
            store,
            keys: KeyState::new(),
            clock: FixedClock::new(),
            screen: Screen::Loading,
            world: 0,
            level: 0,
            paused: false,
            has_checkpoint,
            buttons: Vec::new(),
            pause_button: Rect::new(w - 28.0, 4.0, 24.0, 24.0),
            sound_button: Rect::new(w - 52.0, 6.0, 20.0, 20.0),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Zero-based world and level of the current run
    pub fn position(&self) -> (usize, usize) {
        (self.world, self.level)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_checkpoint(&self) -> bool {
        self.has_checkpoint
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons.iter().map(|(_, b)| b)
    }

    pub fn choices(&self) -> Vec<MenuChoice> {
        self.buttons.iter().map(|(c, _)| *c).collect()
    }

    pub fn pause_button(&self) -> Rect {
        self.pause_button
    }

    pub fn sound_button(&self) -> Rect {
        self.sound_button
    }

    /// Simulation is live: a campaign level or an editor preview
    fn simulating(&self) -> bool {
        match self.screen {
            Screen::Playing => true,
            Screen::Editor => self.editor.is_playing(),
            _ => false,
        }
    }

    // === Assets ===

    pub fn on_asset_loaded(&mut self, key: AssetKey) {
        if self.assets.on_loaded(key) && self.screen == Screen::Loading {
            self.show_menu();
        }
    }

    pub fn on_asset_failed(&mut self, key: AssetKey, reason: &str) {
        self.assets.on_failed(key, reason);
    }

    /// Treat every asset as present (headless hosts)
    pub fn skip_loading(&mut self) {
        self.assets.mark_all_loaded();
        if self.screen == Screen::Loading {
            self.show_menu();
        }
    }

    // === Flow ===

    pub fn show_menu(&mut self) {
        self.clock.stop();
        self.screen = Screen::Menu;
        self.state.mode = GameMode::Menu;
        self.state.clear_entities();
        self.state.player.visible = false;

        let w = self.state.field.width;
        let top = self.state.field.height / 3.0;
        let text_h = 18.0;
        self.buttons.clear();
        if self.has_checkpoint {
            let new_w = text_width("NEW GAME");
            self.buttons.push((
                MenuChoice::NewGame,
                Button::new("NEW GAME", Vec2::new(w / 2.0 - (new_w + 15.0), top + 15.0), text_h),
            ));
            self.buttons.push((
                MenuChoice::Continue,
                Button::new("CONTINUE", Vec2::new(w / 2.0 + 15.0, top + 15.0), text_h),
            ));
        } else {
            let new_w = text_width("NEW GAME");
            self.buttons.push((
                MenuChoice::NewGame,
                Button::new("NEW GAME", Vec2::new(w / 2.0 - new_w / 2.0, top), text_h),
            ));
        }
        let editor_w = text_width("LEVEL EDITOR");
        self.buttons.push((
            MenuChoice::LevelEditor,
            Button::new(
                "LEVEL EDITOR",
                Vec2::new(w / 2.0 - editor_w / 2.0, top + text_h + 45.0),
                text_h,
            ),
        ));
    }

    pub fn choose(&mut self, choice: MenuChoice) {
        log::debug!("Menu choice {:?}", choice);
        self.buttons.clear();
        match choice {
            MenuChoice::NewGame => {
                self.audio.play(SoundEffect::Ambience, &self.assets);
                self.state.mode = GameMode::Single;
                self.restart_game();
            }
            MenuChoice::Continue => {
                self.audio.play(SoundEffect::Ambience, &self.assets);
                self.state.mode = GameMode::Single;
                self.continue_game();
            }
            MenuChoice::LevelEditor => {
                self.audio.play(SoundEffect::Ambience, &self.assets);
                self.enter_editor();
            }
            MenuChoice::RestartGame => self.restart_game(),
            MenuChoice::ReplayLevel => self.continue_game(),
        }
    }

    fn restart_game(&mut self) {
        self.state.is_over = false;
        self.state.score = 0;
        self.world = 0;
        self.level = 0;
        self.state.player.missiles = PLAYER_START_MISSILES;
        let field = self.state.field;
        self.state.player.setup_lives(PLAYER_START_LIVES, &field);
        self.start_level();
    }

    /// Resume from the checkpoint, or replay the current level from
    /// scratch when there is none
    fn continue_game(&mut self) {
        self.state.is_over = false;
        let field = self.state.field;
        match SaveSlot::load(self.store.as_ref()) {
            Some(slot) => {
                self.world = slot.world;
                self.level = slot.level;
                self.state.score = slot.score;
                self.state.player.setup_lives(slot.lives, &field);
            }
            None => {
                self.state.score = 0;
                self.state.player.setup_lives(PLAYER_START_LIVES, &field);
            }
        }
        self.state.player.missiles = PLAYER_START_MISSILES;
        self.start_level();
    }

    fn start_level(&mut self) {
        let Some(level) = levels::level(self.world, self.level) else {
            log::warn!(
                "No level {}-{}, back to the menu",
                self.world + 1,
                self.level + 1
            );
            self.show_menu();
            return;
        };
        self.state.explosions.clear();
        self.state.powerups.clear();
        level.load(&mut self.state);
        self.state.player.visible = true;
        self.screen = Screen::Playing;
        log::info!("Level {}-{} started", self.world + 1, self.level + 1);
        if !self.paused {
            self.clock.start();
        }
    }

    fn level_won(&mut self) {
        self.clock.stop();
        if self.screen == Screen::Editor {
            self.editor.stop(&mut self.state);
            return;
        }
        log::info!(
            "Level {}-{} cleared, score {}",
            self.world + 1,
            self.level + 1,
            self.state.score
        );
        match levels::next(self.world, self.level) {
            Some((world, level)) => {
                self.world = world;
                self.level = level;
                self.start_level();
                self.save_checkpoint();
            }
            None => self.game_over(true),
        }
    }

    fn save_checkpoint(&mut self) {
        let slot = SaveSlot {
            world: self.world,
            level: self.level,
            score: self.state.score,
            lives: self.state.player.lives_left() as u32,
        };
        match slot.save(self.store.as_mut()) {
            Ok(()) => self.has_checkpoint = true,
            Err(e) => log::warn!("Checkpoint not saved: {}", e),
        }
    }

    fn game_over(&mut self, won: bool) {
        self.clock.stop();
        if self.screen == Screen::Editor {
            self.editor.stop(&mut self.state);
            return;
        }
        self.screen = Screen::GameOver { won };
        if won {
            log::info!("Campaign won, final score {}", self.state.score);
        } else {
            log::info!("Game over at level {}-{}", self.world + 1, self.level + 1);
        }

        let w = self.state.field.width;
        let y = self.state.field.height / 2.0 + 20.0 + 24.0;
        let restart_w = text_width("Restart Game");
        self.buttons.clear();
        self.buttons.push((
            MenuChoice::RestartGame,
            Button::new("Restart Game", Vec2::new(w / 2.0 - (restart_w + 15.0), y), 24.0),
        ));
        if !won {
            self.buttons.push((
                MenuChoice::ReplayLevel,
                Button::new("Replay Level", Vec2::new(w / 2.0 + 15.0, y), 24.0),
            ));
        }
    }

    pub fn enter_editor(&mut self) {
        self.clock.stop();
        self.state.is_over = false;
        self.state.mode = GameMode::Edit;
        self.screen = Screen::Editor;
        self.editor.enter(&mut self.state);
    }

    fn exit_editor(&mut self) {
        self.clock.stop();
        self.editor.exit(&mut self.state);
        self.editor.store_preferences(&mut self.settings);
        self.save_settings();
        self.show_menu();
    }

    // === Pause / sound ===

    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.keys.clear();
        self.clock.stop();
        log::info!("Paused");
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if self.simulating() {
            self.clock.start();
        }
        log::info!("Resumed");
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn toggle_sound(&mut self) {
        self.settings.sound_on = !self.settings.sound_on;
        self.audio.set_muted(!self.settings.sound_on);
        if self.settings.sound_on {
            self.audio.play(SoundEffect::Ambience, &self.assets);
        }
        self.save_settings();
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Settings not saved: {}", e);
        }
    }

    // === Input ===

    /// Key went down; returns whether the host should suppress the
    /// browser default for it
    pub fn key_down(&mut self, key: Key) -> bool {
        if matches!(key, Key::KeyP | Key::Escape) {
            if self.simulating() || self.paused {
                self.toggle_pause();
            }
            return key.is_game_key();
        }
        if self.paused {
            return key.is_game_key();
        }
        let fresh = self.keys.press(key);
        if fresh && self.screen == Screen::Editor && !self.editor.is_playing() {
            match key {
                Key::Delete | Key::Backspace => self.editor.delete_selected(&mut self.state),
                Key::KeyC => self.editor.copy_selected(&mut self.state, self.keys.shift()),
                Key::KeyA => self.editor.toggle_attackers(&mut self.state),
                _ => {}
            }
        }
        key.is_game_key()
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys.release(key);
    }

    /// Window lost focus
    pub fn blur(&mut self) {
        self.keys.clear();
    }

    pub fn pointer_down(&mut self, p: Vec2) {
        if self.pause_button.contains(p) {
            self.toggle_pause();
            return;
        }
        if self.sound_button.contains(p) {
            self.toggle_sound();
            return;
        }
        match self.screen {
            Screen::Loading | Screen::Playing => {}
            Screen::Menu | Screen::GameOver { .. } => {
                let choice = self
                    .buttons
                    .iter()
                    .find(|(_, b)| b.hit(p))
                    .map(|(c, _)| *c);
                if let Some(choice) = choice {
                    self.choose(choice);
                }
            }
            Screen::Editor => {
                let mods = self.keys.modifiers();
                match self.editor.mouse_down(&mut self.state, p, mods) {
                    EditorAction::None => {}
                    EditorAction::Play => {
                        self.editor.play(&mut self.state);
                        if !self.paused {
                            self.clock.start();
                        }
                    }
                    EditorAction::Stop => {
                        self.clock.stop();
                        self.editor.stop(&mut self.state);
                    }
                    EditorAction::Exit => self.exit_editor(),
                }
            }
        }
    }

    pub fn pointer_move(&mut self, p: Vec2) {
        for (_, b) in self.buttons.iter_mut() {
            b.hover = b.hit(p);
        }
        if self.screen == Screen::Editor {
            self.editor.hover(p);
            self.editor.mouse_move(&mut self.state, p);
        }
    }

    pub fn pointer_up(&mut self, p: Vec2) {
        if self.screen == Screen::Editor {
            self.editor.mouse_up(&mut self.state, p);
        }
    }

    // === Frame ===

    /// Advance by `dt` seconds of wall time; returns the ticks run
    pub fn frame(&mut self, dt: f32) -> u32 {
        let steps = self.clock.advance(dt);
        let mut ran = 0;
        for _ in 0..steps {
            if !self.clock.is_running() {
                break;
            }
            self.step();
            ran += 1;
        }
        ran
    }

    fn step(&mut self) {
        let input = self.keys.tick_input();
        let outcome = tick(&mut self.state, &input);
        let events = self.state.drain_events();
        self.audio.play_events(&events, &self.assets);
        match outcome {
            TickOutcome::Running => {}
            TickOutcome::LevelCleared => self.level_won(),
            TickOutcome::GameOver => self.game_over(false),
        }
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        renderer::draw_frame(target, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::platform::MemoryStore;
    use crate::renderer::DrawList;
    use crate::sim::EnemyKind;
    use crate::sim::enemy::EnemySpec;
    use crate::sim::path::EntryPattern;

    fn game_with(store: MemoryStore) -> Game {
        let mut game = Game::new(GameConfig { seed: 3 }, Box::new(store), AudioManager::default());
        game.skip_loading();
        game
    }

    fn game() -> Game {
        game_with(MemoryStore::new())
    }

    fn click(game: &mut Game, choice: MenuChoice) {
        let at = game
            .buttons
            .iter()
            .find(|(c, _)| *c == choice)
            .map(|(_, b)| b.rect.center())
            .expect("button shown");
        game.pointer_down(at);
    }

    fn run(game: &mut Game, ticks: u32) {
        for _ in 0..ticks {
            game.frame(SIM_DT);
        }
    }

    #[test]
    fn test_boot_requires_target() {
        let err = Game::boot(None, GameConfig::default(), Box::new(MemoryStore::new()), AudioManager::default());
        assert!(matches!(err, Err(GameError::NoRenderContext)));
        let list = DrawList::new(Vec2::new(480.0, 560.0));
        let ok = Game::boot(
            Some(&list),
            GameConfig::default(),
            Box::new(MemoryStore::new()),
            AudioManager::default(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_loading_waits_for_core_sprites() {
        let mut game = Game::new(GameConfig::default(), Box::new(MemoryStore::new()), AudioManager::default());
        assert_eq!(game.screen(), Screen::Loading);
        game.on_asset_failed(AssetKey::Sprite(crate::assets::SpriteId::Life), "missing");
        game.on_asset_loaded(AssetKey::Sprite(crate::assets::SpriteId::Star));
        assert_eq!(game.screen(), Screen::Loading);
        for kind in EnemyKind::ALL {
            game.on_asset_loaded(AssetKey::Sprite(crate::assets::SpriteId::Enemy(kind)));
        }
        assert_eq!(game.screen(), Screen::Menu);
        assert_eq!(game.choices(), vec![MenuChoice::NewGame, MenuChoice::LevelEditor]);
    }

    #[test]
    fn test_new_game() {
        let mut game = game();
        click(&mut game, MenuChoice::NewGame);
        assert_eq!(game.screen(), Screen::Playing);
        assert_eq!(game.position(), (0, 0));
        assert_eq!(game.state.enemies.len(), 41);
        assert_eq!(game.state.player.lives_left(), 3);
        assert_eq!(game.state.player.missiles, 2);
        assert_eq!(game.frame(SIM_DT), 1);
    }

    #[test]
    fn test_level_clear_advances_and_saves() {
        let mut game = game();
        game.choose(MenuChoice::NewGame);
        game.state.score = 770;
        game.state.enemies.clear();
        run(&mut game, 1);
        assert_eq!(game.position(), (0, 1));
        assert_eq!(game.screen(), Screen::Playing);
        assert!(game.has_checkpoint());
        let slot = SaveSlot::load(game.store.as_ref()).expect("checkpoint written");
        assert_eq!((slot.world, slot.level, slot.score), (0, 1, 770));
    }

    #[test]
    fn test_world_rollover() {
        let mut game = game();
        game.choose(MenuChoice::NewGame);
        game.level = 3;
        game.state.enemies.clear();
        run(&mut game, 1);
        assert_eq!(game.position(), (1, 0));
    }

    #[test]
    fn test_final_level_wins() {
        let mut game = game();
        game.choose(MenuChoice::NewGame);
        game.world = 4;
        game.level = 0;
        game.state.enemies.clear();
        run(&mut game, 1);
        assert_eq!(game.screen(), Screen::GameOver { won: true });
        assert_eq!(game.choices(), vec![MenuChoice::RestartGame]);
        // Clock stopped with the screen
        assert_eq!(game.frame(SIM_DT), 0);
    }

    #[test]
    fn test_game_over_and_replay_from_checkpoint() {
        let mut store = MemoryStore::new();
        SaveSlot {
            world: 1,
            level: 2,
            score: 5000,
            lives: 2,
        }
        .save(&mut store)
        .expect("memory store");
        let mut game = game_with(store);
        assert_eq!(
            game.choices(),
            vec![MenuChoice::NewGame, MenuChoice::Continue, MenuChoice::LevelEditor]
        );
        game.choose(MenuChoice::NewGame);
        game.state.is_over = true;
        game.state.game_over_timer = 1;
        run(&mut game, 1);
        assert_eq!(game.screen(), Screen::GameOver { won: false });
        assert_eq!(
            game.choices(),
            vec![MenuChoice::RestartGame, MenuChoice::ReplayLevel]
        );
        click(&mut game, MenuChoice::ReplayLevel);
        assert_eq!(game.screen(), Screen::Playing);
        assert_eq!(game.position(), (1, 2));
        assert_eq!(game.state.score, 5000);
        assert_eq!(game.state.player.lives_left(), 2);
        assert!(!game.state.is_over);
    }

    #[test]
    fn test_pause_stops_the_clock() {
        let mut game = game();
        game.choose(MenuChoice::NewGame);
        run(&mut game, 3);
        let t = game.state.time_ticks;
        game.key_down(Key::KeyP);
        assert!(game.is_paused());
        assert_eq!(game.frame(0.1), 0);
        assert_eq!(game.state.time_ticks, t);
        // Keys pressed while paused are not recorded
        game.key_down(Key::Space);
        game.pointer_down(game.pause_button().center());
        assert!(!game.is_paused());
        assert_eq!(game.frame(SIM_DT), 1);
        assert!(game.state.player_shots.is_empty());
    }

    #[test]
    fn test_sound_toggle_persists() {
        let mut game = game();
        assert!(game.settings.sound_on);
        game.pointer_down(game.sound_button().center());
        assert!(!game.settings.sound_on);
        assert!(game.audio.is_muted());
        assert!(!Settings::load(game.store.as_ref()).sound_on);
    }

    #[test]
    fn test_editor_preview_restores_on_clear() {
        let mut game = game();
        click(&mut game, MenuChoice::LevelEditor);
        assert_eq!(game.screen(), Screen::Editor);
        let spec = EnemySpec::new(EnemyKind::Drone, Vec2::new(100.0, 100.0), EnemyKind::Drone.sprite_size())
            .entry(EntryPattern::Vertical);
        let id = game.state.spawn_enemy(spec);
        game.pointer_down(game.editor.play_button.rect.center());
        assert!(game.editor.is_playing());
        assert_eq!(game.frame(SIM_DT), 1);

        game.state.damage_enemy(id, 5);
        run(&mut game, 1);
        assert!(!game.editor.is_playing());
        assert_eq!(game.screen(), Screen::Editor);
        assert_eq!(game.state.enemies.len(), 1);
        assert_eq!(game.state.enemies[0].pos, Vec2::new(100.0, 100.0));
        // Back to authoring: no ticks
        assert_eq!(game.frame(SIM_DT), 0);
    }

    #[test]
    fn test_editor_shortcuts_and_exit() {
        let mut game = game();
        game.choose(MenuChoice::LevelEditor);
        let spec = EnemySpec::new(EnemyKind::Drone, Vec2::new(100.0, 100.0), EnemyKind::Drone.sprite_size());
        game.state.spawn_enemy(spec);
        game.pointer_down(Vec2::new(110.0, 110.0));
        game.pointer_up(Vec2::new(110.0, 110.0));
        game.key_down(Key::KeyC);
        assert_eq!(game.state.enemies.len(), 2);
        // Held key does not repeat
        game.key_down(Key::KeyC);
        assert_eq!(game.state.enemies.len(), 2);
        game.key_up(Key::KeyC);
        // The copy joined the selection, so both go
        game.key_down(Key::Delete);
        assert!(game.state.enemies.is_empty());

        game.state.spawn_enemy(spec);
        game.pointer_down(game.editor.main_button.rect.center());
        assert_eq!(game.screen(), Screen::Menu);
        assert!(game.state.enemies.is_empty());
        game.choose(MenuChoice::LevelEditor);
        assert_eq!(game.state.enemies.len(), 1);
    }

    #[test]
    fn test_render_each_screen() {
        let mut game = game();
        let mut list = DrawList::new(Vec2::new(480.0, 560.0));
        game.render(&mut list);
        assert!(list.has_text("Xenophobia"));
        game.choose(MenuChoice::NewGame);
        list.clear();
        game.render(&mut list);
        assert!(list.has_text("Level 1-1"));
        assert!(list.has_text("Missiles: 2"));
    }
}
