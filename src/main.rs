//! Xenophobia entry point
//!
//! The native build has no window; it runs the campaign headless with a
//! simple autopilot, which is handy for soak-testing levels and watching
//! the logs. Browser hosts drive [`xenophobia::Game`] through the library.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;

    use xenophobia::consts::{FIELD_HEIGHT, FIELD_WIDTH, SIM_DT};
    use xenophobia::game::{GameConfig, Screen};
    use xenophobia::platform::storage::FileStore;
    use xenophobia::platform::{Key, KeyValueStore, MemoryStore};
    use xenophobia::renderer::{DrawList, RenderTarget};
    use xenophobia::{Bounded, Game, GameError};

    /// Run the shoot-em-up headless under an autopilot
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// RNG seed for the session
        #[arg(short, long, default_value_t = 1)]
        pub seed: u64,

        /// Ticks to simulate before giving up
        #[arg(short, long, default_value_t = 9000)]
        ticks: u32,

        /// JSON file for checkpoints and settings (memory only when absent)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Resume from the stored checkpoint instead of starting over
        #[arg(long)]
        resume: bool,

        /// Record a frame every N ticks (0 disables drawing)
        #[arg(long, default_value_t = 300)]
        draw_every: u32,
    }

    /// Slide under the closest enemy and keep firing
    fn steer(game: &mut Game, tick: u32) {
        let me = game.state.player.bounds().center().x;
        let target = game
            .state
            .enemies
            .iter()
            .filter(|e| e.active)
            .map(|e| e.bounds().center().x)
            .min_by(|a, b| (a - me).abs().total_cmp(&(b - me).abs()));
        game.key_up(Key::ArrowLeft);
        game.key_up(Key::ArrowRight);
        match target {
            Some(x) if x < me - 4.0 => {
                game.key_down(Key::ArrowLeft);
            }
            Some(x) if x > me + 4.0 => {
                game.key_down(Key::ArrowRight);
            }
            _ => {}
        }
        game.key_down(Key::Space);
        if tick % 150 == 0 {
            game.key_down(Key::ShiftLeft);
        } else {
            game.key_up(Key::ShiftLeft);
        }
    }

    pub fn run(args: Args) -> Result<(), GameError> {
        let store: Box<dyn KeyValueStore> = match &args.store {
            Some(path) => Box::new(FileStore::open(path)),
            None => Box::new(MemoryStore::new()),
        };
        let mut surface = DrawList::new(Vec2::new(FIELD_WIDTH, FIELD_HEIGHT));
        let mut game = Game::boot(
            Some(&surface as &dyn RenderTarget),
            GameConfig { seed: args.seed },
            store,
            Default::default(),
        )?;
        game.skip_loading();
        if args.resume && game.has_checkpoint() {
            game.choose(xenophobia::game::MenuChoice::Continue);
        } else {
            game.choose(xenophobia::game::MenuChoice::NewGame);
        }

        let mut last = game.position();
        for tick in 0..args.ticks {
            steer(&mut game, tick);
            game.frame(SIM_DT);
            if game.position() != last {
                last = game.position();
                log::info!("Autopilot reached level {}-{}", last.0 + 1, last.1 + 1);
            }
            if args.draw_every > 0 && tick % args.draw_every == 0 {
                surface.clear();
                game.render(&mut surface);
                log::debug!("Frame {} recorded {} draw calls", tick, surface.cmds.len());
            }
            if let Screen::GameOver { won } = game.screen() {
                println!(
                    "{} at level {}-{} with score {} after {} ticks",
                    if won { "Won" } else { "Lost" },
                    last.0 + 1,
                    last.1 + 1,
                    game.state.score,
                    tick + 1
                );
                return Ok(());
            }
        }
        println!(
            "Stopped at level {}-{} with score {} ({} lives left)",
            last.0 + 1,
            last.1 + 1,
            game.state.score,
            game.state.player.lives_left()
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let args = headless::Args::parse();
    log::info!("Xenophobia (headless) starting with seed {}", args.seed);
    if let Err(e) = headless::run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library; there is no binary entry point
}
