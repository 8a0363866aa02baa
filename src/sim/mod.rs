//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (enemies update in roster order)
//! - No rendering or platform dependencies

pub mod enemy;
pub mod kinds;
pub mod levels;
pub mod objects;
pub mod path;
pub mod scheduler;
pub mod stars;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyId, EnemyMode, EnemySpec};
pub use kinds::EnemyKind;
pub use levels::{Level, WORLDS};
pub use path::{AttackPattern, EntryPattern, Path, PointPath};
pub use scheduler::AttackFrequency;
pub use state::{GameEvent, GameMode, GameState};
pub use tick::{TickInput, TickOutcome, tick};
