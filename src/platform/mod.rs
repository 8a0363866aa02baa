//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input (key-state map fed by the host)
//! - Storage (LocalStorage on web, a JSON file natively)
//! - Time (fixed-cadence tick scheduler)

pub mod clock;
pub mod input;
pub mod storage;

pub use clock::FixedClock;
pub use input::{Key, KeyState, Modifiers};
pub use storage::{KeyValueStore, MemoryStore};
