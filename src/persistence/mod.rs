//! Checkpoint save/load
//!
//! A checkpoint is four integers (world, level, score, lives) plus a flag
//! saying one exists, each stored under its own key so a damaged value
//! only loses itself.

use crate::GameError;
use crate::platform::storage::{KeyValueStore, get_number, set_number};

const KEY_SAVED: &str = "saved";
const KEY_WORLD: &str = "world";
const KEY_LEVEL: &str = "level";
const KEY_SCORE: &str = "score";
const KEY_LIVES: &str = "lives";

/// Progress written after every cleared level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSlot {
    pub world: usize,
    pub level: usize,
    pub score: u64,
    pub lives: u32,
}

impl SaveSlot {
    pub fn exists(store: &dyn KeyValueStore) -> bool {
        get_number(store, KEY_SAVED, 0) != 0
    }

    /// Read the checkpoint; missing fields take the new-game values
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        if !Self::exists(store) {
            return None;
        }
        let slot = Self {
            world: get_number(store, KEY_WORLD, 0).max(0) as usize,
            level: get_number(store, KEY_LEVEL, 0).max(0) as usize,
            score: get_number(store, KEY_SCORE, 0).max(0) as u64,
            lives: get_number(store, KEY_LIVES, 3).max(1) as u32,
        };
        log::info!(
            "Loaded checkpoint: level {}-{}, score {}",
            slot.world + 1,
            slot.level + 1,
            slot.score
        );
        Some(slot)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), GameError> {
        set_number(store, KEY_SAVED, 1)?;
        set_number(store, KEY_WORLD, self.world as i64)?;
        set_number(store, KEY_LEVEL, self.level as i64)?;
        set_number(store, KEY_SCORE, self.score as i64)?;
        set_number(store, KEY_LIVES, i64::from(self.lives))?;
        log::info!("Checkpoint saved at level {}-{}", self.world + 1, self.level + 1);
        Ok(())
    }

    pub fn clear(store: &mut dyn KeyValueStore) -> Result<(), GameError> {
        store.remove(KEY_SAVED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    #[test]
    fn test_no_checkpoint() {
        let store = MemoryStore::new();
        assert!(!SaveSlot::exists(&store));
        assert_eq!(SaveSlot::load(&store), None);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let slot = SaveSlot {
            world: 2,
            level: 1,
            score: 4560,
            lives: 2,
        };
        slot.save(&mut store).expect("memory store");
        assert_eq!(SaveSlot::load(&store), Some(slot));
        SaveSlot::clear(&mut store).expect("memory store");
        assert_eq!(SaveSlot::load(&store), None);
    }

    #[test]
    fn test_damaged_field_defaults() {
        let mut store = MemoryStore::new();
        store.set(KEY_SAVED, "1").expect("set");
        store.set(KEY_SCORE, "NaN").expect("set");
        store.set(KEY_LEVEL, "3").expect("set");
        let slot = SaveSlot::load(&store).expect("flag set");
        assert_eq!(slot.score, 0);
        assert_eq!(slot.level, 3);
        assert_eq!(slot.lives, 3);
    }
}
