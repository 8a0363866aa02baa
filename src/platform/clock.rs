//! Fixed-cadence tick scheduler
//!
//! Frame time is accumulated and converted into whole simulation ticks.
//! Stopping the clock is how pausing works: no ticks are produced and the
//! accumulator is discarded so resuming does not fast-forward.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame gap honored; anything longer is treated as a stall
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    accumulator: f32,
    running: bool,
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Feed `dt` seconds of wall time; returns how many ticks to run now
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }
}
