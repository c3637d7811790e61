//! Fixed-timestep clock using an accumulator.
//!
//! `draw_web()` fires at roughly 60fps with a variable delta. GameTime turns
//! that into a whole number of fixed ticks so stage timers advance in exact
//! 50ms steps and stay testable without a browser.

/// Game ticks per real-time second.
pub const TICKS_PER_SEC: u32 = 20;

/// Length of one tick. Every stage duration is a multiple of this.
pub const MS_PER_TICK: u32 = 1000 / TICKS_PER_SEC;

/// Longest frame gap fed into the accumulator. Covers backgrounded tabs.
const MAX_FRAME_MS: f64 = 500.0;

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds not yet consumed as ticks
    accumulator: f64,
    /// None until the first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp in ms and get the ticks to run this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        ticks
    }
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TICKS_PER_SEC)
    }
}
