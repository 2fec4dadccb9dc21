//! Clock and rate utilities for the per-frame loop.
//!
//! Detection timing is driven by frame timestamps in seconds, never by
//! reading the wall clock inside the engine. This module provides:
//! - Seconds to nanoseconds conversion for frame times
//! - A rate controller for throttled side outputs
//! - A frame-rate meter

/// Convert frame-time seconds to nanoseconds. Negative times clamp to zero.
pub fn secs_to_ns(secs: f64) -> u64 {
    (secs.max(0.0) * 1_000_000_000.0) as u64
}

/// Rate controller for throttled outputs such as debug frames.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

/// Frame-rate meter.
///
/// Counts frames over windows of at least one second of frame time and
/// publishes the average rate when a window closes.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    fps: f64,
    frames_in_window: u32,
    window_start: Option<f64>,
}

impl FpsMeter {
    const WINDOW_SECS: f64 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame at `now` seconds and return the current rate.
    pub fn tick(&mut self, now: f64) -> f64 {
        let start = *self.window_start.get_or_insert(now);
        self.frames_in_window += 1;

        let elapsed = now - start;
        if elapsed > Self::WINDOW_SECS {
            self.fps = self.frames_in_window as f64 / elapsed;
            self.frames_in_window = 0;
            self.window_start = Some(now);
        }
        self.fps
    }

    /// Most recently published rate.
    pub fn fps(&self) -> f64 {
        self.fps
    }
}
