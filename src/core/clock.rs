use std::time::Instant;

/// Longest step a single frame may report, so a stalled window does not
/// skip the whole opening animation
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Frame clock - elapsed seconds between redraws
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Seconds since the previous tick, capped at [`MAX_FRAME_DELTA`]
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta.min(MAX_FRAME_DELTA)
    }

    /// Restart measuring from now, e.g. after the first frame is presented
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009 && delta <= MAX_FRAME_DELTA);
    }

    #[test]
    fn clock_caps_long_stalls() {
        let mut clock = Clock::new();
        clock.last_tick -= Duration::from_secs(3);

        assert_eq!(clock.tick(), MAX_FRAME_DELTA);
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        clock.reset();

        let delta = clock.tick();
        assert!(delta < 0.005);
    }
}
