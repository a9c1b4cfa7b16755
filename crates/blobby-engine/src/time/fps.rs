use std::time::Duration;

/// Counts frames over a fixed window and reports frames per second when the
/// window closes.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    frames: u32,
    accumulated: Duration,
    last: Option<f32>,
}

impl FpsCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(1)),
            frames: 0,
            accumulated: Duration::ZERO,
            last: None,
        }
    }

    /// Counts one frame that took `dt`.
    ///
    /// Returns the rate once per window; the counter then starts over.
    pub fn tick(&mut self, dt: Duration) -> Option<f32> {
        self.frames += 1;
        self.accumulated += dt;
        if self.accumulated < self.window {
            return None;
        }

        let fps = self.frames as f32 / self.accumulated.as_secs_f32();
        self.frames = 0;
        self.accumulated = Duration::ZERO;
        self.last = Some(fps);
        Some(fps)
    }

    /// Rate reported by the last completed window.
    pub fn fps(&self) -> Option<f32> {
        self.last
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut fps = FpsCounter::default();
        let frame = Duration::from_millis(20);
        for _ in 0..49 {
            assert_eq!(fps.tick(frame), None);
        }
        let rate = fps.tick(frame).unwrap();
        assert!((rate - 50.0).abs() < 0.01);
        assert_eq!(fps.fps(), Some(rate));

        assert_eq!(fps.tick(frame), None);
        assert_eq!(fps.fps(), Some(rate));
    }

    #[test]
    fn slow_frame_closes_window_alone() {
        let mut fps = FpsCounter::default();
        let rate = fps.tick(Duration::from_secs(2)).unwrap();
        assert!((rate - 0.5).abs() < 1e-6);
    }
}
