//! Frame statistics for the stats readout.
//!
//! Nothing in the scene moves with time, so this only counts frames and
//! estimates frames per second.

use std::time::{Duration, Instant};

/// Frame counting and FPS estimation.
#[derive(Debug)]
pub struct FrameStats {
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Count a presented frame.
    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    fn record_frame_at(&mut self, now: Instant) {
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last update interval.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = FrameStats::new();
        assert_eq!(stats.frame(), 0);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn test_fps_after_interval() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);

        // 30 frames spread over half a second.
        for i in 1..=30u64 {
            stats.record_frame_at(start + Duration::from_micros(i * 500_000 / 30));
        }

        assert_eq!(stats.frame(), 30);
        assert!((stats.fps() - 60.0).abs() < 0.5);
    }

    #[test]
    fn test_fps_waits_for_interval() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        stats.record_frame_at(start + Duration::from_millis(16));
        assert_eq!(stats.frame(), 1);
        assert_eq!(stats.fps(), 0.0);
    }
}
