//! The per-refresh render loop.
//!
//! Every tick runs the same three phases in the same order:
//!
//! 1. [`FramePhase::Scene`]: main scene to the default target.
//! 2. [`FramePhase::Bloom`]: off-screen scene render and bloom extraction.
//! 3. [`FramePhase::Composite`]: base scene plus bloom, written over (1).
//!
//! There is no paused or stopped state; the loop runs for as long as the
//! window is open and frame pacing comes from vsync.

use crate::time::FrameStats;

/// One step of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Scene,
    Bloom,
    Composite,
}

impl FramePhase {
    /// Execution order within a tick.
    pub const ORDER: [FramePhase; 3] = [FramePhase::Scene, FramePhase::Bloom, FramePhase::Composite];
}

/// Something that can record and present the phases of a frame.
pub trait FrameStages {
    type Error;

    /// Acquire the output for this frame. On error nothing else is called.
    fn begin_frame(&mut self) -> Result<(), Self::Error>;

    /// Record one phase.
    fn encode(&mut self, phase: FramePhase);

    /// Submit and present.
    fn end_frame(&mut self);
}

/// Drives [`FrameStages`] once per display refresh.
#[derive(Debug, Default)]
pub struct FrameLoop {
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame. A frame either completes every phase or none of them.
    pub fn tick<S: FrameStages>(&mut self, stages: &mut S) -> Result<(), S::Error> {
        stages.begin_frame()?;
        for phase in FramePhase::ORDER {
            stages.encode(phase);
        }
        stages.end_frame();
        self.stats.record_frame();
        Ok(())
    }

    #[inline]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Begin,
        Encode(FramePhase),
        End,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail: bool,
    }

    impl FrameStages for Recorder {
        type Error = &'static str;

        fn begin_frame(&mut self) -> Result<(), Self::Error> {
            self.calls.push(Call::Begin);
            if self.fail {
                Err("surface lost")
            } else {
                Ok(())
            }
        }

        fn encode(&mut self, phase: FramePhase) {
            self.calls.push(Call::Encode(phase));
        }

        fn end_frame(&mut self) {
            self.calls.push(Call::End);
        }
    }

    #[test]
    fn test_tick_order() {
        let mut frame_loop = FrameLoop::new();
        let mut recorder = Recorder::default();

        frame_loop.tick(&mut recorder).unwrap();

        assert_eq!(
            recorder.calls,
            vec![
                Call::Begin,
                Call::Encode(FramePhase::Scene),
                Call::Encode(FramePhase::Bloom),
                Call::Encode(FramePhase::Composite),
                Call::End,
            ]
        );
        assert_eq!(frame_loop.stats().frame(), 1);
    }

    #[test]
    fn test_failed_frame_is_skipped() {
        let mut frame_loop = FrameLoop::new();
        let mut recorder = Recorder {
            fail: true,
            ..Default::default()
        };

        assert_eq!(frame_loop.tick(&mut recorder), Err("surface lost"));
        assert_eq!(recorder.calls, vec![Call::Begin]);
        assert_eq!(frame_loop.stats().frame(), 0);
    }

    #[test]
    fn test_every_tick_repeats_order() {
        let mut frame_loop = FrameLoop::new();
        let mut recorder = Recorder::default();
        for _ in 0..3 {
            frame_loop.tick(&mut recorder).unwrap();
        }
        assert_eq!(recorder.calls.len(), 15);
        assert_eq!(frame_loop.stats().frame(), 3);
    }
}
