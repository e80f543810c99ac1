//! End-to-end behavior of the CPU side: startup, panel commands and resizes.

use bloomtree::bloom::MIP_LEVELS;
use bloomtree::field::{COLOR_RANGE, SIZE_RANGE};
use bloomtree::frame::{FrameLoop, FramePhase, FrameStages};
use bloomtree::{AppConfig, AppState, Command, Options};

fn state(width: u32, height: u32) -> AppState {
    AppState::new(&AppConfig::new().with_seed(42), width, height)
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn test_default_tree() {
    let state = state(1280, 720);
    let field = state.scene().field();

    assert_eq!(field.len(), 250);
    assert!(state.options().wraps < 50);
    assert_eq!(state.options().pow, 1.5);

    for particle in field.particles() {
        let c = particle.color();
        for channel in [c.x, c.y, c.z] {
            assert!(COLOR_RANGE.contains(&channel));
        }
        assert!(SIZE_RANGE.contains(&particle.size()));
        assert!(particle.position().y >= -0.5 && particle.position().y <= 0.5);
    }
}

#[test]
fn test_same_seed_same_tree() {
    let a = state(800, 600);
    let b = state(800, 600);
    assert_eq!(a.options(), b.options());
    for (pa, pb) in a.scene().field().particles().iter().zip(b.scene().field().particles()) {
        assert_eq!(pa.color(), pb.color());
        assert_eq!(pa.size(), pb.size());
        assert_eq!(pa.position(), pb.position());
    }
}

#[test]
fn test_fixed_options() {
    let options = Options {
        wraps: 3,
        ..Options::default()
    };
    let config = AppConfig::new().with_seed(1).with_options(options).with_particle_count(10);
    let state = AppState::new(&config, 640, 480);

    assert_eq!(state.options(), &options);
    assert_eq!(state.scene().field().shape().wraps, 3);
    assert_eq!(state.scene().field().len(), 10);
}

#[test]
fn test_empty_composite_shader_rejected() {
    let config = AppConfig::new().with_composite_shader("", "fn fs_main() {}");
    assert!(config.validate().is_err());
    assert!(matches!(bloomtree::run(config), Err(bloomtree::AppError::MissingShader("vertex"))));
}

#[test]
fn test_garbage_composite_shader_rejected_before_window() {
    let config = AppConfig::new().with_composite_shader("not wgsl at all", "fn fs_main( {");
    assert!(matches!(bloomtree::run(config), Err(bloomtree::AppError::InvalidShader(_))));
}

// ============================================================================
// Panel commands
// ============================================================================

#[test]
fn test_exposure_is_raised_to_fourth_power() {
    let mut state = state(800, 600);

    state.apply(Command::SetExposure(1.0));
    assert_eq!(state.tone_mapping_exposure(), 1.0);

    state.apply(Command::SetExposure(0.5));
    assert_eq!(state.tone_mapping_exposure(), 0.0625);
}

#[test]
fn test_wraps_change_keeps_particles() {
    let mut state = state(800, 600);
    let before: Vec<_> = state
        .scene()
        .field()
        .particles()
        .iter()
        .map(|p| (p.color(), p.size()))
        .collect();

    state.apply(Command::SetWraps(12));

    let after: Vec<_> = state
        .scene()
        .field()
        .particles()
        .iter()
        .map(|p| (p.color(), p.size()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(state.scene().field().shape().wraps, 12);
}

#[test]
fn test_radius_moves_weight_to_wide_levels() {
    let mut state = state(800, 600);

    state.apply(Command::SetBloomRadius(0.0));
    assert_eq!(state.bloom().merge_factors(), [1.0, 0.8, 0.6, 0.4, 0.2]);

    state.apply(Command::SetBloomRadius(1.0));
    let factors = state.bloom().merge_factors();
    for (got, want) in factors.iter().zip([0.2, 0.4, 0.6, 0.8, 1.0]) {
        assert!((got - want).abs() < 1e-6);
    }
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_resize_updates_every_consumer() {
    let mut state = state(800, 600);
    assert_eq!(state.scene().camera().zoom(), 480.0);

    assert!(state.resize(1600, 900));

    let camera = state.scene().camera();
    let bounds = camera.bounds();
    assert_eq!((bounds.left, bounds.right), (-800.0, 800.0));
    assert_eq!((bounds.top, bounds.bottom), (450.0, -450.0));
    assert_eq!(camera.zoom(), 720.0);
    assert_eq!(state.bloom().size(), (1600, 900));
    assert_eq!(state.compositor().size(), (1600, 900));

    let mips = state.bloom().mip_sizes();
    assert_eq!(mips.len(), MIP_LEVELS);
    assert_eq!(mips[0], (800, 450));
    assert_eq!(mips[4], (50, 29));
}

#[test]
fn test_orbit_then_resize() {
    let mut state = state(800, 600);
    state.orbit(100.0, 0.0);
    let yaw = state.scene().camera().yaw;

    state.resize(1024, 768);
    assert_eq!(state.scene().camera().yaw, yaw);
    assert_eq!(state.scene().camera().zoom(), 0.8 * 768.0);
}

// ============================================================================
// Frame loop
// ============================================================================

#[derive(Default)]
struct PhaseLog(Vec<FramePhase>);

impl FrameStages for PhaseLog {
    type Error = std::convert::Infallible;

    fn begin_frame(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn encode(&mut self, phase: FramePhase) {
        self.0.push(phase);
    }

    fn end_frame(&mut self) {}
}

#[test]
fn test_frame_phases_in_order() {
    let mut frame_loop = FrameLoop::new();
    let mut log = PhaseLog::default();

    frame_loop.tick(&mut log).unwrap();
    frame_loop.tick(&mut log).unwrap();

    assert_eq!(
        log.0,
        [FramePhase::ORDER, FramePhase::ORDER].concat()
    );
    assert_eq!(frame_loop.stats().frame(), 2);
}
