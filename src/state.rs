//! Application state, owned by the entry point.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bloom::BloomExtractor;
use crate::camera::OrthographicCamera;
use crate::composite::Compositor;
use crate::config::{AppConfig, Options};
use crate::field::ParticleField;
use crate::panel::{Command, Control};
use crate::scene::SceneGraph;

/// What an applied command changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Tone-mapping exposure of the main render.
    ToneMapping,
    /// Bloom pass parameters.
    Bloom,
    /// Every particle position.
    Shape,
}

/// All mutable state of the running demo.
///
/// Panel commands go through [`AppState::apply`], viewport changes through
/// [`AppState::resize`] and camera drags through [`AppState::orbit`] and
/// [`AppState::pan`].
pub struct AppState {
    options: Options,
    scene: SceneGraph,
    bloom: BloomExtractor,
    compositor: Compositor,
}

impl AppState {
    /// Build the initial state for a viewport of `width` x `height` pixels.
    pub fn new(config: &AppConfig, width: u32, height: u32) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let options = config.initial_options(&mut rng);
        let field = ParticleField::create(config.particle_count, options.shape(), &mut rng);
        let camera = OrthographicCamera::from_viewport(width, height);

        log::info!(
            "created {} particles ({} wraps, pow {})",
            field.len(),
            options.wraps,
            options.pow
        );

        Self {
            options,
            scene: SceneGraph::new(field, camera),
            bloom: BloomExtractor::new(options.bloom(), width, height),
            compositor: Compositor::new(config.composite_shader.clone(), width, height),
        }
    }

    /// Apply a panel command. Values are clamped to the control's range and
    /// a NaN leaves the current value in place.
    pub fn apply(&mut self, command: Command) -> Change {
        let control = command.control();
        let current = control.value(&self.options);
        let value = clamp_to(control, command.value(), current);
        log::debug!("{} = {}", control.name(), value);

        match control {
            Control::Exposure => {
                self.options.exposure = value;
                self.bloom.set_exposure(value);
                Change::ToneMapping
            }
            Control::BloomThreshold => {
                self.options.bloom_threshold = value;
                self.bloom.set_threshold(value);
                Change::Bloom
            }
            Control::BloomStrength => {
                self.options.bloom_strength = value;
                self.bloom.set_strength(value);
                Change::Bloom
            }
            Control::BloomRadius => {
                self.options.bloom_radius = value;
                self.bloom.set_radius(value);
                Change::Bloom
            }
            Control::Wraps => {
                self.options.wraps = value as u32;
                self.scene.reposition(self.options.shape());
                Change::Shape
            }
            Control::Pow => {
                self.options.pow = value;
                self.scene.reposition(self.options.shape());
                Change::Shape
            }
        }
    }

    /// Track a new viewport size. Zero-sized viewports (minimized windows)
    /// are ignored and return `false`.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.scene.camera_mut().set_viewport(width, height);
        self.bloom.resize(width, height);
        self.compositor.resize(width, height);
        log::info!("viewport resized to {}x{}", width, height);
        true
    }

    /// Rotate the camera by a drag delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.scene.camera_mut().orbit(dx, dy);
    }

    /// Move the camera target by a drag delta in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.scene.camera_mut().pan(dx, dy);
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    #[inline]
    pub fn bloom(&self) -> &BloomExtractor {
        &self.bloom
    }

    #[inline]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Exposure for tone mapping the main render.
    #[inline]
    pub fn tone_mapping_exposure(&self) -> f32 {
        self.bloom.tone_mapping_exposure()
    }
}

fn clamp_to(control: Control, value: f32, current: f32) -> f32 {
    if value.is_nan() {
        return current;
    }
    let range = control.range();
    let value = value.clamp(*range.start(), *range.end());
    if control.is_integer() {
        value.round()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(&AppConfig::new().with_seed(5), 800, 600)
    }

    #[test]
    fn test_exposure_command() {
        let mut state = state();
        assert_eq!(state.apply(Command::SetExposure(0.5)), Change::ToneMapping);
        assert_eq!(state.tone_mapping_exposure(), 0.0625);
        assert_eq!(state.options().exposure, 0.5);
    }

    #[test]
    fn test_bloom_commands() {
        let mut state = state();
        let revision = state.scene().revision();

        assert_eq!(state.apply(Command::SetBloomThreshold(0.3)), Change::Bloom);
        assert_eq!(state.apply(Command::SetBloomStrength(4.0)), Change::Bloom);
        assert_eq!(state.apply(Command::SetBloomRadius(0.7)), Change::Bloom);

        let params = state.bloom().params();
        assert_eq!(params.threshold, 0.3);
        assert_eq!(params.strength, 4.0);
        assert_eq!(params.radius, 0.7);
        // Bloom changes never touch geometry.
        assert_eq!(state.scene().revision(), revision);
    }

    #[test]
    fn test_shape_commands_reposition() {
        let mut state = state();
        let count = state.scene().field().len();

        assert_eq!(state.apply(Command::SetWraps(0)), Change::Shape);
        assert_eq!(state.apply(Command::SetPow(2.0)), Change::Shape);

        let field = state.scene().field();
        assert_eq!(field.len(), count);
        assert_eq!(field.shape().wraps, 0);
        assert_eq!(field.shape().pow, 2.0);
        assert!(field.particles().iter().all(|p| p.position().z.abs() < 1e-6));
        assert_eq!(state.scene().revision(), 2);
    }

    #[test]
    fn test_values_clamped() {
        let mut state = state();
        state.apply(Command::SetExposure(9.0));
        assert_eq!(state.options().exposure, 2.0);

        state.apply(Command::SetBloomStrength(-1.0));
        assert_eq!(state.options().bloom_strength, 0.0);

        state.apply(Command::SetWraps(500));
        assert_eq!(state.options().wraps, 50);
    }

    #[test]
    fn test_nan_keeps_current_value() {
        let mut state = state();
        state.apply(Command::SetPow(2.0));
        state.apply(Command::SetExposure(0.5));

        state.apply(Command::SetPow(f32::NAN));
        state.apply(Command::SetExposure(f32::NAN));
        state.apply(Command::SetBloomRadius(f32::NAN));

        assert_eq!(state.options().pow, 2.0);
        assert_eq!(state.options().exposure, 0.5);
        assert_eq!(state.tone_mapping_exposure(), 0.0625);
        assert!(!state.bloom().params().radius.is_nan());
        assert!(state
            .scene()
            .field()
            .particles()
            .iter()
            .all(|p| p.position().is_finite()));
    }

    #[test]
    fn test_infinite_values_clamped() {
        let mut state = state();
        state.apply(Command::SetExposure(f32::INFINITY));
        assert_eq!(state.options().exposure, 2.0);

        state.apply(Command::SetPow(f32::NEG_INFINITY));
        assert_eq!(state.options().pow, 0.0);
        assert!(state
            .scene()
            .field()
            .particles()
            .iter()
            .all(|p| p.position().is_finite()));
    }

    #[test]
    fn test_resize_zero_ignored() {
        let mut state = state();
        assert!(!state.resize(0, 600));
        assert_eq!(state.scene().camera().viewport(), (800, 600));
        assert_eq!(state.bloom().size(), (800, 600));
    }

    #[test]
    fn test_pan_keeps_geometry() {
        let mut state = state();
        let revision = state.scene().revision();
        state.pan(40.0, -25.0);
        assert_ne!(state.scene().camera().target(), glam::Vec3::ZERO);
        assert_eq!(state.scene().revision(), revision);
    }

    #[test]
    fn test_orbit_keeps_zoom() {
        let mut state = state();
        let zoom = state.scene().camera().zoom();
        state.orbit(50.0, 20.0);
        assert_eq!(state.scene().camera().zoom(), zoom);
    }
}
