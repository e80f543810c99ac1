//! Startup configuration.

use std::borrow::Cow;

use rand::Rng;

use crate::bloom::BloomParameters;
use crate::composite::ShaderText;
use crate::error::AppError;
use crate::field::{ShapeParameters, DEFAULT_PARTICLE_COUNT};

/// Upper bound (exclusive) of the randomly drawn starting wrap count.
const RANDOM_WRAPS: u32 = 50;

/// The six values the parameter panel edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    pub exposure: f32,
    pub bloom_threshold: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub wraps: u32,
    pub pow: f32,
}

impl Default for Options {
    fn default() -> Self {
        let bloom = BloomParameters::default();
        let shape = ShapeParameters::default();
        Self {
            exposure: bloom.exposure,
            bloom_threshold: bloom.threshold,
            bloom_strength: bloom.strength,
            bloom_radius: bloom.radius,
            wraps: shape.wraps,
            pow: shape.pow,
        }
    }
}

impl Options {
    /// Defaults with a random number of turns.
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            wraps: rng.gen_range(0..RANDOM_WRAPS),
            ..Self::default()
        }
    }

    #[inline]
    pub fn shape(&self) -> ShapeParameters {
        ShapeParameters {
            wraps: self.wraps,
            pow: self.pow,
        }
    }

    #[inline]
    pub fn bloom(&self) -> BloomParameters {
        BloomParameters {
            exposure: self.exposure,
            threshold: self.bloom_threshold,
            strength: self.bloom_strength,
            radius: self.bloom_radius,
        }
    }
}

/// Application configuration builder.
///
/// ```ignore
/// let config = AppConfig::new()
///     .with_particle_count(500)
///     .with_seed(42)
///     .with_window_size(1600, 900);
/// bloomtree::run(config)?;
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub(crate) particle_count: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) window_size: (u32, u32),
    pub(crate) title: String,
    pub(crate) options: Option<Options>,
    pub(crate) composite_shader: ShaderText,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: None,
            window_size: (1280, 720),
            title: "bloomtree".to_string(),
            options: None,
            composite_shader: ShaderText::default(),
        }
    }

    /// Number of particles in the tree.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Seed the random colors, sizes and starting wrap count.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Start from fixed panel values instead of defaults with random wraps.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Replace the compositing shader text.
    pub fn with_composite_shader(
        mut self,
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.composite_shader = ShaderText {
            vertex: vertex.into(),
            fragment: fragment.into(),
        };
        self
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Check everything that must hold before a window is opened.
    pub fn validate(&self) -> Result<(), AppError> {
        self.composite_shader.validate()
    }

    /// Panel values to start with.
    pub(crate) fn initial_options<R: Rng + ?Sized>(&self, rng: &mut R) -> Options {
        self.options.unwrap_or_else(|| Options::randomized(rng))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.exposure, 0.9);
        assert_eq!(options.bloom_threshold, 0.0);
        assert_eq!(options.bloom_strength, 8.0);
        assert_eq!(options.bloom_radius, 0.0);
        assert_eq!(options.pow, 1.5);
    }

    #[test]
    fn test_randomized_wraps_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let options = Options::randomized(&mut rng);
            assert!(options.wraps < RANDOM_WRAPS);
            assert_eq!(options.pow, 1.5);
        }
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::new()
            .with_particle_count(12)
            .with_seed(99)
            .with_window_size(320, 200)
            .with_title("tree");

        assert_eq!(config.particle_count(), 12);
        assert_eq!(config.seed(), Some(99));
        assert_eq!(config.window_size(), (320, 200));
        assert_eq!(config.title(), "tree");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_options_win() {
        let fixed = Options {
            wraps: 3,
            ..Options::default()
        };
        let config = AppConfig::new().with_options(fixed);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(config.initial_options(&mut rng), fixed);
    }

    #[test]
    fn test_empty_shader_rejected() {
        let config = AppConfig::new().with_composite_shader("", "fn fs_main() {}");
        assert!(matches!(config.validate(), Err(AppError::MissingShader("vertex"))));
    }

    #[test]
    fn test_garbage_shader_rejected() {
        let config = AppConfig::new().with_composite_shader("not wgsl at all", "fn fs_main( {");
        assert!(matches!(config.validate(), Err(AppError::InvalidShader(_))));
    }
}
