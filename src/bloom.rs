//! Bloom extraction settings and the numbers the GPU passes run on.
//!
//! The bloom pass renders the scene off-screen, keeps only the fragments
//! brighter than `threshold`, blurs them through a chain of [`MIP_LEVELS`]
//! half-resolution levels and merges the levels back into one texture scaled
//! by `strength`. `radius` shifts weight between the sharp and the wide levels.
//!
//! `exposure` is carried here because it is edited next to the bloom controls,
//! but it only affects tone mapping of the main render.

use bytemuck::{Pod, Zeroable};

/// Number of blur levels.
pub const MIP_LEVELS: usize = 5;

/// Gaussian kernel radius (and sigma) per level.
pub const KERNEL_SIZES: [u32; MIP_LEVELS] = [3, 5, 7, 9, 11];

/// Base weight of each level in the merge.
pub const BLOOM_FACTORS: [f32; MIP_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Width of the soft edge above the luminosity threshold.
pub const SMOOTH_WIDTH: f32 = 0.01;

/// User-facing bloom and tone-mapping values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParameters {
    pub exposure: f32,
    pub threshold: f32,
    pub strength: f32,
    pub radius: f32,
}

impl Default for BloomParameters {
    fn default() -> Self {
        Self {
            exposure: 0.9,
            threshold: 0.0,
            strength: 8.0,
            radius: 0.0,
        }
    }
}

impl BloomParameters {
    /// Exposure handed to the tone mapper: `exposure^4`.
    #[inline]
    pub fn tone_mapping_exposure(&self) -> f32 {
        self.exposure.powi(4)
    }
}

/// Blur direction of a separable pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurDirection {
    Horizontal,
    Vertical,
}

impl BlurDirection {
    fn vector(self) -> [f32; 2] {
        match self {
            BlurDirection::Horizontal => [1.0, 0.0],
            BlurDirection::Vertical => [0.0, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct HighPassUniforms {
    pub threshold: f32,
    pub smooth_width: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct BlurUniforms {
    pub direction: [f32; 2],
    pub inv_size: [f32; 2],
    pub kernel_radius: u32,
    pub sigma: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MergeUniforms {
    /// Weights of levels 0 through 3.
    pub factors: [f32; 4],
    /// Weight of level 4.
    pub last_factor: f32,
    pub strength: f32,
    pub _padding: [f32; 2],
}

/// CPU side of the bloom pass: parameters plus the render size.
#[derive(Debug, Clone)]
pub struct BloomExtractor {
    params: BloomParameters,
    width: u32,
    height: u32,
}

impl BloomExtractor {
    pub fn new(params: BloomParameters, width: u32, height: u32) -> Self {
        Self {
            params,
            width,
            height,
        }
    }

    #[inline]
    pub fn params(&self) -> &BloomParameters {
        &self.params
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.params.exposure = exposure;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.params.threshold = threshold;
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.params.strength = strength;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.params.radius = radius;
    }

    /// Exposure for tone mapping the main render.
    #[inline]
    pub fn tone_mapping_exposure(&self) -> f32 {
        self.params.tone_mapping_exposure()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Full render size.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of each blur level. Level 0 is half the render size, rounded;
    /// every following level halves again. No level is smaller than 1x1.
    pub fn mip_sizes(&self) -> [(u32, u32); MIP_LEVELS] {
        let mut sizes = [(1, 1); MIP_LEVELS];
        let (mut w, mut h) = (half(self.width), half(self.height));
        for size in &mut sizes {
            *size = (w, h);
            w = half(w);
            h = half(h);
        }
        sizes
    }

    /// Merge weight of each level after `radius` is applied.
    pub fn merge_factors(&self) -> [f32; MIP_LEVELS] {
        let radius = self.params.radius;
        BLOOM_FACTORS.map(|f| f + (1.2 - f - f) * radius)
    }

    pub fn high_pass_uniforms(&self) -> HighPassUniforms {
        HighPassUniforms {
            threshold: self.params.threshold,
            smooth_width: SMOOTH_WIDTH,
            _padding: [0.0; 2],
        }
    }

    pub fn blur_uniforms(&self, level: usize, direction: BlurDirection) -> BlurUniforms {
        let (w, h) = self.mip_sizes()[level];
        let kernel = KERNEL_SIZES[level];
        BlurUniforms {
            direction: direction.vector(),
            inv_size: [1.0 / w as f32, 1.0 / h as f32],
            kernel_radius: kernel,
            sigma: kernel as f32,
            _padding: [0.0; 2],
        }
    }

    pub fn merge_uniforms(&self) -> MergeUniforms {
        let f = self.merge_factors();
        MergeUniforms {
            factors: [f[0], f[1], f[2], f[3]],
            last_factor: f[4],
            strength: self.params.strength,
            _padding: [0.0; 2],
        }
    }
}

/// Half of `n`, rounded half up, never below one.
#[inline]
fn half(n: u32) -> u32 {
    (n.div_ceil(2)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_mapping_exposure() {
        let mut bloom = BloomExtractor::new(BloomParameters::default(), 800, 600);

        bloom.set_exposure(1.0);
        assert_eq!(bloom.tone_mapping_exposure(), 1.0);

        bloom.set_exposure(0.5);
        assert_eq!(bloom.tone_mapping_exposure(), 0.0625);
    }

    #[test]
    fn test_mip_sizes() {
        let bloom = BloomExtractor::new(BloomParameters::default(), 1600, 900);
        assert_eq!(
            bloom.mip_sizes(),
            [(800, 450), (400, 225), (200, 113), (100, 57), (50, 29)]
        );
    }

    #[test]
    fn test_mip_sizes_never_zero() {
        let bloom = BloomExtractor::new(BloomParameters::default(), 1, 3);
        for (w, h) in bloom.mip_sizes() {
            assert!(w >= 1 && h >= 1);
        }
    }

    #[test]
    fn test_resize() {
        let mut bloom = BloomExtractor::new(BloomParameters::default(), 800, 600);
        bloom.resize(1600, 900);
        assert_eq!(bloom.size(), (1600, 900));
        assert_eq!(bloom.mip_sizes()[0], (800, 450));
    }

    #[test]
    fn test_merge_factors_radius() {
        let mut bloom = BloomExtractor::new(BloomParameters::default(), 800, 600);
        assert_eq!(bloom.merge_factors(), BLOOM_FACTORS);

        bloom.set_radius(1.0);
        let expected = [0.2, 0.4, 0.6, 0.8, 1.0];
        for (got, want) in bloom.merge_factors().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6);
        }

        bloom.set_radius(0.5);
        for got in bloom.merge_factors() {
            assert!((got - 0.6).abs() < 1e-6);
        }
    }

    #[test]
    fn test_uniforms_follow_params() {
        let mut bloom = BloomExtractor::new(BloomParameters::default(), 800, 600);
        bloom.set_threshold(0.35);
        bloom.set_strength(2.5);

        assert_eq!(bloom.high_pass_uniforms().threshold, 0.35);
        assert_eq!(bloom.high_pass_uniforms().smooth_width, SMOOTH_WIDTH);
        assert_eq!(bloom.merge_uniforms().strength, 2.5);
        assert_eq!(bloom.merge_uniforms().last_factor, 0.2);
    }

    #[test]
    fn test_blur_uniforms() {
        let bloom = BloomExtractor::new(BloomParameters::default(), 800, 600);
        let h = bloom.blur_uniforms(0, BlurDirection::Horizontal);
        assert_eq!(h.direction, [1.0, 0.0]);
        assert_eq!(h.inv_size, [1.0 / 400.0, 1.0 / 300.0]);
        assert_eq!(h.kernel_radius, 3);

        let v = bloom.blur_uniforms(4, BlurDirection::Vertical);
        assert_eq!(v.direction, [0.0, 1.0]);
        assert_eq!(v.kernel_radius, 11);
        assert_eq!(v.sigma, 11.0);
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<HighPassUniforms>(), 16);
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 32);
        assert_eq!(std::mem::size_of::<MergeUniforms>(), 32);
    }
}
