//! The particle field: a fixed set of particles arranged along a helix.
//!
//! Each particle's position is a pure function of its index, the field's
//! particle count and the current [`ShapeParameters`]. Color and size are drawn
//! once at creation and never change afterwards.
//!
//! ```ignore
//! use bloomtree::field::{ParticleField, ShapeParameters};
//!
//! let mut rng = rand::thread_rng();
//! let mut field = ParticleField::create(250, ShapeParameters::default(), &mut rng);
//!
//! // Later, when a slider moves:
//! field.reposition(ShapeParameters { wraps: 12, pow: 2.0 });
//! ```

use std::f32::consts::TAU;
use std::ops::Range;

use glam::Vec3;
use rand::Rng;

/// Number of particles the demo starts with.
pub const DEFAULT_PARTICLE_COUNT: usize = 250;

/// Range each color channel is drawn from.
pub const COLOR_RANGE: Range<f32> = 0.1..1.0;

/// Range of icosahedron radii.
pub const SIZE_RANGE: Range<f32> = 0.002..0.01;

/// Vertical extent of the tree, bottom to top.
const HEIGHT: (f32, f32) = (-0.5, 0.5);

/// Helix radius at the bottom and at the top.
const RADIUS: (f32, f32) = (0.5, 0.0);

/// Parameters controlling the shape of the helix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParameters {
    /// Number of full turns from bottom to top.
    pub wraps: u32,
    /// Exponent warping the index-to-height interpolation.
    pub pow: f32,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self { wraps: 25, pow: 1.5 }
    }
}

/// A single glowing icosahedron in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    position: Vec3,
    color: Vec3,
    size: f32,
}

impl Particle {
    /// Current world-space position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// RGB color, fixed at creation.
    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Icosahedron radius, fixed at creation.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }
}

/// The set of particles making up the tree.
///
/// Created once with [`ParticleField::create`]; shape changes go through
/// [`ParticleField::reposition`], which never changes the particle count.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    shape: ShapeParameters,
}

impl ParticleField {
    /// Create `count` particles with random colors and sizes, placed on the
    /// helix described by `shape`.
    pub fn create<R: Rng + ?Sized>(count: usize, shape: ShapeParameters, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|index| Particle {
                position: helix_position(index, count, shape),
                color: Vec3::new(
                    rng.gen_range(COLOR_RANGE),
                    rng.gen_range(COLOR_RANGE),
                    rng.gen_range(COLOR_RANGE),
                ),
                size: rng.gen_range(SIZE_RANGE),
            })
            .collect();

        Self { particles, shape }
    }

    /// Recompute every position for new shape parameters.
    ///
    /// Colors, sizes and the particle count are left untouched.
    pub fn reposition(&mut self, shape: ShapeParameters) {
        let count = self.particles.len();
        for (index, particle) in self.particles.iter_mut().enumerate() {
            particle.position = helix_position(index, count, shape);
        }
        self.shape = shape;
    }

    /// Change the particle count.
    ///
    /// A field's count is fixed, so a different count discards every particle
    /// and creates a fresh field. The same count only repositions.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, count: usize, shape: ShapeParameters, rng: &mut R) {
        if count == self.particles.len() {
            self.reposition(shape);
        } else {
            *self = Self::create(count, shape, rng);
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the field has no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Shape parameters the current positions were computed with.
    #[inline]
    pub fn shape(&self) -> ShapeParameters {
        self.shape
    }

    /// All particles in index order.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

/// Position of particle `index` out of `count` on the helix.
///
/// `index` must be less than `count`, so `count` is never zero here.
pub fn helix_position(index: usize, count: usize, shape: ShapeParameters) -> Vec3 {
    debug_assert!(index < count);

    let t = (index as f32 / count as f32).powf(shape.pow);
    let y = lerp(HEIGHT.0, HEIGHT.1, t);
    let radius = lerp(RADIUS.0, RADIUS.1, t);
    let angle = lerp(0.0, TAU * shape.wraps as f32, t);

    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

#[inline]
fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}
