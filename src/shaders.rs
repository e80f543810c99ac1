//! WGSL sources, embedded at compile time.
//!
//! Full-screen passes share [`FULLSCREEN_VERTEX`], which defines
//! `VertexOutput` and `vs_main`; each fragment source is appended to it with
//! [`fullscreen`].

/// Instanced icosahedra with optional Reinhard tone mapping.
pub const SCENE: &str = include_str!("shaders/scene.wgsl");

/// Full-screen triangle vertex stage passing position and UV through.
pub const FULLSCREEN_VERTEX: &str = include_str!("shaders/fullscreen.wgsl");

/// Luminosity high-pass.
pub const HIGH_PASS: &str = include_str!("shaders/high_pass.wgsl");

/// Separable Gaussian blur.
pub const BLUR: &str = include_str!("shaders/blur.wgsl");

/// Weighted sum of the blur levels.
pub const MERGE: &str = include_str!("shaders/merge.wgsl");

/// `baseTexture + bloomTexture`.
pub const COMPOSITE_FRAGMENT: &str = include_str!("shaders/composite.wgsl");

/// Join the shared vertex stage with a fragment source.
pub fn fullscreen(fragment: &str) -> String {
    format!("{FULLSCREEN_VERTEX}\n{fragment}")
}
