//! # bloomtree
//!
//! A helical tree of tiny icosahedra rendered with a selective bloom.
//!
//! Particles sit on a spiral whose radius grows with height. Each frame the
//! scene is drawn tone-mapped to the window, drawn again untone-mapped into an
//! off-screen target where a luminosity high pass and a blurred mip chain
//! extract the glow, and finally composited as `base + bloom` over the first
//! render. A small egui panel edits exposure, the bloom parameters and the
//! shape of the spiral while the loop runs.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bloomtree::AppConfig;
//!
//! fn main() -> Result<(), bloomtree::AppError> {
//!     bloomtree::run(AppConfig::new().with_particle_count(500).with_seed(7))
//! }
//! ```
//!
//! ## Layout
//!
//! Everything the renderer reads lives on the CPU side and can be used
//! without a GPU:
//!
//! - [`field`]: particle positions, colors and sizes.
//! - [`scene`]: the field, its shared mesh and the [`camera`].
//! - [`bloom`]: bloom parameters, mip sizes and the per-pass uniforms.
//! - [`composite`]: the compositing blend and its shader text.
//! - [`panel`]: sliders, producing [`Command`]s.
//! - [`state`]: [`AppState`], the single place commands take effect.
//! - [`frame`]: [`FrameLoop`], running the three phases of a frame in order.
//!
//! The wgpu passes that consume them are private to the crate.

pub mod app;
pub mod bloom;
pub mod camera;
pub mod composite;
pub mod config;
pub mod error;
pub mod field;
pub mod frame;
mod gpu;
pub mod panel;
pub mod scene;
pub mod shaders;
pub mod state;
pub mod time;

pub use app::run;
pub use bloom::{BloomExtractor, BloomParameters};
pub use camera::OrthographicCamera;
pub use composite::{Compositor, ShaderText};
pub use config::{AppConfig, Options};
pub use error::{AppError, GpuError};
pub use field::{ParticleField, ShapeParameters};
pub use frame::{FrameLoop, FramePhase, FrameStages};
pub use panel::{Command, ParameterPanel};
pub use scene::SceneGraph;
pub use state::{AppState, Change};
