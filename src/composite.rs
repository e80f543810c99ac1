//! Final compositing pass: `out = base + bloom`.
//!
//! The pass samples the tone-mapped scene (`baseTexture`) and the bloom
//! texture (`bloomTexture`) at the same UV and adds them. Fragments that
//! produced no bloom pass through unchanged.

use std::borrow::Cow;

use glam::Vec4;

use crate::error::AppError;
use crate::shaders;

/// Bind group the compositing pass provides.
const BIND_GROUP: u32 = 0;
/// Bindings in that group: base texture, bloom texture, sampler.
const BINDINGS: u32 = 3;

/// Vertex and fragment text of the compositing shader.
///
/// The two blocks are concatenated into one WGSL module. The vertex block must
/// define `VertexOutput` (with a `uv` field) and `vs_main`; the fragment block
/// binds `baseTexture` at 0, `bloomTexture` at 1, a sampler at 2 and defines
/// `fs_main`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderText {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl Default for ShaderText {
    fn default() -> Self {
        Self {
            vertex: Cow::Borrowed(shaders::FULLSCREEN_VERTEX),
            fragment: Cow::Borrowed(shaders::COMPOSITE_FRAGMENT),
        }
    }
}

impl ShaderText {
    /// Check the text before any pipeline is built from it.
    ///
    /// Fails if either block is missing, if the module does not parse or
    /// validate, if `vs_main` or `fs_main` is missing, or if a resource sits
    /// outside the three bindings of group 0.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.vertex.trim().is_empty() {
            return Err(AppError::MissingShader("vertex"));
        }
        if self.fragment.trim().is_empty() {
            return Err(AppError::MissingShader("fragment"));
        }

        let source = self.source();
        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|e| AppError::InvalidShader(e.emit_to_string(&source)))?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .map_err(|e| AppError::InvalidShader(e.emit_to_string(&source)))?;

        for (stage, name) in [
            (naga::ShaderStage::Vertex, "vs_main"),
            (naga::ShaderStage::Fragment, "fs_main"),
        ] {
            let found = module
                .entry_points
                .iter()
                .any(|entry| entry.stage == stage && entry.name == name);
            if !found {
                return Err(AppError::InvalidShader(format!(
                    "no {:?} entry point named `{}`",
                    stage, name
                )));
            }
        }

        for (_, global) in module.global_variables.iter() {
            let Some(binding) = &global.binding else {
                continue;
            };
            if binding.group != BIND_GROUP || binding.binding >= BINDINGS {
                return Err(AppError::InvalidShader(format!(
                    "`{}` is bound at @group({}) @binding({}), outside @group(0) bindings 0..=2",
                    global.name.as_deref().unwrap_or("<unnamed>"),
                    binding.group,
                    binding.binding
                )));
            }
        }

        Ok(())
    }

    /// The complete WGSL module.
    pub fn source(&self) -> String {
        format!("{}\n{}", self.vertex, self.fragment)
    }
}

/// CPU side of the compositing pass.
#[derive(Debug, Clone)]
pub struct Compositor {
    shader: ShaderText,
    width: u32,
    height: u32,
}

impl Compositor {
    pub fn new(shader: ShaderText, width: u32, height: u32) -> Self {
        Self {
            shader,
            width,
            height,
        }
    }

    /// CPU mirror of `fs_main` in the default compositing shader. The
    /// renderer never calls it; it pins down what the shader computes.
    #[inline]
    pub fn blend(base: Vec4, bloom: Vec4) -> Vec4 {
        base + bloom
    }

    #[inline]
    pub fn shader(&self) -> &ShaderText {
        &self.shader
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
