//! GPU side of the renderer.
//!
//! [`GpuState`] owns the surface and the three pass groups and implements
//! [`FrameStages`], so the frame loop drives it one phase at a time.

mod bloom;
mod composite;
mod egui_integration;
mod scene;
mod targets;

use std::sync::Arc;

use winit::window::Window;

pub use egui_integration::{EguiFrameOutput, EguiIntegration, PendingOverlay};

use crate::error::GpuError;
use crate::frame::{FramePhase, FrameStages};
use crate::state::{AppState, Change};
use bloom::BloomChain;
use composite::CompositePass;
use scene::{SceneOutput, ScenePass};

/// Surface texture and encoder of the frame being recorded.
struct InFlightFrame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    scene: ScenePass,
    bloom: BloomChain,
    composite: CompositePass,
    pub egui: EguiIntegration,
    overlay: PendingOverlay,
    frame: Option<InFlightFrame>,
    /// Bloom uniforms no longer match the extractor (new targets, new size).
    bloom_stale: bool,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, state: &AppState) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("surface format {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = targets::create_depth_view(&device, config.width, config.height);
        let scene = ScenePass::new(&device, surface_format, state.scene());
        let bloom = BloomChain::new(&device, state.bloom());
        let egui = EguiIntegration::new(&device, surface_format, &window);

        // Compositor text that parses can still disagree with the pipeline layout.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let composite =
            CompositePass::new(&device, surface_format, state.compositor(), bloom.output_view());
        if let Some(err) = device.pop_error_scope().await {
            return Err(GpuError::CompositePipeline(err.to_string()));
        }

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            scene,
            bloom,
            composite,
            egui,
            overlay: PendingOverlay::default(),
            frame: None,
            bloom_stale: true,
        })
    }

    /// Follow a viewport change already applied to `state`.
    pub fn resize(&mut self, width: u32, height: u32, state: &AppState) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = targets::create_depth_view(&self.device, width, height);
        self.bloom.resize(&self.device, state.bloom());
        self.composite
            .resize(&self.device, state.compositor(), self.bloom.output_view());
        self.bloom_stale = true;
    }

    /// Reconfigure the surface after it was lost or became outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload what the next frame reads from `state`. `changes` are the
    /// results of the commands applied since the last sync.
    pub fn sync(&mut self, state: &AppState, changes: &[Change]) {
        self.scene.sync(
            &self.device,
            &self.queue,
            state.scene(),
            state.tone_mapping_exposure(),
        );
        if bloom_uniforms_stale(self.bloom_stale, changes) {
            self.bloom.write_uniforms(&self.queue, state.bloom());
            self.bloom_stale = false;
        }
    }

    /// Overlay to paint at the end of the next presented frame. An overlay
    /// whose frame was skipped hands its texture updates on to this one.
    pub fn set_overlay(&mut self, overlay: EguiFrameOutput) {
        self.overlay.queue(overlay);
    }
}

fn bloom_uniforms_stale(stale: bool, changes: &[Change]) -> bool {
    stale || changes.contains(&Change::Bloom)
}

impl FrameStages for GpuState {
    type Error = wgpu::SurfaceError;

    fn begin_frame(&mut self) -> Result<(), Self::Error> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.frame = Some(InFlightFrame {
            output,
            view,
            encoder,
        });
        Ok(())
    }

    fn encode(&mut self, phase: FramePhase) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let encoder = &mut frame.encoder;

        match phase {
            FramePhase::Scene => {
                self.scene
                    .encode(encoder, &frame.view, &self.depth_view, SceneOutput::Display);
            }
            FramePhase::Bloom => {
                self.scene.encode(
                    encoder,
                    self.bloom.source_view(),
                    &self.depth_view,
                    SceneOutput::Raw,
                );
                self.bloom.encode(encoder);
            }
            FramePhase::Composite => {
                self.scene.encode(
                    encoder,
                    self.composite.base_view(),
                    &self.depth_view,
                    SceneOutput::Base,
                );
                self.composite.encode(encoder, &frame.view);
            }
        }
    }

    fn end_frame(&mut self) {
        let Some(InFlightFrame {
            output,
            view,
            mut encoder,
        }) = self.frame.take()
        else {
            return;
        };

        let mut egui_commands = Vec::new();
        let overlay = self.overlay.take();
        if let Some(overlay) = &overlay {
            let screen = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point: overlay.pixels_per_point,
            };
            egui_commands =
                self.egui
                    .prepare(&self.device, &self.queue, &mut encoder, overlay, &screen);
            self.egui.paint(&mut encoder, &view, overlay, &screen);
        }

        self.queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        if let Some(overlay) = &overlay {
            self.egui.cleanup(overlay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_uniforms_follow_changes() {
        assert!(!bloom_uniforms_stale(false, &[]));
        assert!(!bloom_uniforms_stale(false, &[Change::Shape]));
        assert!(bloom_uniforms_stale(false, &[Change::Shape, Change::Bloom]));
        assert!(!bloom_uniforms_stale(false, &[Change::ToneMapping]));
    }

    #[test]
    fn test_bloom_uniforms_written_after_resize() {
        assert!(bloom_uniforms_stale(true, &[]));
    }
}
