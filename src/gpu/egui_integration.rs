//! Egui overlay: input routing, tessellation and painting over the frame.

use std::sync::Arc;
use winit::window::Window;

/// Egui context, winit input state and wgpu renderer.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Tessellated output of one egui frame.
pub struct EguiFrameOutput {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl EguiFrameOutput {
    /// Put the texture updates of an overlay that was never painted ahead of
    /// this one's. Egui sends every texture update exactly once.
    pub fn carry_over(&mut self, unsent: EguiFrameOutput) {
        let mut delta = unsent.textures_delta;
        delta.append(std::mem::take(&mut self.textures_delta));
        self.textures_delta = delta;
    }
}

/// The overlay waiting for the next presented frame.
///
/// A frame that fails to start never paints its overlay; queuing the next one
/// keeps the skipped overlay's texture updates.
#[derive(Default)]
pub struct PendingOverlay(Option<EguiFrameOutput>);

impl PendingOverlay {
    pub fn queue(&mut self, mut overlay: EguiFrameOutput) {
        if let Some(unsent) = self.0.take() {
            overlay.carry_over(unsent);
        }
        self.0 = Some(overlay);
    }

    pub fn take(&mut self) -> Option<EguiFrameOutput> {
        self.0.take()
    }
}

impl EguiIntegration {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Arc<Window>,
    ) -> Self {
        let ctx = egui::Context::default();

        // Dark, shadowless panel over a black scene.
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(device, output_format, None, 1, false);

        Self { ctx, state, renderer }
    }

    /// Feed a window event to egui. Returns true if egui consumed it, in
    /// which case the camera must not see it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Whether the pointer is over an egui area or dragging one.
    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input() || self.ctx.is_pointer_over_area()
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) -> EguiFrameOutput {
        let full_output = self.ctx.end_pass();
        self.state.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        EguiFrameOutput {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    /// Upload textures and buffers for `output`. The returned command
    /// buffers must be submitted before the encoder that paints the overlay.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output: &EguiFrameOutput,
        screen: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &output.paint_jobs, screen)
    }

    /// Paint `output` on top of whatever `target` already holds.
    pub fn paint(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        output: &EguiFrameOutput,
        screen: &egui_wgpu::ScreenDescriptor,
    ) {
        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Egui Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let mut pass = pass.forget_lifetime();
        self.renderer.render(&mut pass, &output.paint_jobs, screen);
    }

    /// Free textures egui released this frame.
    pub fn cleanup(&mut self, output: &EguiFrameOutput) {
        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::ImageDelta;
    use egui::{Color32, ColorImage, TextureId, TextureOptions};

    fn full_image() -> ImageDelta {
        ImageDelta::full(ColorImage::new([4, 4], Color32::WHITE), TextureOptions::LINEAR)
    }

    fn partial_image() -> ImageDelta {
        ImageDelta::partial([1, 1], ColorImage::new([2, 2], Color32::RED), TextureOptions::LINEAR)
    }

    fn output(set: Vec<(TextureId, ImageDelta)>, free: Vec<TextureId>) -> EguiFrameOutput {
        EguiFrameOutput {
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta { set, free },
            pixels_per_point: 1.0,
        }
    }

    #[test]
    fn test_skipped_overlay_keeps_texture_updates() {
        let atlas = TextureId::Managed(0);
        let mut pending = PendingOverlay::default();

        // First overlay carries the full atlas; its frame never gets presented.
        pending.queue(output(vec![(atlas, full_image())], Vec::new()));
        pending.queue(output(vec![(atlas, partial_image())], Vec::new()));

        let overlay = pending.take().unwrap();
        let set = &overlay.textures_delta.set;
        assert_eq!(set.len(), 2);
        assert!(set[0].1.is_whole());
        assert!(!set[1].1.is_whole());
        assert!(pending.take().is_none());
    }

    #[test]
    fn test_carry_over_joins_free_lists() {
        let mut next = output(Vec::new(), vec![TextureId::Managed(2)]);
        next.carry_over(output(
            vec![(TextureId::Managed(1), full_image())],
            vec![TextureId::Managed(3)],
        ));

        assert_eq!(next.textures_delta.set.len(), 1);
        assert_eq!(
            next.textures_delta.free,
            vec![TextureId::Managed(3), TextureId::Managed(2)]
        );
    }

    #[test]
    fn test_presented_overlay_is_not_repeated() {
        let mut pending = PendingOverlay::default();
        pending.queue(output(vec![(TextureId::Managed(0), full_image())], Vec::new()));
        assert!(pending.take().is_some());

        pending.queue(output(Vec::new(), Vec::new()));
        let overlay = pending.take().unwrap();
        assert!(overlay.textures_delta.set.is_empty());
    }
}
