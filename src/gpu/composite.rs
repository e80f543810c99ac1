//! Final full-screen pass adding bloom onto the tone-mapped scene.

use super::targets::{
    create_linear_sampler, fullscreen_pass, fullscreen_pipeline, sampler_entry, texture_entry,
    RenderTarget,
};
use crate::composite::Compositor;

pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Tone-mapped scene sampled as `baseTexture`.
    base: RenderTarget,
    bind_group: wgpu::BindGroup,
}

impl CompositePass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        compositor: &Compositor,
        bloom_view: &wgpu::TextureView,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Layout"),
            entries: &[texture_entry(0), texture_entry(1), sampler_entry(2)],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "Composite",
            &compositor.shader().source(),
            &layout,
            surface_format,
        );
        let sampler = create_linear_sampler(device, "Composite Sampler");

        let (width, height) = compositor.size();
        let base = RenderTarget::new(device, "Composite Base", width, height);
        let bind_group = create_bind_group(device, &layout, &sampler, &base.view, bloom_view);

        Self {
            pipeline,
            layout,
            sampler,
            base,
            bind_group,
        }
    }

    /// Rebuild the base target. `bloom_view` must be the bloom output after
    /// the bloom chain itself was resized.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        compositor: &Compositor,
        bloom_view: &wgpu::TextureView,
    ) {
        let (width, height) = compositor.size();
        self.base = RenderTarget::new(device, "Composite Base", width, height);
        self.bind_group =
            create_bind_group(device, &self.layout, &self.sampler, &self.base.view, bloom_view);
    }

    /// Where the tone-mapped scene must be rendered before [`encode`](Self::encode).
    pub fn base_view(&self) -> &wgpu::TextureView {
        &self.base.view
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        fullscreen_pass(encoder, "Composite Pass", target, &self.pipeline, &self.bind_group);
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    base: &wgpu::TextureView,
    bloom: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Composite Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(base),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(bloom),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
