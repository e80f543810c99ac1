//! GPU bloom chain: high pass, separable blur per level, merge.

use super::targets::{
    create_linear_sampler, fullscreen_pass, fullscreen_pipeline, sampler_entry, texture_entry,
    uniform_entry, RenderTarget, HDR_FORMAT,
};
use crate::bloom::{BloomExtractor, BlurDirection, BlurUniforms, HighPassUniforms, MergeUniforms, MIP_LEVELS};
use crate::shaders;

/// Textures sized to the viewport, rebuilt on resize.
struct Targets {
    /// Untone-mapped scene.
    source: RenderTarget,
    /// High-pass output.
    bright: RenderTarget,
    horizontal: Vec<RenderTarget>,
    vertical: Vec<RenderTarget>,
    /// Merged bloom.
    output: RenderTarget,
}

impl Targets {
    fn new(device: &wgpu::Device, bloom: &BloomExtractor) -> Self {
        let (width, height) = bloom.size();
        let mips = bloom.mip_sizes();
        let (w0, h0) = mips[0];

        Self {
            source: RenderTarget::new(device, "Bloom Source", width, height),
            bright: RenderTarget::new(device, "Bloom Bright", w0, h0),
            horizontal: mips
                .iter()
                .map(|&(w, h)| RenderTarget::new(device, "Bloom Blur H", w, h))
                .collect(),
            vertical: mips
                .iter()
                .map(|&(w, h)| RenderTarget::new(device, "Bloom Blur V", w, h))
                .collect(),
            output: RenderTarget::new(device, "Bloom Output", w0, h0),
        }
    }
}

struct BindGroups {
    high_pass: wgpu::BindGroup,
    /// Horizontal then vertical bind group for each level.
    blur: Vec<[wgpu::BindGroup; 2]>,
    merge: wgpu::BindGroup,
}

struct Layouts {
    /// Texture, sampler, uniform. Shared by the high-pass and blur passes.
    single: wgpu::BindGroupLayout,
    merge: wgpu::BindGroupLayout,
}

struct UniformBuffers {
    high_pass: wgpu::Buffer,
    /// Horizontal then vertical buffer for each level.
    blur: Vec<[wgpu::Buffer; 2]>,
    merge: wgpu::Buffer,
}

pub struct BloomChain {
    high_pass_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    merge_pipeline: wgpu::RenderPipeline,
    layouts: Layouts,
    sampler: wgpu::Sampler,
    uniforms: UniformBuffers,
    targets: Targets,
    bind_groups: BindGroups,
}

impl BloomChain {
    pub fn new(device: &wgpu::Device, bloom: &BloomExtractor) -> Self {
        let single = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Pass Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let mut merge_entries: Vec<_> = (0..MIP_LEVELS as u32).map(texture_entry).collect();
        merge_entries.push(sampler_entry(MIP_LEVELS as u32));
        merge_entries.push(uniform_entry(MIP_LEVELS as u32 + 1, wgpu::ShaderStages::FRAGMENT));
        let merge = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Merge Layout"),
            entries: &merge_entries,
        });
        let layouts = Layouts { single, merge };

        let high_pass_pipeline = fullscreen_pipeline(
            device,
            "Bloom High Pass",
            &shaders::fullscreen(shaders::HIGH_PASS),
            &layouts.single,
            HDR_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur",
            &shaders::fullscreen(shaders::BLUR),
            &layouts.single,
            HDR_FORMAT,
        );
        let merge_pipeline = fullscreen_pipeline(
            device,
            "Bloom Merge",
            &shaders::fullscreen(shaders::MERGE),
            &layouts.merge,
            HDR_FORMAT,
        );

        let sampler = create_linear_sampler(device, "Bloom Sampler");

        let uniforms = UniformBuffers {
            high_pass: create_uniform_buffer::<HighPassUniforms>(device, "Bloom High Pass Uniforms"),
            blur: (0..MIP_LEVELS)
                .map(|_| {
                    [
                        create_uniform_buffer::<BlurUniforms>(device, "Bloom Blur H Uniforms"),
                        create_uniform_buffer::<BlurUniforms>(device, "Bloom Blur V Uniforms"),
                    ]
                })
                .collect(),
            merge: create_uniform_buffer::<MergeUniforms>(device, "Bloom Merge Uniforms"),
        };

        let targets = Targets::new(device, bloom);
        let bind_groups = create_bind_groups(device, &layouts, &sampler, &uniforms, &targets);

        Self {
            high_pass_pipeline,
            blur_pipeline,
            merge_pipeline,
            layouts,
            sampler,
            uniforms,
            targets,
            bind_groups,
        }
    }

    /// Rebuild every target at the extractor's current size.
    pub fn resize(&mut self, device: &wgpu::Device, bloom: &BloomExtractor) {
        self.targets = Targets::new(device, bloom);
        self.bind_groups = create_bind_groups(
            device,
            &self.layouts,
            &self.sampler,
            &self.uniforms,
            &self.targets,
        );
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, bloom: &BloomExtractor) {
        queue.write_buffer(
            &self.uniforms.high_pass,
            0,
            bytemuck::bytes_of(&bloom.high_pass_uniforms()),
        );
        for (level, [h, v]) in self.uniforms.blur.iter().enumerate() {
            let horizontal = bloom.blur_uniforms(level, BlurDirection::Horizontal);
            let vertical = bloom.blur_uniforms(level, BlurDirection::Vertical);
            queue.write_buffer(h, 0, bytemuck::bytes_of(&horizontal));
            queue.write_buffer(v, 0, bytemuck::bytes_of(&vertical));
        }
        queue.write_buffer(&self.uniforms.merge, 0, bytemuck::bytes_of(&bloom.merge_uniforms()));
    }

    /// Where the untone-mapped scene must be rendered before [`encode`](Self::encode).
    pub fn source_view(&self) -> &wgpu::TextureView {
        &self.targets.source.view
    }

    /// The merged bloom texture.
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.targets.output.view
    }

    /// Record high pass, blur and merge. The source must already hold the scene.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let targets = &self.targets;
        let groups = &self.bind_groups;

        fullscreen_pass(
            encoder,
            "Bloom High Pass",
            &targets.bright.view,
            &self.high_pass_pipeline,
            &groups.high_pass,
        );

        for (level, [h, v]) in groups.blur.iter().enumerate() {
            fullscreen_pass(
                encoder,
                "Bloom Blur H",
                &targets.horizontal[level].view,
                &self.blur_pipeline,
                h,
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur V",
                &targets.vertical[level].view,
                &self.blur_pipeline,
                v,
            );
        }

        fullscreen_pass(
            encoder,
            "Bloom Merge",
            &targets.output.view,
            &self.merge_pipeline,
            &groups.merge,
        );
    }
}

fn create_bind_groups(
    device: &wgpu::Device,
    layouts: &Layouts,
    sampler: &wgpu::Sampler,
    uniforms: &UniformBuffers,
    targets: &Targets,
) -> BindGroups {
    let single = |label: &str, input: &wgpu::TextureView, buffer: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layouts.single,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
        })
    };

    let high_pass = single(
        "Bloom High Pass Bind Group",
        &targets.source.view,
        &uniforms.high_pass,
    );

    // Level 0 blurs the high-pass output; each later level blurs the
    // previous level's result.
    let blur = (0..MIP_LEVELS)
        .map(|level| {
            let input = if level == 0 {
                &targets.bright.view
            } else {
                &targets.vertical[level - 1].view
            };
            let [h_buffer, v_buffer] = &uniforms.blur[level];
            [
                single("Bloom Blur H Bind Group", input, h_buffer),
                single(
                    "Bloom Blur V Bind Group",
                    &targets.horizontal[level].view,
                    v_buffer,
                ),
            ]
        })
        .collect();

    let mut entries: Vec<_> = targets
        .vertical
        .iter()
        .enumerate()
        .map(|(i, target)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(&target.view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: MIP_LEVELS as u32,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    entries.push(wgpu::BindGroupEntry {
        binding: MIP_LEVELS as u32 + 1,
        resource: uniforms.merge.as_entire_binding(),
    });
    let merge = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Merge Bind Group"),
        layout: &layouts.merge,
        entries: &entries,
    });

    BindGroups {
        high_pass,
        blur,
        merge,
    }
}

fn create_uniform_buffer<T>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
