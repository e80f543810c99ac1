//! Instanced icosahedron draw.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::targets::{uniform_entry, DEPTH_FORMAT, HDR_FORMAT};
use crate::scene::{ParticleInstance, SceneGraph};
use crate::shaders;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    exposure: f32,
    tone_mapping: u32,
    _padding: [f32; 2],
}

/// Where a scene render goes and whether it is tone mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneOutput {
    /// Tone-mapped, into a surface-format target.
    Display,
    /// Tone-mapped, into an off-screen target.
    Base,
    /// Untone-mapped, into the bloom source.
    Raw,
}

struct Pipelines {
    surface: wgpu::RenderPipeline,
    hdr: wgpu::RenderPipeline,
}

pub struct ScenePass {
    pipelines: Pipelines,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    revision: Option<u64>,
    tone_mapped_uniforms: wgpu::Buffer,
    raw_uniforms: wgpu::Buffer,
    tone_mapped_bind_group: wgpu::BindGroup,
    raw_bind_group: wgpu::BindGroup,
}

impl ScenePass {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, scene: &SceneGraph) -> Self {
        let mesh = scene.mesh();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Icosahedron Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Icosahedron Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_capacity = scene.field().len().max(1);
        let instance_buffer = create_instance_buffer(device, instance_capacity);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let tone_mapped_uniforms = create_uniform_buffer(device, "Scene Uniforms (tone mapped)");
        let raw_uniforms = create_uniform_buffer(device, "Scene Uniforms (raw)");
        let tone_mapped_bind_group = create_bind_group(device, &layout, &tone_mapped_uniforms);
        let raw_bind_group = create_bind_group(device, &layout, &raw_uniforms);

        let pipelines = Pipelines {
            surface: create_pipeline(device, &layout, surface_format),
            hdr: create_pipeline(device, &layout, HDR_FORMAT),
        };

        Self {
            pipelines,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            revision: None,
            tone_mapped_uniforms,
            raw_uniforms,
            tone_mapped_bind_group,
            raw_bind_group,
        }
    }

    /// Upload camera and exposure, and the instances if the scene changed
    /// since the last upload.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
        exposure: f32,
    ) {
        let view_proj = scene.camera().view_proj().to_cols_array_2d();
        let uniforms = |tone_mapping: u32| SceneUniforms {
            view_proj,
            exposure,
            tone_mapping,
            _padding: [0.0; 2],
        };
        queue.write_buffer(&self.tone_mapped_uniforms, 0, bytemuck::bytes_of(&uniforms(1)));
        queue.write_buffer(&self.raw_uniforms, 0, bytemuck::bytes_of(&uniforms(0)));

        if self.revision == Some(scene.revision()) {
            return;
        }

        let instances: Vec<ParticleInstance> = scene.instances();
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            log::debug!("instance buffer grown to {}", self.instance_capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.instance_count = instances.len() as u32;
        self.revision = Some(scene.revision());
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        output: SceneOutput,
    ) {
        let (label, pipeline, bind_group) = match output {
            SceneOutput::Display => ("Scene Pass", &self.pipelines.surface, &self.tone_mapped_bind_group),
            SceneOutput::Base => ("Scene Base Pass", &self.pipelines.hdr, &self.tone_mapped_bind_group),
            SceneOutput::Raw => ("Scene Bloom Source Pass", &self.pipelines.hdr, &self.raw_bind_group),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if self.instance_count == 0 {
            return;
        }

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Particle Instances"),
        size: (capacity * std::mem::size_of::<ParticleInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<SceneUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::SCENE.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        1 => Float32x3,
                        2 => Float32,
                        3 => Float32x3
                    ],
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
