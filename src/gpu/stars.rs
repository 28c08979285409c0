//! Instanced star sprites.
//!
//! Each star is one instance of a six-vertex camera-facing quad. The vertex
//! shader applies the orbit law to the star's initial `(r, theta0, z)`, so
//! the instance buffer is uploaded once per catalog and never touched while
//! the galaxy turns.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::{DEPTH_FORMAT, SCENE_FORMAT};
use crate::shader_utils::orbit_wgsl;
use crate::stars::{StarCatalog, StarInstance};

/// Per-frame uniforms of the star pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct StarUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    time: f32,
    time_scale: f32,
    _padding: [f32; 2],
}

/// GPU state for the star pass.
pub struct StarPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    num_stars: u32,
    catalog: StarCatalog,
}

impl StarPass {
    /// Create the pipeline and upload `catalog`.
    pub fn new(device: &wgpu::Device, catalog: &StarCatalog) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Star Uniform Buffer"),
            size: std::mem::size_of::<StarUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Star Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Star Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Star Shader"),
            source: wgpu::ShaderSource::Wgsl(star_shader().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Star Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let attributes = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3, // r, theta0, z
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32, // size
            },
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3, // color
            },
        ];

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Star Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SCENE_FORMAT,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
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
        });

        let (instance_buffer, num_stars) = create_instance_buffer(device, catalog);

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            instance_buffer,
            num_stars,
            catalog: catalog.clone(),
        }
    }

    /// Re-upload if `catalog` is a different generation than the current one.
    pub fn sync(&mut self, device: &wgpu::Device, catalog: &StarCatalog) {
        if self.catalog.ptr_eq(catalog) {
            return;
        }
        let (buffer, count) = create_instance_buffer(device, catalog);
        self.instance_buffer = buffer;
        self.num_stars = count;
        self.catalog = catalog.clone();
        log::debug!("uploaded {count} star instances");
    }

    /// Write this frame's uniforms.
    pub fn update(&self, queue: &wgpu::Queue, view: Mat4, proj: Mat4, time: f32, time_scale: f32) {
        let uniforms = StarUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            time,
            time_scale,
            _padding: [0.0; 2],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the draw.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.num_stars == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.draw(0..6, 0..self.num_stars);
    }
}

fn create_instance_buffer(device: &wgpu::Device, catalog: &StarCatalog) -> (wgpu::Buffer, u32) {
    let mut instances = catalog.to_instances();
    let count = instances.len() as u32;
    if instances.is_empty() {
        // Zero-sized vertex buffers are not allowed.
        instances.push(StarInstance::zeroed());
    }
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Star Instance Buffer"),
        contents: bytemuck::cast_slice(&instances),
        usage: wgpu::BufferUsages::VERTEX,
    });
    (buffer, count)
}

/// Star sprite shader.
pub(crate) fn star_shader() -> String {
    format!("{}\n{}", orbit_wgsl(), STAR_SHADER)
}

const STAR_SHADER: &str = r#"
struct StarUniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    time: f32,
    time_scale: f32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: StarUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) init_pos: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, 0.5),
    );
    let corner = corners[vertex_index];

    let world = star_position(init_pos, uniforms.time, uniforms.time_scale);
    var view_pos = uniforms.view * vec4<f32>(world, 1.0);
    view_pos = vec4<f32>(view_pos.xy + corner * size, view_pos.zw);

    var out: VertexOutput;
    out.clip_position = uniforms.proj * view_pos;
    out.color = color;
    out.uv = corner * 2.0;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let falloff = max(1.0 - dot(in.uv, in.uv), 0.0);
    let alpha = falloff * falloff;
    if (alpha < 0.05) {
        discard;
    }
    let color = pow(max(in.color, vec3<f32>(0.0)), vec3<f32>(0.85)) * 1.35;
    return vec4<f32>(color * alpha, 1.0);
}
"#;
