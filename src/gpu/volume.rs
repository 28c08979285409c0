//! Volumetric nebula pass.
//!
//! A fullscreen triangle whose fragment shader raymarches the density field
//! (a storage buffer of `(density, temperature)` pairs) and composites the
//! result over the star pass, reading the offscreen scene colour and depth.
//! The integrator mirrors [`raymarch`](crate::raymarch) step for step. The
//! output is tone mapped for the swapchain.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::field::DensityField;
use crate::raymarch::{VolumeConfig, MAX_SHADOW_STEPS, MAX_STEPS};
use crate::shader_utils::{orbit_wgsl, HASH_WGSL};

/// GPU parameters for the volumetric pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct VolumeParams {
    inv_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    time: f32,
    box_min: [f32; 3],
    time_scale: f32,
    box_max: [f32; 3],
    grid_size: u32,
    light_position: [f32; 3],
    steps: u32,
    light_radiance: [f32; 3],
    shadow_steps: u32,
    cool_color: [f32; 3],
    density_factor: f32,
    dust_color: [f32; 3],
    absorption: f32,
    warm_color: [f32; 3],
    scattering: f32,
    /// `(g, g2, blend, shadow_strength)`.
    phase: [f32; 4],
    /// `(multi_scatter, ambient, powder, shadow_density_scale)`.
    optics: [f32; 4],
    has_field: u32,
    jitter: u32,
    _padding: [u32; 2],
}

/// GPU state for the volumetric pass.
pub struct VolumePass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    field_buffer: wgpu::Buffer,
    field: Option<(u32, Vec3, Vec3)>,
    field_generation: u64,
}

impl VolumePass {
    /// Create the pipeline, bound to the given scene colour and depth views.
    pub fn new(
        device: &wgpu::Device,
        scene_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Volume Params Buffer"),
            size: std::mem::size_of::<VolumeParams>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let field_buffer = empty_field_buffer(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Volume Bind Group Layout"),
            entries: &[
                // Volume params
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Density field
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Scene colour
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Scene depth
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = create_bind_group(
            device,
            &bind_group_layout,
            &params_buffer,
            &field_buffer,
            scene_view,
            depth_view,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Volume Shader"),
            source: wgpu::ShaderSource::Wgsl(volume_shader().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Volume Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Volume Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            params_buffer,
            field_buffer,
            field: None,
            field_generation: 0,
        }
    }

    /// Upload `field` unless generation `generation` is already resident.
    pub fn sync_field(
        &mut self,
        device: &wgpu::Device,
        field: Option<&DensityField>,
        generation: u64,
        scene_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let Some(field) = field else {
            return;
        };
        if field.as_slice().is_empty() || (self.field.is_some() && self.field_generation == generation) {
            return;
        }
        self.field_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Density Field Buffer"),
            contents: bytemuck::cast_slice(field.as_slice()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let bounds = field.bounds();
        self.field = Some((field.grid_size(), bounds.min, bounds.max));
        self.field_generation = generation;
        self.rebind(device, scene_view, depth_view);
        log::debug!(
            "uploaded {}³ density field {generation} to the GPU",
            field.grid_size()
        );
    }

    /// Recreate the bind group after the scene target was resized.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        scene_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        self.bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.params_buffer,
            &self.field_buffer,
            scene_view,
            depth_view,
        );
    }

    /// Write this frame's parameters.
    pub fn update(
        &self,
        queue: &wgpu::Queue,
        inv_view_proj: Mat4,
        camera_pos: Vec3,
        time: f32,
        config: &VolumeConfig,
    ) {
        let params = volume_params(self.field, inv_view_proj, camera_pos, time, config);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    /// Record the fullscreen draw.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

fn empty_field_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Empty Density Field Buffer"),
        contents: bytemuck::cast_slice(&[0.0f32; 2]),
        usage: wgpu::BufferUsages::STORAGE,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    params_buffer: &wgpu::Buffer,
    field_buffer: &wgpu::Buffer,
    scene_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Volume Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: field_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(scene_view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(depth_view),
            },
        ],
    })
}

/// Pack the uniforms. `field` is `(grid_size, box_min, box_max)` of the
/// resident field, `None` for pass-through.
pub(crate) fn volume_params(
    field: Option<(u32, Vec3, Vec3)>,
    inv_view_proj: Mat4,
    camera_pos: Vec3,
    time: f32,
    config: &VolumeConfig,
) -> VolumeParams {
    let (grid_size, box_min, box_max) = field.unwrap_or((0, Vec3::ZERO, Vec3::ZERO));
    VolumeParams {
        inv_view_proj: inv_view_proj.to_cols_array_2d(),
        camera_pos: camera_pos.to_array(),
        time,
        box_min: box_min.to_array(),
        time_scale: config.time_scale,
        box_max: box_max.to_array(),
        grid_size,
        light_position: config.light_position,
        steps: config.steps.clamp(1, MAX_STEPS),
        light_radiance: config.light_radiance().to_array(),
        shadow_steps: config.shadow_steps.min(MAX_SHADOW_STEPS),
        cool_color: config.cool_color.rgb().to_array(),
        density_factor: config.density_factor,
        dust_color: config.dust_color.rgb().to_array(),
        absorption: config.absorption,
        warm_color: config.warm_color.rgb().to_array(),
        scattering: config.scattering,
        phase: [
            config.phase_g,
            config.phase_g2,
            config.phase_blend,
            config.shadow_strength,
        ],
        optics: [
            config.multi_scatter_strength,
            config.ambient_density,
            config.powder_strength,
            config.shadow_density_scale,
        ],
        has_field: field.is_some() as u32,
        jitter: config.jitter as u32,
        _padding: [0; 2],
    }
}

/// Full volumetric shader source.
pub(crate) fn volume_shader() -> String {
    format!(
        "{}\n{}\nconst MAX_STEPS: u32 = {}u;\nconst MAX_SHADOW_STEPS: u32 = {}u;\n{}",
        HASH_WGSL,
        orbit_wgsl(),
        MAX_STEPS,
        MAX_SHADOW_STEPS,
        VOLUME_SHADER
    )
}

const VOLUME_SHADER: &str = r#"
const PI: f32 = 3.14159265359;
const EMPTY_SPACE_THRESHOLD: f32 = 0.001;
const TRANSMITTANCE_CUTOFF: f32 = 0.005;
const NO_SURFACE: f32 = 1e20;
const EXPOSURE: f32 = 1.1;

struct VolumeParams {
    inv_view_proj: mat4x4<f32>,
    camera_pos: vec3<f32>,
    time: f32,
    box_min: vec3<f32>,
    time_scale: f32,
    box_max: vec3<f32>,
    grid_size: u32,
    light_position: vec3<f32>,
    steps: u32,
    light_radiance: vec3<f32>,
    shadow_steps: u32,
    cool_color: vec3<f32>,
    density_factor: f32,
    dust_color: vec3<f32>,
    absorption: f32,
    warm_color: vec3<f32>,
    scattering: f32,
    phase: vec4<f32>,
    optics: vec4<f32>,
    has_field: u32,
    jitter: u32,
    _padding: vec2<u32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> params: VolumeParams;

@group(0) @binding(1)
var<storage, read> field: array<f32>;

@group(0) @binding(2)
var scene_color: texture_2d<f32>;

@group(0) @binding(3)
var scene_depth: texture_depth_2d;

// Fullscreen triangle
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

fn lerp2(a: vec2<f32>, b: vec2<f32>, t: f32) -> vec2<f32> {
    return a + (b - a) * t;
}

fn lerp3(a: vec3<f32>, b: vec3<f32>, t: f32) -> vec3<f32> {
    return a + (b - a) * t;
}

fn cell(x: u32, y: u32, z: u32) -> vec2<f32> {
    let s = params.grid_size;
    let i = 2u * (x + y * s + z * s * s);
    return vec2<f32>(field[i], field[i + 1u]);
}

// Trilinear (density, temperature) at a point of the rotating scene
fn sample_density(p: vec3<f32>) -> vec2<f32> {
    let q = corotate_sample_point(p, params.time, params.time_scale);
    if (any(q < params.box_min) || any(q > params.box_max)) {
        return vec2<f32>(0.0);
    }
    let s = params.grid_size;
    let max_index = f32(s - 1u);
    let g = clamp(
        (q - params.box_min) / (params.box_max - params.box_min) * f32(s) - 0.5,
        vec3<f32>(0.0),
        vec3<f32>(max_index),
    );
    let g0 = floor(g);
    let f = g - g0;
    let c0 = vec3<u32>(g0);
    let c1 = min(c0 + vec3<u32>(1u), vec3<u32>(s - 1u));

    let v00 = lerp2(cell(c0.x, c0.y, c0.z), cell(c1.x, c0.y, c0.z), f.x);
    let v10 = lerp2(cell(c0.x, c1.y, c0.z), cell(c1.x, c1.y, c0.z), f.x);
    let v01 = lerp2(cell(c0.x, c0.y, c1.z), cell(c1.x, c0.y, c1.z), f.x);
    let v11 = lerp2(cell(c0.x, c1.y, c1.z), cell(c1.x, c1.y, c1.z), f.x);
    let v = lerp2(lerp2(v00, v10, f.y), lerp2(v01, v11, f.y), f.z);

    return vec2<f32>(
        clamp(v.x * params.density_factor, 0.0, 1000.0),
        clamp(v.y, 0.0, 1.0),
    );
}

fn intersect_box(ray_origin: vec3<f32>, ray_dir: vec3<f32>) -> vec2<f32> {
    let inv_dir = 1.0 / ray_dir;
    let t1 = (params.box_min - ray_origin) * inv_dir;
    let t2 = (params.box_max - ray_origin) * inv_dir;
    let tmin = min(t1, t2);
    let tmax = max(t1, t2);
    let t_enter = max(max(tmin.x, tmin.y), tmin.z);
    let t_exit = min(min(tmax.x, tmax.y), tmax.z);
    return vec2<f32>(max(t_enter, 0.0), t_exit);
}

fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = max(1.0 + g2 - 2.0 * g * cos_theta, 1e-6);
    return (1.0 - g2) / (4.0 * PI * pow(denom, 1.5));
}

fn beer_powder(sigma_t: f32, distance: f32) -> f32 {
    let beer = exp(-sigma_t * distance);
    let powder = 1.0 - exp(-sigma_t * distance * 2.0);
    return beer * mix(1.0, powder, params.optics.z);
}

fn absorption_at(density: f32, temperature: f32) -> f32 {
    return params.absorption * density * mix(0.45, 1.65, 1.0 - temperature);
}

fn scattering_at(density: f32, temperature: f32) -> f32 {
    return params.scattering * density * mix(0.55, 1.15, temperature);
}

fn emission_strength(density: f32, temperature: f32) -> f32 {
    let hot = smoothstep(0.35, 0.9, temperature);
    let mid = smoothstep(0.2, 0.55, temperature) * (1.0 - hot * 0.6);
    return (hot * 0.9 + mid * 0.45) * density;
}

fn core_emission(p: vec3<f32>, density: f32, temperature: f32) -> vec3<f32> {
    let core = exp(-length(p.xy) * 3.0);
    let hot = smoothstep(0.5, 1.0, temperature);
    return vec3<f32>(1.0, 0.85, 0.65) * core * hot * density;
}

fn core_light_falloff(p: vec3<f32>) -> f32 {
    let r = length(p.xy);
    return 1.0 / (1.0 + 0.04 * r * r) * exp(-abs(p.z) * 0.3);
}

fn nebula_color(temperature: f32) -> vec3<f32> {
    if (temperature < 0.35) {
        return lerp3(params.dust_color, params.cool_color, smoothstep(0.05, 0.35, temperature));
    }
    return lerp3(params.cool_color, params.warm_color, smoothstep(0.35, 1.0, temperature));
}

fn safe_normalize(v: vec3<f32>) -> vec3<f32> {
    let len = length(v);
    if (len > 0.0) {
        return v / len;
    }
    return vec3<f32>(0.0);
}

// (transmittance, multi_scatter) toward the light
fn light_march(p: vec3<f32>, light_dir: vec3<f32>, light_distance: f32, jitter: f32) -> vec2<f32> {
    let hit = intersect_box(p, light_dir);
    let end = min(hit.y, light_distance);
    let steps = min(params.shadow_steps, MAX_SHADOW_STEPS);
    if (hit.x > hit.y || end <= hit.x || steps == 0u) {
        return vec2<f32>(1.0, 0.0);
    }

    let base_step = (end - hit.x) / f32(steps) * 0.5;
    var t = hit.x + jitter * base_step * 0.5;
    var optical_depth = 0.0;
    var multi_scatter = 0.0;
    var growth = 1.0;

    for (var s = 0u; s < steps; s++) {
        if (t >= end || optical_depth > 12.0) {
            break;
        }
        let dt = base_step * growth;
        growth *= 1.15;

        let d = sample_density(p + light_dir * t);
        let density = d.x * params.optics.w;
        if (density > EMPTY_SPACE_THRESHOLD) {
            let sigma_t = absorption_at(density, d.y) + scattering_at(density, d.y);
            optical_depth += sigma_t * dt;
            multi_scatter += exp(-optical_depth) * density * dt * 0.5;
        }
        t += dt;
    }

    return vec2<f32>(exp(-optical_depth * params.phase.w), multi_scatter);
}

fn march(origin: vec3<f32>, dir: vec3<f32>, scene: vec3<f32>, surface: f32, jitter: f32) -> vec3<f32> {
    let hit = intersect_box(origin, dir);
    if (hit.x > hit.y) {
        return scene;
    }
    let near = hit.x;
    // Gas behind the surface is never gathered, so a dim star can come out
    // darker than open sky next to it.
    let end = min(hit.y, surface);
    if (end <= near) {
        return scene;
    }
    let steps = clamp(params.steps, 1u, MAX_STEPS);

    let view_light = safe_normalize(params.light_position - origin);
    let cos_theta = dot(dir, view_light);
    let phase = mix(
        henyey_greenstein(cos_theta, params.phase.x),
        henyey_greenstein(cos_theta, params.phase.y),
        params.phase.z,
    );

    let star_tint = pow(max(scene, vec3<f32>(0.0)), vec3<f32>(1.25));
    let star_luma = smoothstep(0.04, 0.55, dot(scene, vec3<f32>(0.2126, 0.7152, 0.0722)));

    let step_size = (end - near) / f32(steps);
    var t = near + jitter * step_size;
    var accumulated = vec3<f32>(0.0);
    var transmittance = 1.0;
    var transmittance_to_scene = 1.0;
    var scene_locked = false;

    for (var i = 0u; i < steps; i++) {
        if (t >= end || transmittance < TRANSMITTANCE_CUTOFF) {
            break;
        }
        let p = origin + dir * t;
        let d = sample_density(p);
        let density = d.x;
        let temperature = d.y;
        if (density <= EMPTY_SPACE_THRESHOLD) {
            t += step_size;
            continue;
        }

        let dt = step_size * clamp(1.0 / (density * 2.0 + 1.0), 0.3, 1.0);
        let sigma_a = absorption_at(density, temperature);
        let sigma_s = scattering_at(density, temperature);
        let sigma_t = sigma_a + sigma_s;
        let step_transmittance = beer_powder(sigma_t, dt);

        let to_light = params.light_position - p;
        let light_distance = length(to_light);
        let light_dir = safe_normalize(to_light);
        let falloff = core_light_falloff(p);
        let light = light_march(p, light_dir, light_distance, fract(jitter * 7.31 + (p.x + p.y) * 37.0));

        let ahead = sample_density(p + light_dir * 0.15).x;
        let derivative = clamp((density - ahead) / 0.15, -2.0, 2.0);
        let diffuse = clamp(0.5 + derivative * 0.4, 0.1, 1.0);

        let influence = star_luma * (1.0 - clamp(density * 0.2, 0.0, 0.85));
        let color = lerp3(nebula_color(temperature), star_tint, influence * 0.5);

        let emission = core_emission(p, density, temperature) * 0.08
            + color * emission_strength(density, temperature) * 0.1;
        accumulated += emission * transmittance * dt;

        let scatter = (1.0 - step_transmittance) * (sigma_s / max(sigma_t, 1e-6));
        let single = params.light_radiance * falloff * light.x * color * phase * scatter * diffuse * 2.5;
        let multi = params.light_radiance * falloff * color * light.y * params.optics.x;
        let ambient = color * params.optics.y * density * dt * (1.0 - light.x * 0.7);
        accumulated += (single + multi + ambient) * transmittance;

        transmittance *= step_transmittance;
        t += dt;
        if (!scene_locked && t >= surface) {
            transmittance_to_scene = transmittance;
            scene_locked = true;
        }
    }

    if (!scene_locked) {
        transmittance_to_scene = transmittance;
    }
    return scene * transmittance_to_scene + accumulated;
}

fn aces_filmic(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let pixel = vec2<i32>(in.clip_position.xy);
    let scene = textureLoad(scene_color, pixel, 0).rgb;

    var color = scene;
    if (params.has_field != 0u) {
        let size = vec2<f32>(textureDimensions(scene_color));
        let uv = in.clip_position.xy / size;
        let ndc = vec2<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);

        let far = params.inv_view_proj * vec4<f32>(ndc, 1.0, 1.0);
        let ray_dir = normalize(far.xyz / far.w - params.camera_pos);

        var surface = NO_SURFACE;
        let depth = textureLoad(scene_depth, pixel, 0);
        if (depth < 1.0) {
            let world = params.inv_view_proj * vec4<f32>(ndc, depth, 1.0);
            surface = distance(world.xyz / world.w, params.camera_pos);
        }

        var jitter = 0.0;
        if (params.jitter != 0u) {
            let frame = u32(max(params.time * 60.0, 0.0));
            let p = vec2<u32>(in.clip_position.xy);
            jitter = rand(hash2(vec2<u32>(p.x, p.y + frame * 7919u)));
        }

        color = march(params.camera_pos, ray_dir, scene, surface, jitter);
    }

    return vec4<f32>(aces_filmic(max(color, vec3<f32>(0.0)) * EXPOSURE), 1.0);
}
"#;
