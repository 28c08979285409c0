//! wgpu renderer.
//!
//! Two passes per frame:
//!
//! 1. [`StarPass`] draws the star sprites into an offscreen HDR colour target
//!    with a depth buffer.
//! 2. [`VolumePass`] draws a fullscreen triangle to the swapchain, raymarching
//!    the density field over the offscreen colour and depth and tone mapping
//!    the result.
//!
//! Until the first density field is published the volume pass only tone maps
//! the stars.

mod stars;
mod volume;

use std::sync::Arc;

use winit::window::Window;

pub use stars::StarPass;
pub use volume::VolumePass;

use crate::camera::Camera;
use crate::error::GpuError;
use crate::galaxy::Galaxy;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub(crate) const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Offscreen colour and depth the star pass renders into.
struct SceneTarget {
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl SceneTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Color Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SCENE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self {
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }
}

/// Window surface, device and both render passes.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    scene: SceneTarget,
    stars: StarPass,
    volume: VolumePass,
    pub camera: Camera,
}

impl GpuState {
    /// Initialize wgpu for `window` and upload the galaxy's current stars.
    pub async fn new(window: Arc<Window>, galaxy: &Galaxy) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
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
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let scene = SceneTarget::new(&device, config.width, config.height);
        let stars = StarPass::new(&device, galaxy.catalog());
        let volume = VolumePass::new(&device, &scene.color_view, &scene.depth_view, surface_format);

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            scene,
            stars,
            volume,
            camera: Camera::new().with_distance(galaxy.params().galactic_radius * 2.0),
        };
        state.sync(galaxy);
        Ok(state)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.scene = SceneTarget::new(&self.device, new_size.width, new_size.height);
            self.volume
                .rebind(&self.device, &self.scene.color_view, &self.scene.depth_view);
        }
    }

    /// Upload whatever changed in `galaxy` since the last call.
    pub fn sync(&mut self, galaxy: &Galaxy) {
        self.stars.sync(&self.device, galaxy.catalog());
        self.volume.sync_field(
            &self.device,
            galaxy.field(),
            galaxy.field_generation(),
            &self.scene.color_view,
            &self.scene.depth_view,
        );
    }

    /// Render one frame of `galaxy` at animation time `time`.
    pub fn render(&mut self, galaxy: &Galaxy, time: f32) -> Result<(), wgpu::SurfaceError> {
        self.sync(galaxy);

        let frame = self.camera.frame(self.config.width, self.config.height);
        let aspect = self.config.width as f32 / self.config.height as f32;
        let time_scale = galaxy.params().orbital_time_scale;
        self.stars.update(
            &self.queue,
            self.camera.view_matrix(),
            self.camera.projection_matrix(aspect),
            time,
            time_scale,
        );
        self.volume.update(
            &self.queue,
            frame.inv_view_proj,
            frame.position,
            time,
            galaxy.volume_config(),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Star pass
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Star Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.scene.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.stars.draw(&mut render_pass);
        }

        // Volume pass
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Volume Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.volume.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
