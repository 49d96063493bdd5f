use crate::constants::MSAA_SAMPLES;
use crate::core::{ContextHealth, Disposable, FramePlan, RenderParams, SurfaceResources};
use glam::Vec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use web_sys as web;

mod helpers;
mod post;
mod scene;
mod targets;

pub use scene::{SceneGeometry, SceneMaterial};
use scene::SceneUniforms;
use targets::RenderTargets;

pub(crate) static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub(crate) static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

/// All GPU state for one mounted surface.
pub type GpuSurface = SurfaceResources<SceneGeometry, SceneMaterial, GpuContext>;

/// Device, swapchain surface and the offscreen targets that depend on it.
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
    canvas: Option<web::HtmlCanvasElement>,
    targets: RenderTargets,
    post: post::PostResources,
    post_groups: post::PostBindGroups,
    lost: Arc<AtomicBool>,
}

impl GpuContext {
    async fn new(canvas: &web::HtmlCanvasElement, sample_count: u32) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: Some("hero_scene_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let lost = Arc::new(AtomicBool::new(false));
        let lost_flag = lost.clone();
        device.set_device_lost_callback(move |reason, msg| {
            // our own dispose destroys the device; only report real losses
            if !matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                log::warn!("[gpu] device lost: {}", msg);
                lost_flag.store(true, Ordering::SeqCst);
            }
        });

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height, sample_count);
        let post = post::PostResources::new(&device, format);
        let post_groups = post.bind_groups(&device, &targets);
        post.write_uniforms(&queue, &targets);

        Ok(Self {
            device,
            queue,
            surface: Some(surface),
            config,
            canvas: Some(canvas.clone()),
            targets,
            post,
            post_groups,
            lost,
        })
    }

    pub fn canvas(&self) -> Option<&web::HtmlCanvasElement> {
        self.canvas.as_ref()
    }

    /// Reconfigure for a new backing size and/or sample count. No-op when
    /// nothing changed.
    pub fn resize(&mut self, width: u32, height: u32, antialiasing: bool) {
        if width == 0 || height == 0 {
            return;
        }
        let samples = if antialiasing { MSAA_SAMPLES } else { 1 };
        if self.targets.matches(width, height, samples) {
            return;
        }
        let Some(surface) = &self.surface else {
            return;
        };
        self.config.width = width;
        self.config.height = height;
        surface.configure(&self.device, &self.config);
        self.targets.destroy();
        self.targets = RenderTargets::new(&self.device, width, height, samples);
        self.post_groups = self.post.bind_groups(&self.device, &self.targets);
        self.post.write_uniforms(&self.queue, &self.targets);
    }

    fn draw(
        &mut self,
        geometry: &SceneGeometry,
        material: &SceneMaterial,
        uniforms: &SceneUniforms,
        bloom: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };
        let frame = surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.queue
            .write_buffer(&material.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let (color, resolve) = self.targets.scene_attachment();
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color,
                    resolve_target: resolve,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(material.pipeline(self.targets.sample_count));
            rpass.set_bind_group(0, &material.bind_group, &[]);
            rpass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
            rpass.draw(0..geometry.vertex_count, 0..1);
        }
        self.post
            .encode(&mut encoder, &self.post_groups, &self.targets, &view, bloom);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl ContextHealth for GpuContext {
    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }
}

impl Disposable for GpuContext {
    /// Destroying the device forces the context into the lost state, so no
    /// external holder can keep it alive; the canvas reference is cleared.
    fn dispose(&mut self) {
        self.targets.destroy();
        self.post.destroy();
        self.surface = None;
        self.device.destroy();
        self.canvas = None;
    }
}

/// Acquire a context and build the scene resources for surface `id`.
pub async fn create_surface(
    id: crate::core::SurfaceId,
    canvas: &web::HtmlCanvasElement,
    params: &RenderParams,
) -> anyhow::Result<GpuSurface> {
    let samples = if params.antialiasing { MSAA_SAMPLES } else { 1 };
    let context = GpuContext::new(canvas, samples).await?;
    let geometry = SceneGeometry::new(&context.device);
    let material = SceneMaterial::new(&context.device);
    log::info!(
        "[gpu] surface {} ready {}x{} msaa={}",
        id.0,
        context.config.width,
        context.config.height,
        samples
    );
    Ok(SurfaceResources::new(id, geometry, material, context))
}

/// Render one planned frame. Returns `Err` only for swapchain errors; the
/// caller decides whether to skip or treat it as a loss.
pub fn render_frame(
    surface: &mut GpuSurface,
    plan: &FramePlan,
    rotation: Vec2,
    scale: f32,
    tint: glam::Vec3,
) -> Result<(), wgpu::SurfaceError> {
    let Some((geometry, material, context)) = surface.parts_mut() else {
        return Ok(());
    };
    let aspect = context.config.width as f32 / context.config.height.max(1) as f32;
    let uniforms = SceneUniforms::new(aspect, plan.camera, rotation, scale, tint);
    context.draw(geometry, material, &uniforms, plan.bloom)
}
