use super::helpers::{self, DEPTH_FORMAT, HDR_FORMAT};
use crate::constants::*;
use crate::core::{icosahedron, Disposable, MeshVertex};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],    // rgb + metalness
    emissive: [f32; 4], // rgb * intensity + roughness
    light: [f32; 4],    // direction + intensity
    camera: [f32; 4],   // eye + ambient
}

impl SceneUniforms {
    pub(crate) fn new(
        aspect: f32,
        eye: Vec3,
        rotation: glam::Vec2,
        scale: f32,
        tint: Vec3,
    ) -> Self {
        let proj = Mat4::perspective_rh(75.0_f32.to_radians(), aspect.max(1e-3), 0.1, 1000.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let model = Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_x(rotation.x)
            * Mat4::from_scale(Vec3::splat(scale));
        let emissive = Vec3::from(EMISSIVE_COLOR) * EMISSIVE_INTENSITY;
        let light = Vec3::from(LIGHT_POSITION).normalize();
        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: tint.extend(METALNESS).to_array(),
            emissive: emissive.extend(ROUGHNESS).to_array(),
            light: light.extend(LIGHT_INTENSITY).to_array(),
            camera: eye.extend(AMBIENT_INTENSITY).to_array(),
        }
    }
}

/// Vertex data for the icosahedron.
pub struct SceneGeometry {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) vertex_count: u32,
}

impl SceneGeometry {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let vertices = icosahedron(ICOSAHEDRON_RADIUS);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("icosahedron_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }
}

impl Disposable for SceneGeometry {
    fn dispose(&mut self) {
        self.vertex_buffer.destroy();
    }
}

/// Uniforms, bind group and pipelines (single-sample and MSAA) for the mesh.
pub struct SceneMaterial {
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    pipeline_msaa: wgpu::RenderPipeline,
}

impl SceneMaterial {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(super::SCENE_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_buffer = helpers::create_uniform_buffer(
            device,
            "scene_uniforms",
            std::mem::size_of::<SceneUniforms>(),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = create_pipeline(device, &layout, &shader, 1);
        let pipeline_msaa = create_pipeline(device, &layout, &shader, MSAA_SAMPLES);
        Self {
            uniform_buffer,
            bind_group,
            pipeline,
            pipeline_msaa,
        }
    }

    pub(crate) fn pipeline(&self, sample_count: u32) -> &wgpu::RenderPipeline {
        if sample_count > 1 {
            &self.pipeline_msaa
        } else {
            &self.pipeline
        }
    }
}

impl Disposable for SceneMaterial {
    fn dispose(&mut self) {
        self.uniform_buffer.destroy();
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
