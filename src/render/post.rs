use super::helpers::{self, HDR_FORMAT};
use super::targets::RenderTargets;
use crate::constants::{BLOOM_STRENGTH, BLOOM_THRESHOLD};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PostUniforms {
    resolution: [f32; 2],
    blur_dir: [f32; 2],
    bloom_strength: f32,
    threshold: f32,
    _pad: [f32; 2],
}

/// Bloom chain: bright-pass, separable blur at half resolution, composite.
/// Each pass has its own uniform buffer since all writes land before submit.
pub(crate) struct PostResources {
    bgl0: wgpu::BindGroupLayout, // tex+sampler+uniform
    bgl1: wgpu::BindGroupLayout, // tex+sampler
    sampler: wgpu::Sampler,
    bright_uniforms: wgpu::Buffer,
    blur_h_uniforms: wgpu::Buffer,
    blur_v_uniforms: wgpu::Buffer,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    present_pipeline: wgpu::RenderPipeline,
}

pub(crate) struct PostBindGroups {
    from_hdr: wgpu::BindGroup,
    from_bloom_a: wgpu::BindGroup,
    from_bloom_b: wgpu::BindGroup,
    bloom_a_only: wgpu::BindGroup,
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl PostResources {
    pub(crate) fn new(device: &wgpu::Device, swap_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(super::POST_WGSL.into()),
        });
        let bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl0"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bgl1 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl1"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let size = std::mem::size_of::<PostUniforms>();
        let bright_uniforms = helpers::create_uniform_buffer(device, "post_bright", size);
        let blur_h_uniforms = helpers::create_uniform_buffer(device, "post_blur_h", size);
        let blur_v_uniforms = helpers::create_uniform_buffer(device, "post_blur_v", size);

        let pl_single = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post_0"),
            bind_group_layouts: &[&bgl0],
            push_constant_ranges: &[],
        });
        let pl_composite = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post_comp"),
            bind_group_layouts: &[&bgl0, &bgl1],
            push_constant_ranges: &[],
        });
        let bright_pipeline =
            helpers::make_post_pipeline(device, &pl_single, &shader, "fs_bright", HDR_FORMAT);
        let blur_pipeline =
            helpers::make_post_pipeline(device, &pl_single, &shader, "fs_blur", HDR_FORMAT);
        let composite_pipeline = helpers::make_post_pipeline(
            device,
            &pl_composite,
            &shader,
            "fs_composite",
            swap_format,
        );
        let present_pipeline =
            helpers::make_post_pipeline(device, &pl_single, &shader, "fs_present", swap_format);

        Self {
            bgl0,
            bgl1,
            sampler,
            bright_uniforms,
            blur_h_uniforms,
            blur_v_uniforms,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            present_pipeline,
        }
    }

    pub(crate) fn bind_groups(
        &self,
        device: &wgpu::Device,
        targets: &RenderTargets,
    ) -> PostBindGroups {
        let with_uniforms = |label: &str, view: &wgpu::TextureView, uniforms: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.bgl0,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        };
        PostBindGroups {
            from_hdr: with_uniforms("bg_hdr", &targets.hdr_view, &self.bright_uniforms),
            from_bloom_a: with_uniforms(
                "bg_from_bloom_a",
                &targets.bloom_a_view,
                &self.blur_h_uniforms,
            ),
            from_bloom_b: with_uniforms(
                "bg_from_bloom_b",
                &targets.bloom_b_view,
                &self.blur_v_uniforms,
            ),
            bloom_a_only: device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("bg_bloom_a_only"),
                layout: &self.bgl1,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            }),
        }
    }

    /// Uniforms only depend on target size; write them when targets change.
    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, targets: &RenderTargets) {
        let res = [
            (targets.width.max(2) / 2) as f32,
            (targets.height.max(2) / 2) as f32,
        ];
        let make = |blur_dir: [f32; 2]| PostUniforms {
            resolution: res,
            blur_dir,
            bloom_strength: BLOOM_STRENGTH,
            threshold: BLOOM_THRESHOLD,
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.bright_uniforms, 0, bytemuck::bytes_of(&make([0.0, 0.0])));
        queue.write_buffer(&self.blur_h_uniforms, 0, bytemuck::bytes_of(&make([1.0, 0.0])));
        queue.write_buffer(&self.blur_v_uniforms, 0, bytemuck::bytes_of(&make([0.0, 1.0])));
    }

    /// Encode the post chain from the resolved HDR target to `output`.
    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        groups: &PostBindGroups,
        targets: &RenderTargets,
        output: &wgpu::TextureView,
        bloom: bool,
    ) {
        if !bloom {
            helpers::blit(
                encoder,
                "present",
                output,
                &self.present_pipeline,
                &groups.from_hdr,
                None,
            );
            return;
        }
        helpers::blit(
            encoder,
            "bright_pass",
            &targets.bloom_a_view,
            &self.bright_pipeline,
            &groups.from_hdr,
            None,
        );
        helpers::blit(
            encoder,
            "blur_h",
            &targets.bloom_b_view,
            &self.blur_pipeline,
            &groups.from_bloom_a,
            None,
        );
        helpers::blit(
            encoder,
            "blur_v",
            &targets.bloom_a_view,
            &self.blur_pipeline,
            &groups.from_bloom_b,
            None,
        );
        helpers::blit(
            encoder,
            "composite",
            output,
            &self.composite_pipeline,
            &groups.from_hdr,
            Some(&groups.bloom_a_only),
        );
    }

    pub(crate) fn destroy(&self) {
        self.bright_uniforms.destroy();
        self.blur_h_uniforms.destroy();
        self.blur_v_uniforms.destroy();
    }
}
