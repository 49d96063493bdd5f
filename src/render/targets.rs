use super::helpers::{create_texture, DEPTH_FORMAT, HDR_FORMAT};

const ATTACHMENT: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT;

/// Offscreen targets for the scene and bloom passes.
///
/// - `hdr_*` holds the resolved scene color in Rgba16Float for post-processing.
/// - `msaa_*` exists only while antialiasing is on and resolves into `hdr`.
/// - `bloom_*` are half-res ping-pong buffers for bright-pass and blur.
pub(crate) struct RenderTargets {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) sample_count: u32,
    pub(crate) hdr_tex: wgpu::Texture,
    pub(crate) hdr_view: wgpu::TextureView,
    pub(crate) msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
    pub(crate) depth_tex: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    pub(crate) bloom_a: wgpu::Texture,
    pub(crate) bloom_a_view: wgpu::TextureView,
    pub(crate) bloom_b: wgpu::Texture,
    pub(crate) bloom_b_view: wgpu::TextureView,
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32, sample_count: u32) -> Self {
        let sampled = ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let (hdr_tex, hdr_view) =
            create_texture(device, "hdr_tex", width, height, HDR_FORMAT, 1, sampled);
        let msaa = (sample_count > 1).then(|| {
            create_texture(device, "msaa_tex", width, height, HDR_FORMAT, sample_count, ATTACHMENT)
        });
        let (depth_tex, depth_view) = create_texture(
            device,
            "depth_tex",
            width,
            height,
            DEPTH_FORMAT,
            sample_count,
            ATTACHMENT,
        );
        let bw = (width.max(1) / 2).max(1);
        let bh = (height.max(1) / 2).max(1);
        let (bloom_a, bloom_a_view) =
            create_texture(device, "bloom_a", bw, bh, HDR_FORMAT, 1, sampled);
        let (bloom_b, bloom_b_view) =
            create_texture(device, "bloom_b", bw, bh, HDR_FORMAT, 1, sampled);
        Self {
            width,
            height,
            sample_count,
            hdr_tex,
            hdr_view,
            msaa,
            depth_tex,
            depth_view,
            bloom_a,
            bloom_a_view,
            bloom_b,
            bloom_b_view,
        }
    }

    pub(crate) fn matches(&self, width: u32, height: u32, sample_count: u32) -> bool {
        self.width == width && self.height == height && self.sample_count == sample_count
    }

    /// Color attachment and optional resolve target for the scene pass.
    pub(crate) fn scene_attachment(&self) -> (&wgpu::TextureView, Option<&wgpu::TextureView>) {
        match &self.msaa {
            Some((_, view)) => (view, Some(&self.hdr_view)),
            None => (&self.hdr_view, None),
        }
    }

    pub(crate) fn destroy(&self) {
        self.hdr_tex.destroy();
        if let Some((tex, _)) = &self.msaa {
            tex.destroy();
        }
        self.depth_tex.destroy();
        self.bloom_a.destroy();
        self.bloom_b.destroy();
    }
}
