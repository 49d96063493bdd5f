use super::scroll::SceneInputs;
use super::tier::{ActivityLevel, QualityTier, RenderParams};
use crate::constants::*;
use glam::{Vec2, Vec3};

/// Per-frame timing handed in by the animation-frame callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub delta_sec: f32,
    pub elapsed_sec: f32,
    /// Pointer position in normalised device coordinates (-1..1).
    pub pointer: Vec2,
}

/// Cosmetic state recomputed from scroll progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollStyle {
    pub scale: f32,
    pub tint: Vec3,
}

/// What one frame should do. Work not scheduled here is skipped for this
/// frame; nothing is carried over or batched.
#[derive(Clone, Copy, Debug)]
pub struct FramePlan {
    pub rotation_updated: bool,
    pub rotation_step: f32,
    pub camera_updated: bool,
    pub camera: Vec3,
    pub style: Option<ScrollStyle>,
    pub bloom: bool,
}

pub struct RenderThrottle {
    frame: u64,
    rotation: Vec2,
    camera: Vec3,
    last_parallax_sec: Option<f32>,
}

impl Default for RenderThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderThrottle {
    pub fn new() -> Self {
        Self {
            frame: 0,
            rotation: Vec2::ZERO,
            camera: Vec3::new(0.0, 0.0, CAMERA_Z),
            last_parallax_sec: None,
        }
    }

    /// Accumulated (x, y) rotation in radians.
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn camera(&self) -> Vec3 {
        self.camera
    }

    pub fn plan(
        &mut self,
        input: FrameInput,
        params: &RenderParams,
        inputs: &SceneInputs,
    ) -> FramePlan {
        let delta = if input.delta_sec.is_finite() {
            input.delta_sec.clamp(0.0, MAX_FRAME_DELTA_SEC)
        } else {
            0.0
        };
        let index = self.frame;
        self.frame = self.frame.wrapping_add(1);

        // deterministic frame skipping: only every `update_stride`-th frame rotates
        let stride = u64::from(params.update_stride.max(1));
        let rotation_updated = index % stride == 0;
        let rotation_step = if rotation_updated {
            delta * inputs.rotation_speed() * params.rotation_multiplier
        } else {
            0.0
        };
        self.rotation += Vec2::splat(rotation_step);

        let camera_updated = self.parallax_due(input.elapsed_sec);
        if camera_updated {
            let target = Vec3::new(
                input.pointer.x.clamp(-1.0, 1.0) * PARALLAX_MAX_OFFSET,
                input.pointer.y.clamp(-1.0, 1.0) * PARALLAX_MAX_OFFSET,
                CAMERA_Z,
            );
            self.camera = self.camera.lerp(target, PARALLAX_LERP);
            self.last_parallax_sec = Some(input.elapsed_sec);
        }

        let refresh_style = match (params.tier, params.activity) {
            (_, ActivityLevel::Dormant) => rotation_updated,
            (QualityTier::Full, _) => true,
            _ => input.elapsed_sec.rem_euclid(REDUCED_STYLE_INTERVAL_SEC) < delta,
        };
        let style = refresh_style.then(|| ScrollStyle {
            scale: inputs.scale(),
            tint: inputs.tint(),
        });

        FramePlan {
            rotation_updated,
            rotation_step,
            camera_updated,
            camera: self.camera,
            style,
            bloom: params.post_processing,
        }
    }

    fn parallax_due(&self, elapsed_sec: f32) -> bool {
        match self.last_parallax_sec {
            None => true,
            Some(last) => elapsed_sec < last || elapsed_sec - last >= PARALLAX_INTERVAL_SEC,
        }
    }
}
