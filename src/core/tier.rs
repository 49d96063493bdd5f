use super::config::SceneConfig;
use crate::constants::*;

/// Snapshot of the device signals that drive tier selection.
///
/// Superseded on every resize, never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceProfile {
    pub viewport_width: u32,
    /// `None` when the platform does not report hardware concurrency.
    pub core_count: Option<u32>,
    pub is_mobile_viewport: bool,
}

impl DeviceProfile {
    pub fn new(viewport_width: u32, core_count: Option<u32>, config: &SceneConfig) -> Self {
        Self {
            viewport_width,
            core_count: core_count.filter(|c| *c > 0),
            is_mobile_viewport: viewport_width < config.mobile_breakpoint_px,
        }
    }

    /// Unknown core counts are treated as low-end.
    pub fn is_low_end(&self, config: &SceneConfig) -> bool {
        self.viewport_width < config.reduced_width_below_px
            || self
                .core_count
                .map_or(true, |c| c <= config.reduced_max_cores)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QualityTier {
    Disabled,
    Reduced,
    Full,
}

impl QualityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Disabled => "disabled",
            QualityTier::Reduced => "reduced",
            QualityTier::Full => "full",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityState {
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdleState {
    pub ms_since_last_activity: u64,
}

impl IdleState {
    pub const ACTIVE: IdleState = IdleState {
        ms_since_last_activity: 0,
    };

    pub fn level(self, config: &SceneConfig) -> ActivityLevel {
        let ms = self.ms_since_last_activity;
        if ms >= config.dormant_idle_ms {
            ActivityLevel::Dormant
        } else if ms >= config.quiet_idle_ms {
            ActivityLevel::Quiet
        } else {
            ActivityLevel::Active
        }
    }
}

/// Coarse idle bucket. `Quiet` drops post-processing, `Dormant` also
/// throttles rotation work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityLevel {
    Active,
    Quiet,
    Dormant,
}

/// Derive the quality tier. Idle time never changes the tier; it only
/// degrades render parameters (see [`RenderParams::derive`]).
pub fn classify(
    profile: &DeviceProfile,
    visibility: VisibilityState,
    _idle: IdleState,
    config: &SceneConfig,
) -> QualityTier {
    if profile.is_mobile_viewport || !visibility.visible {
        QualityTier::Disabled
    } else if profile.is_low_end(config) {
        QualityTier::Reduced
    } else {
        QualityTier::Full
    }
}

/// Per-surface rendering knobs handed to the render loop and GPU layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    pub tier: QualityTier,
    pub rotation_multiplier: f32,
    /// Rotation work happens on every Nth frame.
    pub update_stride: u32,
    /// Fraction of the device pixel ratio used for the backing store.
    pub resolution_scale: f32,
    pub antialiasing: bool,
    pub post_processing: bool,
    pub activity: ActivityLevel,
}

impl RenderParams {
    /// `None` for [`QualityTier::Disabled`]: no surface, nothing to render.
    pub fn derive(tier: QualityTier, idle: IdleState, config: &SceneConfig) -> Option<Self> {
        let activity = idle.level(config);
        let (rotation, scale, aa) = match tier {
            QualityTier::Disabled => return None,
            QualityTier::Reduced => (REDUCED_ROTATION_MULTIPLIER, REDUCED_RESOLUTION_SCALE, false),
            QualityTier::Full => (FULL_ROTATION_MULTIPLIER, FULL_RESOLUTION_SCALE, true),
        };
        let dormant = activity == ActivityLevel::Dormant;
        Some(Self {
            tier,
            rotation_multiplier: if dormant {
                DORMANT_ROTATION_MULTIPLIER
            } else {
                rotation
            },
            update_stride: if dormant {
                config.dormant_frame_stride.max(1)
            } else {
                1
            },
            resolution_scale: scale,
            antialiasing: aa,
            post_processing: tier == QualityTier::Full && activity == ActivityLevel::Active,
            activity,
        })
    }

    /// Effective backing-store pixel ratio for a device ratio.
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f32 {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio as f32
        } else {
            1.0
        };
        (dpr * self.resolution_scale).min(MAX_PIXEL_RATIO)
    }
}
