use super::error::ConfigError;
use serde::Deserialize;

/// Tunable lifecycle thresholds.
///
/// Every numeric cutoff the controller and sampler use lives here so a page
/// can adjust them (via `data-scene-config` JSON) without a rebuild. Missing
/// fields fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    /// Viewports narrower than this are mobile-classed and never animate.
    pub mobile_breakpoint_px: u32,
    /// Viewports narrower than this run at the reduced tier.
    pub reduced_width_below_px: u32,
    /// Core counts at or below this run at the reduced tier.
    pub reduced_max_cores: u32,
    pub resize_throttle_ms: u64,
    /// How long the tab may stay hidden before the surface is torn down.
    pub hidden_grace_ms: u64,
    /// Delay before re-evaluating after the tab becomes visible again.
    pub visible_settle_ms: u64,
    pub idle_check_interval_ms: u64,
    /// Idle time after which post-processing is switched off.
    pub quiet_idle_ms: u64,
    /// Idle time after which rotation drops to a trickle.
    pub dormant_idle_ms: u64,
    /// While dormant, only every Nth frame does rotation work.
    pub dormant_frame_stride: u32,
    pub scroll_throttle_ms: u64,
    /// When set, scroll progress and hero membership are tracked against
    /// this element instead of being pushed by the host page.
    pub hero_element_id: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint_px: 768,
            reduced_width_below_px: 1400,
            reduced_max_cores: 6,
            resize_throttle_ms: 200,
            hidden_grace_ms: 10_000,
            visible_settle_ms: 1_000,
            idle_check_interval_ms: 1_000,
            quiet_idle_ms: 10_000,
            dormant_idle_ms: 30_000,
            dormant_frame_stride: 12,
            scroll_throttle_ms: 100,
            hero_element_id: None,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero: [(&'static str, u64); 8] = [
            ("mobileBreakpointPx", self.mobile_breakpoint_px as u64),
            ("resizeThrottleMs", self.resize_throttle_ms),
            ("hiddenGraceMs", self.hidden_grace_ms),
            ("visibleSettleMs", self.visible_settle_ms),
            ("idleCheckIntervalMs", self.idle_check_interval_ms),
            ("quietIdleMs", self.quiet_idle_ms),
            ("dormantFrameStride", self.dormant_frame_stride as u64),
            ("scrollThrottleMs", self.scroll_throttle_ms),
        ];
        if let Some(&(field, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { field });
        }
        if self.reduced_width_below_px <= self.mobile_breakpoint_px {
            return Err(ConfigError::WidthOrder {
                mobile: self.mobile_breakpoint_px,
                reduced: self.reduced_width_below_px,
            });
        }
        if self.dormant_idle_ms <= self.quiet_idle_ms {
            return Err(ConfigError::IdleOrder {
                quiet: self.quiet_idle_ms,
                dormant: self.dormant_idle_ms,
            });
        }
        Ok(())
    }
}
