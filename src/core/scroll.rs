use crate::constants::*;
use glam::Vec3;

/// Raw page measurements taken on a scroll event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
    pub hero_height: f64,
}

impl ScrollMetrics {
    /// Overall page progress in percent, 0 when the page cannot scroll.
    pub fn progress(&self) -> f32 {
        let total = self.document_height - self.viewport_height;
        if total.is_nan() || total <= 0.0 || !self.scroll_top.is_finite() {
            return 0.0;
        }
        ((self.scroll_top / total) * 100.0).clamp(0.0, 100.0) as f32
    }

    pub fn is_in_hero(&self) -> bool {
        self.scroll_top < self.hero_height
    }
}

/// Inbound cosmetic parameters supplied by the host page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneInputs {
    /// 0..=100
    pub scroll_progress: f32,
    /// Layout only; never consulted by the lifecycle.
    pub is_in_hero: bool,
}

impl Default for SceneInputs {
    fn default() -> Self {
        Self {
            scroll_progress: 0.0,
            is_in_hero: true,
        }
    }
}

impl SceneInputs {
    pub fn set_scroll_progress(&mut self, progress: f32) {
        self.scroll_progress = if progress.is_finite() {
            progress.clamp(0.0, 100.0)
        } else {
            0.0
        };
    }

    fn factor(&self) -> f32 {
        self.scroll_progress / 100.0
    }

    pub fn rotation_speed(&self) -> f32 {
        BASE_ROTATION_SPEED + self.scroll_progress * ROTATION_SPEED_PER_PERCENT
    }

    pub fn scale(&self) -> f32 {
        1.0 + self.factor() * SCROLL_SCALE_GAIN
    }

    pub fn tint(&self) -> Vec3 {
        Vec3::from(START_COLOR).lerp(Vec3::from(END_COLOR), self.factor())
    }
}
