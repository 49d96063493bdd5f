//! Lifecycle controller for the animation surface.
//!
//! The controller is a reducer: [`Controller::apply`] takes one [`Event`],
//! updates the state and returns the side effects the host must perform
//! (create/destroy the GPU surface, start/cancel timers, attach/detach
//! listeners). It never performs them itself, so every transition can be
//! exercised without a browser.
//!
//! Invariants upheld here:
//! - at most one surface id is live at a time;
//! - `PermanentlyDisabled` is terminal;
//! - every attach/start effect is paired with exactly one detach/cancel.

use super::config::SceneConfig;
use super::tier::{classify, DeviceProfile, IdleState, QualityTier, RenderParams, VisibilityState};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Disabled,
    Reduced,
    Full,
    /// Entered on context loss; never left.
    PermanentlyDisabled,
}

impl LifecycleState {
    pub fn tier(self) -> QualityTier {
        match self {
            LifecycleState::Reduced => QualityTier::Reduced,
            LifecycleState::Full => QualityTier::Full,
            LifecycleState::Disabled | LifecycleState::PermanentlyDisabled => {
                QualityTier::Disabled
            }
        }
    }

    fn from_tier(tier: QualityTier) -> Self {
        match tier {
            QualityTier::Disabled => LifecycleState::Disabled,
            QualityTier::Reduced => LifecycleState::Reduced,
            QualityTier::Full => LifecycleState::Full,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::PermanentlyDisabled => "permanently-disabled",
            other => other.tier().as_str(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Tab hidden; tear down if still hidden when it fires.
    HideGrace,
    /// Tab visible again after a teardown; re-evaluate when it fires.
    VisibleSettle,
    /// Periodic idle sampling while a surface exists.
    IdleCheck,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownReason {
    Unmount,
    MobileViewport,
    Hidden,
    ContextLost,
    PageUnload,
    Dropped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Mount { profile: DeviceProfile, visible: bool },
    ProfileChanged(DeviceProfile),
    VisibilityChanged(bool),
    IdleUpdated(IdleState),
    TimerFired(TimerKind),
    ContextLost,
    /// Treated exactly like a context loss.
    ContextAcquireFailed,
    Unmount,
    PageUnload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    CreateSurface { id: SurfaceId, params: RenderParams },
    UpdateRenderParams { id: SurfaceId, params: RenderParams },
    DestroySurface { id: SurfaceId, reason: TeardownReason },
    StartTimer { kind: TimerKind, delay_ms: u64, repeat: bool },
    CancelTimer(TimerKind),
    AttachEnvironmentListeners,
    DetachEnvironmentListeners,
    AttachActivityTracking,
    DetachActivityTracking,
}

pub type Effects = SmallVec<[Effect; 4]>;

pub struct Controller {
    config: SceneConfig,
    state: LifecycleState,
    mounted: bool,
    profile: Option<DeviceProfile>,
    visible: bool,
    idle: IdleState,
    surface: Option<SurfaceId>,
    params: Option<RenderParams>,
    next_surface: u64,
    hide_pending: bool,
    settle_pending: bool,
    env_attached: bool,
    activity_attached: bool,
}

impl Controller {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Disabled,
            mounted: false,
            profile: None,
            visible: false,
            idle: IdleState::ACTIVE,
            surface: None,
            params: None,
            next_surface: 0,
            hide_pending: false,
            settle_pending: false,
            env_attached: false,
            activity_attached: false,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn tier(&self) -> QualityTier {
        self.state.tier()
    }

    pub fn should_render(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn render_params(&self) -> Option<RenderParams> {
        self.params
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn apply(&mut self, event: Event) -> Effects {
        let mut fx = Effects::new();
        if self.state == LifecycleState::PermanentlyDisabled {
            return fx;
        }
        match event {
            Event::Mount { profile, visible } => {
                if self.mounted {
                    log::debug!("[scene] ignoring mount of an already mounted scene");
                    return fx;
                }
                self.mounted = true;
                self.profile = Some(profile);
                self.visible = visible;
                self.idle = IdleState::ACTIVE;
                self.env_attached = true;
                fx.push(Effect::AttachEnvironmentListeners);
                self.evaluate(&mut fx);
            }
            _ if !self.mounted => {}
            Event::ProfileChanged(profile) => {
                if self.profile == Some(profile) {
                    return fx;
                }
                self.profile = Some(profile);
                // a pending settle re-evaluates with the latest profile when it fires
                if !self.settle_pending {
                    self.evaluate(&mut fx);
                }
            }
            Event::VisibilityChanged(true) => {
                if self.visible {
                    return fx;
                }
                self.visible = true;
                if self.hide_pending {
                    self.hide_pending = false;
                    fx.push(Effect::CancelTimer(TimerKind::HideGrace));
                    self.evaluate(&mut fx);
                } else if self.surface.is_none() {
                    self.settle_pending = true;
                    fx.push(Effect::StartTimer {
                        kind: TimerKind::VisibleSettle,
                        delay_ms: self.config.visible_settle_ms,
                        repeat: false,
                    });
                }
            }
            Event::VisibilityChanged(false) => {
                if !self.visible {
                    return fx;
                }
                self.visible = false;
                if self.settle_pending {
                    self.settle_pending = false;
                    fx.push(Effect::CancelTimer(TimerKind::VisibleSettle));
                }
                if self.surface.is_some() && !self.hide_pending {
                    self.hide_pending = true;
                    fx.push(Effect::StartTimer {
                        kind: TimerKind::HideGrace,
                        delay_ms: self.config.hidden_grace_ms,
                        repeat: false,
                    });
                }
            }
            Event::TimerFired(TimerKind::HideGrace) => {
                if !self.hide_pending {
                    return fx;
                }
                self.hide_pending = false;
                if !self.visible {
                    self.teardown(TeardownReason::Hidden, &mut fx);
                    self.state = LifecycleState::Disabled;
                }
            }
            Event::TimerFired(TimerKind::VisibleSettle) => {
                if !self.settle_pending {
                    return fx;
                }
                self.settle_pending = false;
                if self.visible {
                    self.evaluate(&mut fx);
                }
            }
            // the host samples idle time on this tick and reports IdleUpdated
            Event::TimerFired(TimerKind::IdleCheck) => {}
            Event::IdleUpdated(idle) => {
                self.idle = idle;
                self.refresh_params(&mut fx);
            }
            Event::ContextLost | Event::ContextAcquireFailed => {
                log::warn!("[scene] graphics context lost; animation disabled for this page");
                self.shutdown(TeardownReason::ContextLost, &mut fx);
                self.state = LifecycleState::PermanentlyDisabled;
            }
            Event::Unmount => {
                self.shutdown(TeardownReason::Unmount, &mut fx);
                self.unmount();
            }
            Event::PageUnload => {
                self.shutdown(TeardownReason::PageUnload, &mut fx);
                self.unmount();
            }
        }
        fx
    }

    fn evaluate(&mut self, fx: &mut Effects) {
        let Some(profile) = self.profile else {
            return;
        };
        // inside the hide grace period the surface is kept as if visible
        let visibility = VisibilityState {
            visible: self.visible || self.hide_pending,
        };
        let tier = classify(&profile, visibility, self.idle, &self.config);
        match (self.surface, tier) {
            (None, QualityTier::Disabled) => {
                self.state = LifecycleState::Disabled;
            }
            (None, tier) => {
                let Some(params) = RenderParams::derive(tier, self.idle, &self.config) else {
                    return;
                };
                let id = SurfaceId(self.next_surface);
                self.next_surface += 1;
                self.surface = Some(id);
                self.params = Some(params);
                self.state = LifecycleState::from_tier(tier);
                log::info!("[scene] mounting surface {} at {} tier", id.0, tier.as_str());
                fx.push(Effect::CreateSurface { id, params });
                if !self.activity_attached {
                    self.activity_attached = true;
                    fx.push(Effect::AttachActivityTracking);
                    fx.push(Effect::StartTimer {
                        kind: TimerKind::IdleCheck,
                        delay_ms: self.config.idle_check_interval_ms,
                        repeat: true,
                    });
                }
            }
            (Some(_), QualityTier::Disabled) => {
                let reason = if profile.is_mobile_viewport {
                    TeardownReason::MobileViewport
                } else {
                    TeardownReason::Hidden
                };
                self.teardown(reason, fx);
                self.state = LifecycleState::Disabled;
            }
            (Some(_), tier) => {
                let next = LifecycleState::from_tier(tier);
                if next != self.state {
                    log::info!("[scene] {} -> {}", self.state.as_str(), next.as_str());
                }
                self.state = next;
                self.refresh_params(fx);
            }
        }
    }

    fn refresh_params(&mut self, fx: &mut Effects) {
        let Some(id) = self.surface else {
            return;
        };
        let next = RenderParams::derive(self.state.tier(), self.idle, &self.config);
        if next == self.params {
            return;
        }
        self.params = next;
        if let Some(params) = next {
            fx.push(Effect::UpdateRenderParams { id, params });
        }
    }

    /// Destroy the surface and everything scoped to it.
    fn teardown(&mut self, reason: TeardownReason, fx: &mut Effects) {
        if self.hide_pending {
            self.hide_pending = false;
            fx.push(Effect::CancelTimer(TimerKind::HideGrace));
        }
        if let Some(id) = self.surface.take() {
            log::info!("[scene] tearing down surface {} ({:?})", id.0, reason);
            fx.push(Effect::DestroySurface { id, reason });
        }
        self.params = None;
        // idle time is scoped to a surface; a recreated one starts active
        self.idle = IdleState::ACTIVE;
        if self.activity_attached {
            self.activity_attached = false;
            fx.push(Effect::CancelTimer(TimerKind::IdleCheck));
            fx.push(Effect::DetachActivityTracking);
        }
    }

    /// Teardown plus release of the mount-scoped listeners and timers.
    fn shutdown(&mut self, reason: TeardownReason, fx: &mut Effects) {
        self.teardown(reason, fx);
        if self.settle_pending {
            self.settle_pending = false;
            fx.push(Effect::CancelTimer(TimerKind::VisibleSettle));
        }
        if self.env_attached {
            self.env_attached = false;
            fx.push(Effect::DetachEnvironmentListeners);
        }
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.profile = None;
        self.visible = false;
        self.idle = IdleState::ACTIVE;
        self.state = LifecycleState::Disabled;
    }
}
