//! Browser host for the lifecycle controller: owns the environment plumbing
//! and carries out the effects the controller returns.

use crate::browser::{self, BrowserProbe};
use crate::core::{
    ActivityLevel, CapabilitySampler, Controller, DeviceProfile, Effect, EnvironmentProbe, Event,
    EventQueue, HandlerId, IdleState, IdleTracker, LifecycleState, RenderParams, SceneConfig,
    SceneError, SceneInputs, SurfaceId, TeardownReason, Throttle, TimerKind,
};
use crate::dom::{self, Listener};
use crate::events;
use crate::frame::{FrameClock, FrameOutcome, FrameState, RenderLoop};
use crate::render::{self, GpuSurface};
use crate::timers::Timer;
use fnv::FnvHashMap;
use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use web_sys as web;

/// Snapshot of what the page-facing handle reports.
#[derive(Clone, Copy, Debug)]
pub struct SceneStatus {
    pub should_render: bool,
    pub state: LifecycleState,
    pub params: Option<RenderParams>,
}

impl Default for SceneStatus {
    fn default() -> Self {
        Self {
            should_render: false,
            state: LifecycleState::Disabled,
            params: None,
        }
    }
}

enum SurfaceSlot {
    Empty,
    /// Context acquisition in flight.
    Pending(SurfaceId),
    Ready(Box<GpuSurface>, FrameState),
}

struct Host {
    controller: Controller,
    sampler: CapabilitySampler<BrowserProbe>,
    resize_handler: Option<HandlerId>,
    /// Last profile handed to the resize handler, not yet submitted.
    resized: Rc<Cell<Option<DeviceProfile>>>,
    idle: IdleTracker,
    inputs: SceneInputs,
    pointer: Vec2,
    canvas: web::HtmlCanvasElement,
    surface: SurfaceSlot,
    render_loop: Option<RenderLoop>,
    timers: FnvHashMap<TimerKind, Timer>,
    env_listeners: Vec<Listener>,
    activity_listeners: Vec<Listener>,
    scroll_throttle: Throttle,
}

pub struct SceneShared {
    me: Weak<SceneShared>,
    queue: EventQueue<Event>,
    host: RefCell<Host>,
    resized: Rc<Cell<Option<DeviceProfile>>>,
    page_restore: RefCell<Option<Listener>>,
}

pub fn mount(canvas: web::HtmlCanvasElement, config: SceneConfig) -> Rc<SceneShared> {
    let probe = BrowserProbe;
    let sampler = CapabilitySampler::new(probe.clone(), config.clone());
    let profile = sampler.sample();
    let visible = probe.is_visible();
    let now = probe.now_ms();
    let scroll_ms = config.scroll_throttle_ms;
    dom::set_layout_classes(&canvas, true);
    let resized = Rc::new(Cell::new(None));

    let shared = Rc::new_cyclic(|me| SceneShared {
        me: me.clone(),
        queue: EventQueue::new(),
        host: RefCell::new(Host {
            controller: Controller::new(config),
            sampler,
            resize_handler: None,
            resized: Rc::clone(&resized),
            idle: IdleTracker::new(now),
            inputs: SceneInputs::default(),
            pointer: Vec2::ZERO,
            canvas,
            surface: SurfaceSlot::Empty,
            render_loop: None,
            timers: FnvHashMap::default(),
            env_listeners: Vec::new(),
            activity_listeners: Vec::new(),
            scroll_throttle: Throttle::new(scroll_ms),
        }),
        resized,
        page_restore: RefCell::new(None),
    });
    *shared.page_restore.borrow_mut() = events::attach_page_restore(&Rc::downgrade(&shared));
    log::info!(
        "[scene] mount: width={} cores={:?} visible={}",
        profile.viewport_width,
        profile.core_count,
        visible
    );
    shared.submit(Event::Mount { profile, visible });
    shared
}

impl SceneShared {
    /// Handle `event` and everything it causes, one event at a time.
    pub fn submit(&self, event: Event) {
        self.queue.submit(event, |ev| self.dispatch(ev));
    }

    fn dispatch(&self, event: Event) {
        let Ok(mut host) = self.host.try_borrow_mut() else {
            log::warn!("[scene] dropped {:?}: host busy", event);
            return;
        };
        let effects = host.controller.apply(event);
        for effect in effects {
            host.execute(effect, &self.me);
        }
    }

    pub fn status(&self) -> SceneStatus {
        self.host
            .try_borrow()
            .map(|h| SceneStatus {
                should_render: h.controller.should_render(),
                state: h.controller.state(),
                params: h.controller.render_params(),
            })
            .unwrap_or_default()
    }

    pub fn set_in_hero(&self, in_hero: bool) {
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.set_in_hero(in_hero);
        }
    }

    pub fn set_scroll_progress(&self, progress: f32) {
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.inputs.set_scroll_progress(progress);
        }
    }

    pub fn unmount(&self) {
        // an explicit unmount is final, even across a page-cache restore
        self.page_restore.borrow_mut().take();
        self.submit(Event::Unmount);
    }

    pub(crate) fn on_resize(&self) {
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.sync_backing_size();
            host.sampler.notify_resize();
        }
        self.submit_resized();
    }

    /// Forward whatever the resize handler received since the last call.
    fn submit_resized(&self) {
        if let Some(profile) = self.resized.take() {
            self.submit(Event::ProfileChanged(profile));
        }
    }

    /// The page came back from the back/forward cache after `pagehide`
    /// unmounted the scene: mount again with a fresh environment sample.
    pub(crate) fn on_page_restore(&self) {
        let (profile, visible) = match self.host.try_borrow() {
            Ok(host) => (host.sampler.sample(), host.sampler.probe().is_visible()),
            Err(_) => return,
        };
        log::info!("[scene] restored from page cache: visible={}", visible);
        self.submit(Event::Mount { profile, visible });
    }

    pub(crate) fn on_scroll(&self) {
        let Ok(mut host) = self.host.try_borrow_mut() else {
            return;
        };
        let now = host.sampler.probe().now_ms();
        if !host.scroll_throttle.ready(now) {
            return;
        }
        let Some(hero_id) = host.controller.config().hero_element_id.clone() else {
            return;
        };
        if let Some(metrics) = browser::scroll_metrics(&hero_id) {
            host.inputs.set_scroll_progress(metrics.progress());
            host.set_in_hero(metrics.is_in_hero());
        }
    }

    pub(crate) fn on_activity(&self, ev: &web::Event) {
        let woke = {
            let Ok(mut host) = self.host.try_borrow_mut() else {
                return;
            };
            if let Some(p) = dom::pointer_ndc(ev) {
                host.pointer = p;
            }
            let now = host.sampler.probe().now_ms();
            let before = host.idle.record_activity(now);
            before.level(host.controller.config()) != ActivityLevel::Active
        };
        if woke {
            self.submit(Event::IdleUpdated(IdleState::ACTIVE));
        }
    }

    fn on_timer(&self, kind: TimerKind, repeat: bool) {
        let event = {
            let Ok(mut host) = self.host.try_borrow_mut() else {
                return;
            };
            if !repeat {
                // one-shot: forget the spent handle
                host.timers.remove(&kind);
            }
            match kind {
                // rAF is paused in hidden tabs, so loss is also checked here
                TimerKind::IdleCheck if host.surface_lost() => {
                    log::warn!("[gpu] {}", SceneError::ContextLost);
                    Event::ContextLost
                }
                TimerKind::IdleCheck => {
                    // picks up a resize whose last event fell inside the throttle window
                    host.sampler.resample();
                    let now = host.sampler.probe().now_ms();
                    Event::IdleUpdated(host.idle.state(now))
                }
                other => Event::TimerFired(other),
            }
        };
        self.submit(event);
        self.submit_resized();
    }

    fn on_frame(&self, clock: FrameClock) -> bool {
        let outcome = match self.host.try_borrow_mut() {
            Ok(mut host) => host.frame(clock),
            Err(_) => return true,
        };
        match outcome {
            FrameOutcome::Continue => true,
            FrameOutcome::ContextLost => {
                log::warn!("[gpu] {}", SceneError::ContextLost);
                self.submit(Event::ContextLost);
                false
            }
        }
    }

    fn install_surface(&self, id: SurfaceId, result: anyhow::Result<GpuSurface>) {
        let failed = {
            let Ok(mut host) = self.host.try_borrow_mut() else {
                return;
            };
            if !matches!(host.surface, SurfaceSlot::Pending(pending) if pending == id) {
                // superseded while acquiring; the result drops and releases
                log::debug!("[gpu] discarding stale surface {}", id.0);
                return;
            }
            match result {
                Ok(surface) => {
                    let frame = FrameState::new(&host.inputs);
                    host.surface = SurfaceSlot::Ready(Box::new(surface), frame);
                    host.sync_backing_size();
                    let weak = self.me.clone();
                    host.render_loop = Some(RenderLoop::start(move |clock| {
                        weak.upgrade().is_some_and(|s| s.on_frame(clock))
                    }));
                    false
                }
                Err(e) => {
                    let err = SceneError::ContextUnavailable(format!("{:#}", e));
                    log::warn!("[gpu] {}", err);
                    host.surface = SurfaceSlot::Empty;
                    true
                }
            }
        };
        if failed {
            self.submit(Event::ContextAcquireFailed);
        }
    }
}

impl Host {
    fn execute(&mut self, effect: Effect, me: &Weak<SceneShared>) {
        match effect {
            Effect::CreateSurface { id, params } => {
                let dpr = self.sampler.probe().device_pixel_ratio();
                dom::sync_canvas_backing_size(&self.canvas, params.pixel_ratio(dpr));
                self.surface = SurfaceSlot::Pending(id);
                let canvas = self.canvas.clone();
                let weak = me.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = render::create_surface(id, &canvas, &params).await;
                    match weak.upgrade() {
                        Some(s) => s.install_surface(id, result),
                        None => drop(result),
                    }
                });
            }
            Effect::UpdateRenderParams { id, params } => {
                if matches!(&self.surface, SurfaceSlot::Ready(s, _) if s.id() == id) {
                    log::debug!("[scene] params {:?}", params);
                    self.sync_backing_size();
                }
            }
            Effect::DestroySurface { id, reason } => {
                if self.destroy_surface(id, reason) {
                    log::warn!("[gpu] {} before teardown", SceneError::ContextLost);
                    // queued behind the current event; the queue is draining
                    if let Some(s) = me.upgrade() {
                        s.submit(Event::ContextLost);
                    }
                }
            }
            Effect::StartTimer {
                kind,
                delay_ms,
                repeat,
            } => {
                let weak = me.clone();
                let timer = Timer::start(delay_ms, repeat, move || {
                    if let Some(s) = weak.upgrade() {
                        s.on_timer(kind, repeat);
                    }
                });
                match timer {
                    Some(t) => {
                        self.timers.insert(kind, t);
                    }
                    None => {
                        self.timers.remove(&kind);
                    }
                }
            }
            Effect::CancelTimer(kind) => {
                self.timers.remove(&kind);
            }
            Effect::AttachEnvironmentListeners => {
                let track_scroll = self.controller.config().hero_element_id.is_some();
                self.env_listeners = events::attach_environment(me, &self.canvas, track_scroll);
                let mailbox = Rc::clone(&self.resized);
                self.sampler.forget_delivered();
                self.resize_handler = Some(self.sampler.on_resize(move |p| {
                    log::debug!("[config] viewport {}px", p.viewport_width);
                    mailbox.set(Some(p));
                }));
            }
            Effect::DetachEnvironmentListeners => {
                self.env_listeners.clear();
                if let Some(id) = self.resize_handler.take() {
                    self.sampler.remove_handler(id);
                }
                self.resized.set(None);
            }
            Effect::AttachActivityTracking => {
                let now = self.sampler.probe().now_ms();
                self.idle = IdleTracker::new(now);
                self.activity_listeners = events::attach_activity(me);
            }
            Effect::DetachActivityTracking => self.activity_listeners.clear(),
        }
    }

    /// Returns true when the context turned out to be lost already.
    fn destroy_surface(&mut self, id: SurfaceId, reason: TeardownReason) -> bool {
        if let Some(rl) = self.render_loop.take() {
            rl.stop();
        }
        match std::mem::replace(&mut self.surface, SurfaceSlot::Empty) {
            SurfaceSlot::Ready(mut surface, _) => surface.release_reporting_loss(reason),
            SurfaceSlot::Pending(pending) => {
                log::debug!("[gpu] surface {} destroyed while pending", pending.0);
                false
            }
            SurfaceSlot::Empty => {
                log::debug!("[gpu] destroy of absent surface {}", id.0);
                false
            }
        }
    }

    fn surface_lost(&self) -> bool {
        matches!(&self.surface, SurfaceSlot::Ready(s, _) if s.is_context_lost())
    }

    fn set_in_hero(&mut self, in_hero: bool) {
        if self.inputs.is_in_hero != in_hero {
            self.inputs.is_in_hero = in_hero;
            dom::set_layout_classes(&self.canvas, in_hero);
        }
    }

    /// Match the canvas backing store and GPU targets to the current params.
    fn sync_backing_size(&mut self) {
        let Some(params) = self.controller.render_params() else {
            return;
        };
        let SurfaceSlot::Ready(surface, _) = &mut self.surface else {
            return;
        };
        let dpr = self.sampler.probe().device_pixel_ratio();
        let (w, h) = dom::sync_canvas_backing_size(&self.canvas, params.pixel_ratio(dpr));
        if let Some(ctx) = surface.context_mut() {
            ctx.resize(w, h, params.antialiasing);
        }
    }

    fn frame(&mut self, clock: FrameClock) -> FrameOutcome {
        let Some(params) = self.controller.render_params() else {
            return FrameOutcome::Continue;
        };
        let (inputs, pointer) = (self.inputs, self.pointer);
        match &mut self.surface {
            SurfaceSlot::Ready(surface, state) => {
                state.frame(surface, clock, &params, &inputs, pointer)
            }
            _ => FrameOutcome::Continue,
        }
    }
}
