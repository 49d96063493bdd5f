use super::config::SceneConfig;
use super::throttle::Throttle;
use super::tier::DeviceProfile;

/// The environment signals the scene depends on.
///
/// The browser implementation reads `window`/`navigator`/`document`; tests
/// pass a fake so the controller can run without a browser.
pub trait EnvironmentProbe {
    fn viewport_width(&self) -> u32;
    /// `None` when the platform does not expose a core count.
    fn hardware_concurrency(&self) -> Option<u32>;
    fn is_visible(&self) -> bool;
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u32);

type ResizeHandler = Box<dyn FnMut(DeviceProfile)>;

/// Produces [`DeviceProfile`]s on demand and fans rate-limited resize
/// samples out to registered handlers.
pub struct CapabilitySampler<P> {
    probe: P,
    config: SceneConfig,
    throttle: Throttle,
    handlers: Vec<(HandlerId, ResizeHandler)>,
    next_id: u32,
    last_delivered: Option<DeviceProfile>,
}

impl<P: EnvironmentProbe> CapabilitySampler<P> {
    pub fn new(probe: P, config: SceneConfig) -> Self {
        let throttle = Throttle::new(config.resize_throttle_ms);
        Self {
            probe,
            config,
            throttle,
            handlers: Vec::new(),
            next_id: 0,
            last_delivered: None,
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn sample(&self) -> DeviceProfile {
        DeviceProfile::new(
            self.probe.viewport_width(),
            self.probe.hardware_concurrency(),
            &self.config,
        )
    }

    pub fn on_resize(&mut self, handler: impl FnMut(DeviceProfile) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Feed one resize event. Returns the profile handed to the handlers, or
    /// `None` when the event fell inside the throttle window.
    pub fn notify_resize(&mut self) -> Option<DeviceProfile> {
        if !self.throttle.ready(self.probe.now_ms()) {
            return None;
        }
        let profile = self.sample();
        self.deliver(profile);
        Some(profile)
    }

    /// Re-read the environment outside any resize event and hand the
    /// profile to the handlers only if it differs from the last one they
    /// saw. Catches the final size of a resize burst whose tail fell inside
    /// the throttle window; nothing is queued.
    pub fn resample(&mut self) -> Option<DeviceProfile> {
        let profile = self.sample();
        if self.last_delivered == Some(profile) {
            return None;
        }
        self.deliver(profile);
        Some(profile)
    }

    /// Forget what handlers were last given, so the next `resample`
    /// delivers unconditionally.
    pub fn forget_delivered(&mut self) {
        self.last_delivered = None;
    }

    fn deliver(&mut self, profile: DeviceProfile) {
        self.last_delivered = Some(profile);
        for (_, handler) in self.handlers.iter_mut() {
            handler(profile);
        }
    }
}
