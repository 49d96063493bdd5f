// Host-side tests for surface resource release.

use hero_scene::core::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<&'static str>>>;

struct Fake {
    name: &'static str,
    log: Log,
    lost: Rc<Cell<bool>>,
}

impl ContextHealth for Fake {
    fn is_lost(&self) -> bool {
        self.lost.get()
    }
}

impl Disposable for Fake {
    fn dispose(&mut self) {
        self.log.borrow_mut().push(self.name);
    }
}

fn surface(log: &Log) -> SurfaceResources<Fake, Fake, Fake> {
    surface_with(log, &Rc::default())
}

fn surface_with(log: &Log, lost: &Rc<Cell<bool>>) -> SurfaceResources<Fake, Fake, Fake> {
    let part = |name| Fake {
        name,
        log: log.clone(),
        lost: lost.clone(),
    };
    SurfaceResources::new(
        SurfaceId(7),
        part("geometry"),
        part("material"),
        part("context"),
    )
}

#[test]
fn release_disposes_context_last() {
    let log = Log::default();
    let mut s = surface(&log);
    assert!(s.release(TeardownReason::Unmount));
    assert_eq!(*log.borrow(), vec!["geometry", "material", "context"]);
    assert!(s.is_released());
    assert!(s.geometry().is_none());
    assert!(s.material().is_none());
    assert!(s.context().is_none());
    assert!(s.parts_mut().is_none());
}

#[test]
fn second_release_is_a_no_op() {
    let log = Log::default();
    let mut s = surface(&log);
    assert!(s.release(TeardownReason::ContextLost));
    assert!(!s.release(TeardownReason::Unmount));
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(s.released_reason(), Some(TeardownReason::ContextLost));
}

#[test]
fn drop_releases_once() {
    let log = Log::default();
    {
        let _s = surface(&log);
    }
    assert_eq!(log.borrow().len(), 3);

    let log = Log::default();
    {
        let mut s = surface(&log);
        s.release(TeardownReason::PageUnload);
    }
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn parts_are_reachable_before_release() {
    let log = Log::default();
    let mut s = surface(&log);
    assert_eq!(s.id(), SurfaceId(7));
    let (g, m, c) = s.parts_mut().expect("parts");
    assert_eq!((g.name, m.name, c.name), ("geometry", "material", "context"));
    assert!(s.context_mut().is_some());
    assert!(!s.is_released());
    assert!(log.borrow().is_empty());
}

// The controller and the janitor together: a context loss releases the
// GPU resources while the event is still being handled.
#[test]
fn context_loss_releases_resources_synchronously() {
    let log = Log::default();
    let mut c = Controller::new(SceneConfig::default());
    let mut live = None;
    type Live = Option<SurfaceResources<Fake, Fake, Fake>>;
    let run = |c: &mut Controller, ev: Event, live: &mut Live| {
        for fx in c.apply(ev) {
            match fx {
                Effect::CreateSurface { id, .. } => {
                    let part = |name| Fake {
                        name,
                        log: log.clone(),
                        lost: Rc::default(),
                    };
                    *live = Some(SurfaceResources::new(
                        id,
                        part("geometry"),
                        part("material"),
                        part("context"),
                    ));
                }
                Effect::DestroySurface { reason, .. } => {
                    if let Some(s) = live.as_mut() {
                        s.release(reason);
                    }
                }
                _ => {}
            }
        }
    };
    let profile = DeviceProfile::new(1920, Some(8), c.config());
    run(
        &mut c,
        Event::Mount {
            profile,
            visible: true,
        },
        &mut live,
    );
    assert!(live.as_ref().is_some_and(|s| !s.is_released()));
    run(&mut c, Event::ContextLost, &mut live);
    assert_eq!(c.state(), LifecycleState::PermanentlyDisabled);
    let s = live.as_ref().expect("surface");
    assert!(s.is_released());
    assert_eq!(s.released_reason(), Some(TeardownReason::ContextLost));
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn healthy_context_keeps_the_teardown_reason() {
    let log = Log::default();
    let mut s = surface(&log);
    assert!(!s.is_context_lost());
    assert!(!s.release_reporting_loss(TeardownReason::Hidden));
    assert_eq!(s.released_reason(), Some(TeardownReason::Hidden));
    assert!(s.is_context_lost());
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn loss_before_release_is_recorded_as_context_lost() {
    let log = Log::default();
    let lost = Rc::new(Cell::new(false));
    let mut s = surface_with(&log, &lost);
    lost.set(true);
    assert!(s.is_context_lost());
    assert!(s.release_reporting_loss(TeardownReason::Hidden));
    assert_eq!(s.released_reason(), Some(TeardownReason::ContextLost));
    assert_eq!(log.borrow().len(), 3);
    // already released: nothing left to report
    assert!(!s.release_reporting_loss(TeardownReason::Unmount));
}

// A device lost while the tab is hidden never reaches a frame callback. The
// hidden teardown finds it and the scene must stay down when the tab returns.
#[test]
fn loss_found_at_hidden_teardown_is_terminal() {
    let log = Log::default();
    let lost = Rc::new(Cell::new(false));
    let mut c = Controller::new(SceneConfig::default());
    let mut live: Option<SurfaceResources<Fake, Fake, Fake>> = None;
    let mut created = 0;
    let mut run = |c: &mut Controller, ev: Event| -> bool {
        let mut reported = false;
        for fx in c.apply(ev) {
            match fx {
                Effect::CreateSurface { .. } => {
                    created += 1;
                    live = Some(surface_with(&log, &lost));
                }
                Effect::DestroySurface { reason, .. } => {
                    if let Some(s) = live.as_mut() {
                        reported |= s.release_reporting_loss(reason);
                    }
                }
                _ => {}
            }
        }
        reported
    };
    let profile = DeviceProfile::new(1920, Some(8), c.config());
    run(
        &mut c,
        Event::Mount {
            profile,
            visible: true,
        },
    );
    run(&mut c, Event::VisibilityChanged(false));
    lost.set(true);
    assert!(run(&mut c, Event::TimerFired(TimerKind::HideGrace)));
    assert_eq!(c.state(), LifecycleState::Disabled);
    assert!(!run(&mut c, Event::ContextLost));
    assert_eq!(c.state(), LifecycleState::PermanentlyDisabled);

    run(&mut c, Event::VisibilityChanged(true));
    run(&mut c, Event::TimerFired(TimerKind::VisibleSettle));
    assert_eq!(created, 1);
    assert!(!c.should_render());
    assert_eq!(c.surface_id(), None);
}
