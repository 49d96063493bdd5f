// Host-side tests for the lifecycle controller.
// Effects are replayed against a bookkeeping "world" that asserts every
// create/start/attach is matched by exactly one destroy/cancel/detach.

use hero_scene::core::*;
use std::collections::{BTreeSet, HashMap};

fn cfg() -> SceneConfig {
    SceneConfig::default()
}

fn profile(width: u32, cores: Option<u32>) -> DeviceProfile {
    DeviceProfile::new(width, cores, &cfg())
}

fn desktop() -> DeviceProfile {
    profile(1920, Some(8))
}

#[derive(Default)]
struct World {
    live: BTreeSet<SurfaceId>,
    max_live: usize,
    created: Vec<(SurfaceId, RenderParams)>,
    destroyed: Vec<(SurfaceId, TeardownReason)>,
    updates: Vec<RenderParams>,
    timers: HashMap<TimerKind, (u64, bool)>,
    env: i32,
    activity: i32,
}

impl World {
    fn run(&mut self, c: &mut Controller, ev: Event) -> Vec<Effect> {
        let fx = c.apply(ev).into_vec();
        for e in &fx {
            match e {
                Effect::CreateSurface { id, params } => {
                    assert!(self.live.insert(*id), "surface {:?} created twice", id);
                    self.max_live = self.max_live.max(self.live.len());
                    self.created.push((*id, *params));
                }
                Effect::DestroySurface { id, reason } => {
                    assert!(self.live.remove(id), "destroyed unknown surface {:?}", id);
                    self.destroyed.push((*id, *reason));
                }
                Effect::UpdateRenderParams { id, params } => {
                    assert!(self.live.contains(id));
                    self.updates.push(*params);
                }
                Effect::StartTimer {
                    kind,
                    delay_ms,
                    repeat,
                } => {
                    let prev = self.timers.insert(*kind, (*delay_ms, *repeat));
                    assert!(prev.is_none(), "{:?} started twice", kind);
                }
                Effect::CancelTimer(kind) => {
                    assert!(
                        self.timers.remove(kind).is_some(),
                        "{:?} cancelled but not running",
                        kind
                    );
                }
                Effect::AttachEnvironmentListeners => self.env += 1,
                Effect::DetachEnvironmentListeners => self.env -= 1,
                Effect::AttachActivityTracking => self.activity += 1,
                Effect::DetachActivityTracking => self.activity -= 1,
            }
            assert!((0..=1).contains(&self.env));
            assert!((0..=1).contains(&self.activity));
            assert!(self.live.len() <= 1, "two surfaces alive");
        }
        fx
    }

    /// Fire a running timer; one-shot timers are spent afterwards.
    fn fire(&mut self, c: &mut Controller, kind: TimerKind) -> Vec<Effect> {
        let (_, repeat) = *self.timers.get(&kind).expect("timer not running");
        if !repeat {
            self.timers.remove(&kind);
        }
        self.run(c, Event::TimerFired(kind))
    }

    fn assert_quiescent(&self) {
        assert!(self.live.is_empty());
        assert!(self.timers.is_empty(), "timers left: {:?}", self.timers);
        assert_eq!(self.env, 0);
        assert_eq!(self.activity, 0);
    }
}

fn mounted(p: DeviceProfile, visible: bool) -> (Controller, World) {
    let mut c = Controller::new(cfg());
    let mut w = World::default();
    w.run(&mut c, Event::Mount { profile: p, visible });
    (c, w)
}

#[test]
fn desktop_mounts_at_full_with_aa_and_post() {
    let (c, w) = mounted(desktop(), true);
    assert_eq!(c.state(), LifecycleState::Full);
    assert!(c.should_render());
    let (_, params) = w.created[0];
    assert_eq!(params.tier, QualityTier::Full);
    assert!(params.antialiasing);
    assert!(params.post_processing);
    assert_eq!(w.env, 1);
    assert_eq!(w.activity, 1);
    assert_eq!(
        w.timers.get(&TimerKind::IdleCheck),
        Some(&(cfg().idle_check_interval_ms, true))
    );
}

#[test]
fn mid_range_laptop_runs_reduced() {
    let (c, w) = mounted(profile(1024, Some(4)), true);
    assert_eq!(c.state(), LifecycleState::Reduced);
    let (_, params) = w.created[0];
    assert!(!params.antialiasing);
    assert!(!params.post_processing);
    assert_eq!(params.rotation_multiplier, 0.5);
}

#[test]
fn mobile_viewport_never_renders() {
    for cores in [None, Some(1), Some(8), Some(64)] {
        for visible in [true, false] {
            let (c, w) = mounted(profile(600, cores), visible);
            assert_eq!(c.state(), LifecycleState::Disabled);
            assert!(!c.should_render());
            assert!(w.created.is_empty());
        }
    }
}

#[test]
fn shrinking_to_mobile_tears_down() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::ProfileChanged(profile(600, Some(8))));
    assert_eq!(c.state(), LifecycleState::Disabled);
    assert_eq!(w.destroyed, vec![(SurfaceId(0), TeardownReason::MobileViewport)]);
    assert_eq!(w.activity, 0);
    assert!(!w.timers.contains_key(&TimerKind::IdleCheck));
    // growing again recreates with a fresh id
    w.run(&mut c, Event::ProfileChanged(desktop()));
    assert_eq!(c.surface_id(), Some(SurfaceId(1)));
    assert_eq!(c.state(), LifecycleState::Full);
}

#[test]
fn tier_change_updates_params_without_recreating() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::ProfileChanged(profile(1200, Some(8))));
    assert_eq!(c.state(), LifecycleState::Reduced);
    w.run(&mut c, Event::ProfileChanged(desktop()));
    assert_eq!(c.state(), LifecycleState::Full);
    assert_eq!(w.created.len(), 1);
    assert!(w.destroyed.is_empty());
    assert_eq!(w.updates.len(), 2);
    assert!(!w.updates[0].antialiasing);
    assert!(w.updates[1].antialiasing);
}

#[test]
fn identical_resize_is_a_no_op() {
    let (mut c, mut w) = mounted(desktop(), true);
    assert!(w.run(&mut c, Event::ProfileChanged(desktop())).is_empty());
}

#[test]
fn brief_hide_keeps_the_surface() {
    let (mut c, mut w) = mounted(desktop(), true);
    let fx = w.run(&mut c, Event::VisibilityChanged(false));
    assert!(fx.contains(&Effect::StartTimer {
        kind: TimerKind::HideGrace,
        delay_ms: 10_000,
        repeat: false,
    }));
    // still rendering during the grace period
    assert_eq!(c.state(), LifecycleState::Full);
    assert!(c.should_render());
    let fx = w.run(&mut c, Event::VisibilityChanged(true));
    assert!(fx.contains(&Effect::CancelTimer(TimerKind::HideGrace)));
    assert!(w.destroyed.is_empty());
    assert_eq!(c.state(), LifecycleState::Full);
    assert_eq!(w.created.len(), 1);
}

#[test]
fn resize_during_hide_grace_keeps_the_surface() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::VisibilityChanged(false));
    w.run(&mut c, Event::ProfileChanged(profile(1300, Some(8))));
    assert_eq!(c.state(), LifecycleState::Reduced);
    assert!(w.destroyed.is_empty());
}

#[test]
fn long_hide_tears_down_then_settles_back() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::VisibilityChanged(false));
    w.fire(&mut c, TimerKind::HideGrace);
    assert_eq!(c.state(), LifecycleState::Disabled);
    assert_eq!(w.destroyed, vec![(SurfaceId(0), TeardownReason::Hidden)]);
    assert_eq!(w.activity, 0);

    let fx = w.run(&mut c, Event::VisibilityChanged(true));
    assert!(fx.contains(&Effect::StartTimer {
        kind: TimerKind::VisibleSettle,
        delay_ms: 1_000,
        repeat: false,
    }));
    assert!(!c.should_render());
    w.fire(&mut c, TimerKind::VisibleSettle);
    assert_eq!(c.surface_id(), Some(SurfaceId(1)));
    assert_eq!(c.state(), LifecycleState::Full);
}

#[test]
fn settle_uses_the_latest_profile() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::VisibilityChanged(false));
    w.fire(&mut c, TimerKind::HideGrace);
    w.run(&mut c, Event::VisibilityChanged(true));
    let fx = w.run(&mut c, Event::ProfileChanged(profile(1100, Some(8))));
    assert!(fx.is_empty());
    w.fire(&mut c, TimerKind::VisibleSettle);
    assert_eq!(c.state(), LifecycleState::Reduced);
}

#[test]
fn hiding_again_cancels_the_settle() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::VisibilityChanged(false));
    w.fire(&mut c, TimerKind::HideGrace);
    w.run(&mut c, Event::VisibilityChanged(true));
    let fx = w.run(&mut c, Event::VisibilityChanged(false));
    assert_eq!(fx, vec![Effect::CancelTimer(TimerKind::VisibleSettle)]);
    assert!(w.timers.is_empty());
}

#[test]
fn hidden_at_mount_waits_for_visibility() {
    let (mut c, mut w) = mounted(desktop(), false);
    assert_eq!(c.state(), LifecycleState::Disabled);
    assert!(w.created.is_empty());
    w.run(&mut c, Event::VisibilityChanged(true));
    w.fire(&mut c, TimerKind::VisibleSettle);
    assert_eq!(c.state(), LifecycleState::Full);
}

#[test]
fn idle_degrades_params_but_not_tier() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(
        &mut c,
        Event::IdleUpdated(IdleState {
            ms_since_last_activity: 15_000,
        }),
    );
    assert_eq!(c.state(), LifecycleState::Full);
    let quiet = c.render_params().expect("params");
    assert!(!quiet.post_processing);
    assert_eq!(quiet.update_stride, 1);

    w.run(
        &mut c,
        Event::IdleUpdated(IdleState {
            ms_since_last_activity: 31_000,
        }),
    );
    let dormant = c.render_params().expect("params");
    assert_eq!(dormant.activity, ActivityLevel::Dormant);
    assert_eq!(dormant.rotation_multiplier, 0.25);
    assert_eq!(dormant.update_stride, 12);

    w.run(&mut c, Event::IdleUpdated(IdleState::ACTIVE));
    assert!(c.render_params().expect("params").post_processing);
    assert_eq!(w.updates.len(), 3);
    assert_eq!(w.created.len(), 1);
}

#[test]
fn recreated_surface_starts_active() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(
        &mut c,
        Event::IdleUpdated(IdleState {
            ms_since_last_activity: 35_000,
        }),
    );
    assert_eq!(
        c.render_params().expect("params").activity,
        ActivityLevel::Dormant
    );
    w.run(&mut c, Event::VisibilityChanged(false));
    w.fire(&mut c, TimerKind::HideGrace);
    w.run(&mut c, Event::VisibilityChanged(true));
    w.fire(&mut c, TimerKind::VisibleSettle);

    let (id, params) = w.created[1];
    assert_eq!(id, SurfaceId(1));
    assert_eq!(params.activity, ActivityLevel::Active);
    assert!(params.post_processing);
    assert_eq!(params.update_stride, 1);
}

#[test]
fn recreated_after_mobile_round_trip_starts_active() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(
        &mut c,
        Event::IdleUpdated(IdleState {
            ms_since_last_activity: 35_000,
        }),
    );
    w.run(&mut c, Event::ProfileChanged(profile(600, Some(8))));
    w.run(&mut c, Event::ProfileChanged(desktop()));
    let (_, params) = w.created[1];
    assert!(params.post_processing);
    assert_eq!(params.activity, ActivityLevel::Active);
}

#[test]
fn unchanged_idle_level_emits_nothing() {
    let (mut c, mut w) = mounted(desktop(), true);
    let fx = w.run(
        &mut c,
        Event::IdleUpdated(IdleState {
            ms_since_last_activity: 500,
        }),
    );
    assert!(fx.is_empty());
    assert!(w.fire(&mut c, TimerKind::IdleCheck).is_empty());
}

#[test]
fn context_loss_is_terminal() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::ContextLost);
    assert_eq!(c.state(), LifecycleState::PermanentlyDisabled);
    assert_eq!(w.destroyed, vec![(SurfaceId(0), TeardownReason::ContextLost)]);
    w.assert_quiescent();

    let events = [
        Event::ProfileChanged(profile(2560, Some(16))),
        Event::VisibilityChanged(false),
        Event::VisibilityChanged(true),
        Event::IdleUpdated(IdleState::ACTIVE),
        Event::TimerFired(TimerKind::VisibleSettle),
        Event::Mount {
            profile: desktop(),
            visible: true,
        },
        Event::Unmount,
    ];
    for ev in events {
        assert!(w.run(&mut c, ev).is_empty());
        assert_eq!(c.state(), LifecycleState::PermanentlyDisabled);
    }
    assert!(!c.should_render());
}

#[test]
fn acquire_failure_behaves_like_context_loss() {
    let (mut c, mut w) = mounted(profile(1300, Some(4)), true);
    w.run(&mut c, Event::ContextAcquireFailed);
    assert_eq!(c.state(), LifecycleState::PermanentlyDisabled);
    w.assert_quiescent();
}

#[test]
fn context_loss_during_hide_grace_cancels_everything() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::VisibilityChanged(false));
    w.run(&mut c, Event::ContextLost);
    w.assert_quiescent();
}

#[test]
fn repeated_mount_cycles_do_not_leak() {
    let mut c = Controller::new(cfg());
    let mut w = World::default();
    for round in 0..5 {
        w.run(
            &mut c,
            Event::Mount {
                profile: desktop(),
                visible: true,
            },
        );
        w.run(&mut c, Event::ProfileChanged(profile(1200, Some(8))));
        w.run(&mut c, Event::VisibilityChanged(false));
        if round % 2 == 0 {
            w.run(&mut c, Event::Unmount);
        } else {
            w.run(&mut c, Event::PageUnload);
        }
        w.assert_quiescent();
        assert!(!c.is_mounted());
    }
    assert_eq!(w.created.len(), 5);
    assert_eq!(w.max_live, 1);
    let ids: BTreeSet<_> = w.created.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids.len(), 5);
}

// pagehide unmounts; a back/forward cache restore mounts the same
// controller again
#[test]
fn mount_after_page_unload_starts_fresh() {
    let (mut c, mut w) = mounted(desktop(), true);
    w.run(&mut c, Event::PageUnload);
    w.assert_quiescent();
    w.run(
        &mut c,
        Event::Mount {
            profile: desktop(),
            visible: true,
        },
    );
    assert_eq!(c.state(), LifecycleState::Full);
    assert_eq!(c.surface_id(), Some(SurfaceId(1)));
    assert_eq!(w.env, 1);
    assert_eq!(w.activity, 1);
    w.run(&mut c, Event::Unmount);
    w.assert_quiescent();
    assert_eq!(w.max_live, 1);
}

#[test]
fn second_mount_is_ignored() {
    let (mut c, mut w) = mounted(desktop(), true);
    let fx = w.run(
        &mut c,
        Event::Mount {
            profile: desktop(),
            visible: true,
        },
    );
    assert!(fx.is_empty());
    assert_eq!(w.env, 1);
}

#[test]
fn events_before_mount_are_ignored() {
    let mut c = Controller::new(cfg());
    assert!(c.apply(Event::ProfileChanged(desktop())).is_empty());
    assert!(c.apply(Event::VisibilityChanged(true)).is_empty());
    assert!(c.apply(Event::Unmount).is_empty());
    assert_eq!(c.state(), LifecycleState::Disabled);
}

#[test]
fn stray_timer_fires_are_ignored() {
    let (mut c, _) = mounted(desktop(), true);
    assert!(c.apply(Event::TimerFired(TimerKind::HideGrace)).is_empty());
    assert!(c.apply(Event::TimerFired(TimerKind::VisibleSettle)).is_empty());
    assert_eq!(c.state(), LifecycleState::Full);
}

#[test]
fn never_more_than_one_surface_under_churn() {
    let (mut c, mut w) = mounted(desktop(), true);
    let widths = [1920, 600, 1300, 1920, 500, 2560, 1000, 700, 1600];
    for (i, width) in widths.iter().enumerate() {
        w.run(&mut c, Event::ProfileChanged(profile(*width, Some(8))));
        if i % 3 == 0 {
            w.run(&mut c, Event::VisibilityChanged(false));
            if w.timers.contains_key(&TimerKind::HideGrace) {
                w.fire(&mut c, TimerKind::HideGrace);
            }
            w.run(&mut c, Event::VisibilityChanged(true));
            if w.timers.contains_key(&TimerKind::VisibleSettle) {
                w.fire(&mut c, TimerKind::VisibleSettle);
            }
        }
    }
    assert_eq!(w.max_live, 1);
    w.run(&mut c, Event::Unmount);
    w.assert_quiescent();
}

#[test]
fn lifecycle_labels() {
    assert_eq!(LifecycleState::Full.as_str(), "full");
    assert_eq!(LifecycleState::Reduced.as_str(), "reduced");
    assert_eq!(LifecycleState::Disabled.as_str(), "disabled");
    assert_eq!(
        LifecycleState::PermanentlyDisabled.as_str(),
        "permanently-disabled"
    );
    assert_eq!(
        LifecycleState::PermanentlyDisabled.tier(),
        QualityTier::Disabled
    );
}
