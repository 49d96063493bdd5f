use super::controller::{SurfaceId, TeardownReason};

/// A GPU-side object with an explicit release routine.
///
/// `dispose` is only ever called once per object by [`SurfaceResources`];
/// implementations do not need their own guard.
pub trait Disposable {
    fn dispose(&mut self);
}

/// A graphics context whose loss can be signalled outside the frame loop
/// (for example while animation frames are paused in a hidden tab).
pub trait ContextHealth {
    fn is_lost(&self) -> bool;
}

/// Owns everything backing one animation surface: geometry, material and
/// the graphics context.
///
/// Release happens exactly once, on whichever exit path gets there first
/// (teardown, context loss, page unload or drop). Later calls are no-ops.
pub struct SurfaceResources<G: Disposable, M: Disposable, C: Disposable> {
    id: SurfaceId,
    geometry: Option<G>,
    material: Option<M>,
    context: Option<C>,
    released: Option<TeardownReason>,
}

impl<G: Disposable, M: Disposable, C: Disposable> SurfaceResources<G, M, C> {
    pub fn new(id: SurfaceId, geometry: G, material: M, context: C) -> Self {
        Self {
            id,
            geometry: Some(geometry),
            material: Some(material),
            context: Some(context),
            released: None,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn geometry(&self) -> Option<&G> {
        self.geometry.as_ref()
    }

    pub fn material(&self) -> Option<&M> {
        self.material.as_ref()
    }

    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    /// All three parts at once, or `None` after release.
    pub fn parts_mut(&mut self) -> Option<(&mut G, &mut M, &mut C)> {
        match (&mut self.geometry, &mut self.material, &mut self.context) {
            (Some(g), Some(m), Some(c)) => Some((g, m, c)),
            _ => None,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.is_some()
    }

    pub fn released_reason(&self) -> Option<TeardownReason> {
        self.released
    }

    /// Dispose geometry, material, then the context. Returns `false` when the
    /// resources were already released.
    pub fn release(&mut self, reason: TeardownReason) -> bool {
        if self.released.is_some() {
            return false;
        }
        self.released = Some(reason);
        if let Some(mut geometry) = self.geometry.take() {
            geometry.dispose();
        }
        if let Some(mut material) = self.material.take() {
            material.dispose();
        }
        // context last: geometry and material belong to its device
        if let Some(mut context) = self.context.take() {
            context.dispose();
        }
        log::debug!("[gpu] released surface {} ({:?})", self.id.0, reason);
        true
    }
}

impl<G: Disposable, M: Disposable, C: Disposable + ContextHealth> SurfaceResources<G, M, C> {
    /// True once released, or when the context reports a loss.
    pub fn is_context_lost(&self) -> bool {
        self.context.as_ref().map_or(self.is_released(), |c| c.is_lost())
    }

    /// Release for `reason`, unless the context was lost in the meantime:
    /// then the release is recorded as `ContextLost` and `true` is returned
    /// so the caller reports the loss to the controller.
    pub fn release_reporting_loss(&mut self, reason: TeardownReason) -> bool {
        let lost = self.context.as_ref().is_some_and(|c| c.is_lost());
        self.release(if lost {
            TeardownReason::ContextLost
        } else {
            reason
        });
        lost
    }
}

impl<G: Disposable, M: Disposable, C: Disposable> Drop for SurfaceResources<G, M, C> {
    fn drop(&mut self) {
        self.release(TeardownReason::Dropped);
    }
}
