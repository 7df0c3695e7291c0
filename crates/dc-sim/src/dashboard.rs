//! The `Dashboard` struct and its step loop.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use dc_core::{DashboardConfig, GeoPoint, IncidentId, Timestamp, VolunteerId};
use dc_dispatch::{Action, Outcome};
use dc_motion::{MotionEvent, MotionSimulator, Scheduler};
use dc_render::{MapBackend, MapEvent, MarkerRenderer, MarkerTarget};
use dc_store::{EntityStore, IncidentDraft, SubscriptionId};
use tracing::{debug, info};

use crate::{DashboardObserver, SimError, SimResult};

/// What [`Dashboard::shutdown`] released.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Scheduler callbacks cancelled.
    pub cancelled: usize,
    /// Markers destroyed.
    pub destroyed: usize,
}

/// The assembled dashboard: store, dispatch, motion and rendering.
///
/// Every mutation goes through the store.  Motion and rendering observe it
/// through subscriptions set up by [`DashboardBuilder`][crate::DashboardBuilder]:
///
/// ```text
///   apply(action) ──► dispatch ──► store ──notify──► motion.on_snapshot
///                                        └─notify──► renderer.reconcile
///   advance(by)   ──► scheduler ──► motion.handle ──► positions ──► store, renderer
///                                              └─ Arrived ──► dispatch::on_arrival
/// ```
///
/// The simulator and renderer sit behind `Rc<RefCell<..>>` so the store's
/// callbacks can reach them.  Neither borrow is ever held across a call into
/// the store, which is what keeps the notifications re-entrancy free.
pub struct Dashboard<S: Scheduler + 'static, M: MapBackend + 'static> {
    config:        DashboardConfig,
    store:         EntityStore,
    motion:        Rc<RefCell<MotionSimulator<S>>>,
    renderer:      Rc<RefCell<MarkerRenderer<M>>>,
    subscriptions: Vec<SubscriptionId>,
    shut_down:     bool,
}

impl<S: Scheduler + 'static, M: MapBackend + 'static> Dashboard<S, M> {
    pub(crate) fn assemble(
        config:        DashboardConfig,
        store:         EntityStore,
        motion:        Rc<RefCell<MotionSimulator<S>>>,
        renderer:      Rc<RefCell<MarkerRenderer<M>>>,
        subscriptions: [SubscriptionId; 2],
    ) -> Self {
        Self {
            config,
            store,
            motion,
            renderer,
            subscriptions: subscriptions.to_vec(),
            shut_down: false,
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Apply a dispatch verb at the current time.
    pub fn apply(&mut self, action: Action) -> SimResult<Outcome> {
        self.ensure_live()?;
        let now = self.now();
        self.renderer.borrow_mut().set_clock(now);
        Ok(dc_dispatch::apply(&mut self.store, action, now)?)
    }

    /// File a citizen report.  Returns the new incident's id.
    pub fn report(&mut self, draft: IncidentDraft) -> SimResult<IncidentId> {
        self.ensure_live()?;
        let now = self.now();
        self.renderer.borrow_mut().set_clock(now);
        Ok(dc_dispatch::report(&mut self.store, draft, now)?)
    }

    // ── Time ──────────────────────────────────────────────────────────────

    /// Run the clock forward by `by`.
    ///
    /// Callbacks fire in due order.  Before each one the urgency refresh is
    /// polled at its due time, so refreshes interleave with motion the way
    /// independent timers would.  Arrivals are applied immediately, which
    /// settles the volunteer before the next callback runs.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance<O: DashboardObserver>(&mut self, by: Duration, observer: &mut O) -> SimResult<usize> {
        self.ensure_live()?;
        let until = self.now() + by;
        let mut fired = 0;

        loop {
            let Some(due) = self.motion.borrow_mut().pop_due(until) else {
                break;
            };
            self.poll_urgency(due.at, observer);
            fired += 1;

            let event = self.motion.borrow_mut().handle(due);
            self.mirror_positions()?;

            if let Some(MotionEvent::Arrived { volunteer, incident }) = event {
                self.renderer.borrow_mut().set_clock(due.at);
                let outcome = dc_dispatch::on_arrival(&mut self.store, volunteer, incident)?;
                if !outcome.is_noop() {
                    observer.on_arrival(volunteer, incident, due.at);
                }
            }
        }

        self.motion.borrow_mut().advance_to(until);
        self.poll_urgency(until, observer);
        observer.on_step_end(until, fired);
        Ok(fired)
    }

    fn poll_urgency<O: DashboardObserver>(&mut self, at: Timestamp, observer: &mut O) {
        if self.renderer.borrow_mut().refresh_urgency_if_due(at) {
            observer.on_urgency_refresh(at);
        }
    }

    /// Copy freshly drawn positions into the store and onto the map.
    fn mirror_positions(&mut self) -> SimResult<()> {
        let moved = self.motion.borrow_mut().drain_moved();
        if moved.is_empty() {
            return Ok(());
        }
        for &(volunteer, position) in &moved {
            self.store.record_position(volunteer, position)?;
        }
        self.renderer.borrow_mut().sync_positions(&moved);
        Ok(())
    }

    // ── Map interaction ───────────────────────────────────────────────────

    /// Hover an incident.  Returns `false` when it has no marker.
    pub fn hover(&mut self, incident: IncidentId) -> bool {
        !self.shut_down && self.renderer.borrow_mut().hover(incident)
    }

    pub fn unhover(&mut self) {
        self.renderer.borrow_mut().unhover();
    }

    /// Route a pointer event from the map.  Returns the clicked entity.
    pub fn on_map_event(&mut self, event: MapEvent) -> Option<MarkerTarget> {
        if self.shut_down {
            return None;
        }
        self.renderer.borrow_mut().on_map_event(event)
    }

    /// Fly the camera to a volunteer's current position.
    pub fn focus_volunteer(&mut self, volunteer: VolunteerId) -> SimResult<()> {
        self.ensure_live()?;
        let at = self.store.volunteer(volunteer)?.current_position;
        self.renderer.borrow_mut().focus(at);
        Ok(())
    }

    /// Fly the camera to an incident.
    pub fn focus_incident(&mut self, incident: IncidentId) -> SimResult<()> {
        self.ensure_live()?;
        let at = self.store.incident(incident)?.coordinates;
        self.renderer.borrow_mut().focus(at);
        Ok(())
    }

    /// Frame a volunteer together with the incident they are assigned to.
    pub fn frame_assignment(&mut self, volunteer: VolunteerId) -> SimResult<()> {
        self.ensure_live()?;
        self.store.volunteer(volunteer)?;
        Ok(self.renderer.borrow_mut().frame_assignment(volunteer)?)
    }

    // ── Teardown ──────────────────────────────────────────────────────────

    /// Stop everything: unsubscribe from the store, cancel every pending
    /// callback, destroy every marker.
    ///
    /// Safe to call more than once; later calls release nothing.  After
    /// shutdown every mutating call returns [`SimError::ShutDown`].
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.shut_down {
            return ShutdownReport::default();
        }
        self.shut_down = true;

        for id in self.subscriptions.drain(..) {
            self.store.unsubscribe(id);
        }
        let cancelled = self.motion.borrow_mut().cancel_all();
        let destroyed = self.renderer.borrow_mut().teardown();
        info!(cancelled, destroyed, "dashboard shut down");
        ShutdownReport { cancelled, destroyed }
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn ensure_live(&self) -> SimResult<()> {
        if self.shut_down {
            debug!("call on a shut down dashboard");
            return Err(SimError::ShutDown);
        }
        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn motion(&self) -> Ref<'_, MotionSimulator<S>> {
        self.motion.borrow()
    }

    pub fn renderer(&self) -> Ref<'_, MarkerRenderer<M>> {
        self.renderer.borrow()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Scheduler time.
    pub fn now(&self) -> Timestamp {
        self.motion.borrow().now()
    }

    /// Pending scheduler callbacks.
    pub fn live_tokens(&self) -> usize {
        self.motion.borrow().scheduler().live_count()
    }

    /// Last position mirrored into the store.
    pub fn volunteer_position(&self, volunteer: VolunteerId) -> SimResult<GeoPoint> {
        Ok(self.store.volunteer(volunteer)?.current_position)
    }

    /// `true` if the volunteer has a live animation or timer.
    pub fn is_animating(&self, volunteer: VolunteerId) -> bool {
        self.motion.borrow().active_token(volunteer).is_some()
    }
}

impl<S: Scheduler + 'static, M: MapBackend + 'static> Drop for Dashboard<S, M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
