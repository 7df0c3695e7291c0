//! `MotionSimulator`: chooses and drives each volunteer's animation.
//!
//! # Behavior selection
//!
//! | Volunteer status        | Behavior                                    |
//! |-------------------------|---------------------------------------------|
//! | `Pending`, `Standby`    | idle wander around the last settled base    |
//! | `EnRoute` + assignment  | directed travel to the incident coordinates |
//! | `OnScene`               | settled, no callbacks                       |
//!
//! The behavior is re-chosen whenever a store notification shows a change to
//! the volunteer's status or assignment.  The volunteer's live token is
//! cancelled first, so at most one loop ever runs per volunteer.
//!
//! # Arrival
//!
//! A finished directed travel is reported as [`MotionEvent::Arrived`] from
//! [`MotionSimulator::handle`].  The owner feeds it to the dispatch layer
//! after releasing its borrow of the simulator; the resulting store
//! notification then settles the track.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use dc_core::{DashboardConfig, DcError, GeoPoint, IncidentId, Timestamp, VolunteerId};
use dc_store::{Snapshot, Volunteer, VolunteerStatus};
use tracing::{debug, warn};

use crate::track::{Behavior, BehaviorKind, Track, Tween};
use crate::{Due, MotionTask, Scheduler, Token};

/// Something the owner has to act on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    /// Directed travel reached the incident.
    Arrived { volunteer: VolunteerId, incident: IncidentId },
}

/// Animation timings, taken from [`DashboardConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionTiming {
    pub travel:             Duration,
    pub idle_initial_delay: Duration,
    pub idle_ease:          Duration,
    pub idle_rest_min_ms:   u64,
    pub idle_rest_max_ms:   u64,
    pub idle_radius_deg:    f64,
}

impl From<&DashboardConfig> for MotionTiming {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            travel:             config.travel_duration(),
            idle_initial_delay: config.idle_initial_delay(),
            idle_ease:          config.idle_ease_duration(),
            idle_rest_min_ms:   config.idle_rest_min_ms,
            idle_rest_max_ms:   config.idle_rest_max_ms,
            idle_radius_deg:    config.idle_radius_deg,
        }
    }
}

/// Per-volunteer position controller over an injected [`Scheduler`].
pub struct MotionSimulator<S: Scheduler> {
    scheduler: S,
    timing:    MotionTiming,
    seed:      u64,
    /// Ordered so iteration (and therefore replay) is deterministic.
    tracks:    BTreeMap<VolunteerId, Track>,
    /// Positions drawn since the last `drain_moved`.
    moved:     Vec<(VolunteerId, GeoPoint)>,
}

impl<S: Scheduler> MotionSimulator<S> {
    pub fn new(config: &DashboardConfig, scheduler: S) -> Self {
        Self {
            scheduler,
            timing: MotionTiming::from(config),
            seed: config.seed,
            tracks: BTreeMap::new(),
            moved: Vec::new(),
        }
    }

    // ── Store notifications ───────────────────────────────────────────────

    /// React to a store mutation.
    ///
    /// Volunteers named in `snapshot.changed` whose status or assignment
    /// differs from what their current behavior was chosen for are
    /// restarted.  Tracks for volunteers gone from the snapshot are dropped
    /// along with their token.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        if !snapshot.changed.touches_volunteers() {
            return;
        }

        let present: HashSet<VolunteerId> = snapshot.volunteers.iter().map(|v| v.id).collect();
        let Self { tracks, scheduler, .. } = &mut *self;
        tracks.retain(|id, track| {
            let keep = present.contains(id);
            if !keep {
                if let Some(token) = track.token.take() {
                    scheduler.cancel(token);
                }
            }
            keep
        });

        for &id in &snapshot.changed.volunteers {
            let Some(volunteer) = snapshot.volunteer(id) else {
                continue;
            };
            let observed = (volunteer.status, volunteer.assigned_incident);
            if self.tracks.get(&id).is_some_and(|t| t.observed == observed) {
                continue;
            }
            self.restart(volunteer, snapshot);
        }
    }

    fn restart(&mut self, volunteer: &Volunteer, snapshot: &Snapshot<'_>) {
        let id = volunteer.id;
        let observed = (volunteer.status, volunteer.assigned_incident);
        let now = self.scheduler.now();

        let seed = self.seed;
        let track = self
            .tracks
            .entry(id)
            .or_insert_with(|| Track::new(seed, id, volunteer.current_position, observed));

        if let Some(token) = track.token.take() {
            self.scheduler.cancel(token);
        }
        track.observed = observed;

        match (volunteer.status, volunteer.assigned_incident) {
            (status, _) if status.is_idle() => {
                track.base = track.position;
                track.behavior = Behavior::IdleWaiting;
                track.token = Some(
                    self.scheduler.set_timeout(self.timing.idle_initial_delay, MotionTask::Wake(id)),
                );
                debug!(volunteer = %id, "idle wander started");
            }
            (VolunteerStatus::EnRoute, Some(incident)) => match snapshot.incident(incident) {
                Some(target) => {
                    let tween = Tween::new(track.position, target.coordinates, now, self.timing.travel);
                    track.behavior = Behavior::Travel { incident, tween };
                    track.token = Some(self.scheduler.request_frame(MotionTask::Frame(id)));
                    debug!(volunteer = %id, %incident, to = %target.coordinates, "directed travel started");
                }
                None => {
                    track.behavior = Behavior::Settled;
                    let error = DcError::AnimationTargetMissing { volunteer: id, incident };
                    warn!(%error, "directed travel not started");
                }
            },
            _ => {
                track.behavior = Behavior::Settled;
                debug!(volunteer = %id, status = ?volunteer.status, "settled");
            }
        }
    }

    // ── Callbacks ─────────────────────────────────────────────────────────

    /// Remove the earliest callback due by `until`.
    #[inline]
    pub fn pop_due(&mut self, until: Timestamp) -> Option<Due> {
        self.scheduler.pop_due(until)
    }

    /// Run one fired callback.
    ///
    /// Callbacks whose token is no longer the volunteer's live token are
    /// ignored.
    pub fn handle(&mut self, due: Due) -> Option<MotionEvent> {
        let id = due.task.volunteer();
        let track = self.tracks.get_mut(&id)?;
        if track.token != Some(due.token) {
            debug!(volunteer = %id, token = %due.token, "stale callback ignored");
            return None;
        }
        track.token = None;
        let now = due.at;

        match (due.task, track.behavior) {
            (MotionTask::Wake(_), Behavior::IdleWaiting) => {
                let r = self.timing.idle_radius_deg;
                let target = track.base.offset(track.rng.symmetric(r), track.rng.symmetric(r));
                track.behavior = Behavior::IdleEasing(Tween::new(
                    track.position,
                    target,
                    now,
                    self.timing.idle_ease,
                ));
                track.token = Some(self.scheduler.request_frame(MotionTask::Frame(id)));
                None
            }
            (MotionTask::Frame(_), Behavior::IdleEasing(tween)) => {
                track.position = tween.position_at(now);
                self.moved.push((id, track.position));
                if tween.is_complete(now) {
                    track.base = tween.to;
                    track.behavior = Behavior::IdleWaiting;
                    let rest = rest_ms(track, &self.timing);
                    track.token = Some(
                        self.scheduler.set_timeout(Duration::from_millis(rest), MotionTask::Wake(id)),
                    );
                } else {
                    track.token = Some(self.scheduler.request_frame(MotionTask::Frame(id)));
                }
                None
            }
            (MotionTask::Frame(_), Behavior::Travel { incident, tween }) => {
                track.position = tween.position_at(now);
                self.moved.push((id, track.position));
                if tween.is_complete(now) {
                    track.behavior = Behavior::Settled;
                    debug!(volunteer = %id, %incident, "directed travel complete");
                    Some(MotionEvent::Arrived { volunteer: id, incident })
                } else {
                    track.token = Some(self.scheduler.request_frame(MotionTask::Frame(id)));
                    None
                }
            }
            (task, behavior) => {
                debug!(volunteer = %id, ?task, ?behavior, "callback does not match behavior");
                None
            }
        }
    }

    /// Run every callback due by `until`, then move the clock there.
    ///
    /// Arrivals are collected, not fed back; use this when nothing reacts to
    /// them mid-run.
    pub fn run_until(&mut self, until: Timestamp) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        while let Some(due) = self.pop_due(until) {
            events.extend(self.handle(due));
        }
        self.scheduler.advance_to(until);
        events
    }

    /// Move the scheduler clock forward.
    #[inline]
    pub fn advance_to(&mut self, until: Timestamp) {
        self.scheduler.advance_to(until);
    }

    /// Cancel every callback for every volunteer.  Tracks stay where they
    /// are, settled.  Returns the number of tokens cancelled.
    pub fn cancel_all(&mut self) -> usize {
        for track in self.tracks.values_mut() {
            track.token = None;
            track.behavior = Behavior::Settled;
        }
        let n = self.scheduler.cancel_all();
        debug!(cancelled = n, "motion callbacks cancelled");
        n
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Positions drawn since the last call, in draw order.
    pub fn drain_moved(&mut self) -> Vec<(VolunteerId, GeoPoint)> {
        std::mem::take(&mut self.moved)
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.scheduler.now()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn position(&self, volunteer: VolunteerId) -> Option<GeoPoint> {
        self.tracks.get(&volunteer).map(|t| t.position)
    }

    /// Current wander centre.
    pub fn base(&self, volunteer: VolunteerId) -> Option<GeoPoint> {
        self.tracks.get(&volunteer).map(|t| t.base)
    }

    pub fn behavior(&self, volunteer: VolunteerId) -> Option<BehaviorKind> {
        self.tracks.get(&volunteer).map(|t| t.behavior.kind())
    }

    /// The volunteer's live token, if an animation or timer is pending.
    pub fn active_token(&self, volunteer: VolunteerId) -> Option<Token> {
        self.tracks.get(&volunteer).and_then(|t| t.token)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

fn rest_ms(track: &mut Track, timing: &MotionTiming) -> u64 {
    let (lo, hi) = (timing.idle_rest_min_ms, timing.idle_rest_max_ms);
    if hi <= lo {
        return lo;
    }
    track.rng.gen_range(lo..=hi)
}
