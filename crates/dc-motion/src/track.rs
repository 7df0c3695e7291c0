//! Per-volunteer motion state.

use std::time::Duration;

use dc_core::{GeoPoint, IncidentId, Timestamp, VolunteerId, VolunteerRng};
use dc_store::VolunteerStatus;

use crate::Token;
use crate::easing::ease_in_out;

/// One eased move from `from` to `to`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tween {
    pub from:     GeoPoint,
    pub to:       GeoPoint,
    pub start:    Timestamp,
    pub duration: Duration,
}

impl Tween {
    pub fn new(from: GeoPoint, to: GeoPoint, start: Timestamp, duration: Duration) -> Self {
        Self { from, to, start, duration }
    }

    /// Raw fraction of the duration elapsed at `now`, in `[0.0, 1.0]`.
    ///
    /// A zero-length tween is complete immediately.
    pub fn progress(&self, now: Timestamp) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.since(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }

    #[inline]
    pub fn is_complete(&self, now: Timestamp) -> bool {
        self.progress(now) >= 1.0
    }

    /// Eased position at `now`.
    pub fn position_at(&self, now: Timestamp) -> GeoPoint {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, ease_in_out(p))
    }
}

/// Which controller currently owns a volunteer's marker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Between wander steps, waiting on a timeout.
    IdleWaiting,
    /// Easing toward a wander target.
    IdleEasing(Tween),
    /// Easing toward an incident.
    Travel { incident: IncidentId, tween: Tween },
    /// Not animated.  Position stays where the last animation left it.
    Settled,
}

/// Coarse behavior name for callers that only care which loop is active.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BehaviorKind {
    Idle,
    Travel,
    Settled,
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::IdleWaiting | Behavior::IdleEasing(_) => BehaviorKind::Idle,
            Behavior::Travel { .. } => BehaviorKind::Travel,
            Behavior::Settled => BehaviorKind::Settled,
        }
    }
}

/// Everything the simulator tracks for one volunteer.
pub(crate) struct Track {
    /// Position last drawn.
    pub(crate) position: GeoPoint,
    /// Wander centre.  Moves to each wander target once it is reached.
    pub(crate) base:     GeoPoint,
    pub(crate) behavior: Behavior,
    /// The one live callback for this volunteer, if any.
    pub(crate) token:    Option<Token>,
    /// Status and assignment the current behavior was chosen for.
    pub(crate) observed: (VolunteerStatus, Option<IncidentId>),
    pub(crate) rng:      VolunteerRng,
}

impl Track {
    pub(crate) fn new(
        seed:     u64,
        id:       VolunteerId,
        position: GeoPoint,
        observed: (VolunteerStatus, Option<IncidentId>),
    ) -> Self {
        Self {
            position,
            base: position,
            behavior: Behavior::Settled,
            token: None,
            observed,
            rng: VolunteerRng::new(seed, id),
        }
    }
}
