//! Dashboard observer trait for progress reporting.

use dc_core::{IncidentId, Timestamp, VolunteerId};

/// Callbacks invoked by [`Dashboard::advance`][crate::Dashboard::advance].
///
/// All methods default to no-ops so implementors only override what they
/// need.
pub trait DashboardObserver {
    /// A volunteer's directed travel finished and they are now on scene.
    fn on_arrival(&mut self, _volunteer: VolunteerId, _incident: IncidentId, _at: Timestamp) {}

    /// Incident urgency was recomputed.
    fn on_urgency_refresh(&mut self, _at: Timestamp) {}

    /// Called once at the end of each `advance`.
    ///
    /// `fired` is the number of scheduler callbacks run during the step.
    fn on_step_end(&mut self, _now: Timestamp, _fired: usize) {}
}

/// A [`DashboardObserver`] that does nothing.
pub struct NoopObserver;

impl DashboardObserver for NoopObserver {}
