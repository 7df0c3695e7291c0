//! Verbs the view layer (and the motion simulator) can issue.

use dc_core::{IncidentId, VolunteerId};
use dc_store::{IncidentDraft, IncidentStatus};

/// Which way to move along the incident pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// A dispatch request.
///
/// Produced by the view layer, except `Arrive`, which only the motion
/// simulator issues when a directed-travel animation completes.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// A citizen report.
    Report(IncidentDraft),

    /// Command center offers a task to a standby volunteer.
    Assign { volunteer: VolunteerId, incident: IncidentId },

    /// Volunteer takes the task and heads out.
    Accept { volunteer: VolunteerId, incident: IncidentId },

    /// Volunteer turns a pending offer down.
    Decline { volunteer: VolunteerId },

    /// Move one step along the pipeline.
    AdvanceStatus { incident: IncidentId, direction: Direction },

    /// Jump to a specific pipeline step (timeline click).  Must be adjacent.
    StepTo { incident: IncidentId, status: IncidentStatus },

    /// Directed travel finished.
    Arrive { volunteer: VolunteerId, incident: IncidentId },

    /// Volunteer finished on scene.
    Complete { volunteer: VolunteerId },
}

/// Why a verb was ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Skip {
    /// Accept/assign needs a pending or standby volunteer.
    VolunteerUnavailable,
    /// Decline needs a pending volunteer.
    NotPending,
    /// Already at the pipeline end in that direction.
    PipelineEnd,
    /// Arrival for a volunteer no longer travelling to that incident.
    StaleArrival,
    /// Complete needs a volunteer on scene.
    NotOnScene,
}

impl Skip {
    pub fn reason(self) -> &'static str {
        match self {
            Skip::VolunteerUnavailable => "volunteer is not pending or on standby",
            Skip::NotPending           => "volunteer has no pending offer",
            Skip::PipelineEnd          => "incident is already at the end of the pipeline",
            Skip::StaleArrival         => "volunteer is no longer travelling to that incident",
            Skip::NotOnScene           => "volunteer is not on scene",
        }
    }
}

/// Result of a verb that did not fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The store changed.
    Applied,
    /// A report created this incident.
    Reported(IncidentId),
    /// Nothing changed.
    NoOp(Skip),
}

impl Outcome {
    #[inline]
    pub fn is_noop(self) -> bool {
        matches!(self, Outcome::NoOp(_))
    }
}
