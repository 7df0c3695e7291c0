//! Transition functions.
//!
//! Each verb looks up what it needs, checks preconditions, then calls the
//! store.  Preconditions are checked against the store as it is now, so two
//! independently issued verbs racing for the same volunteer resolve to one
//! `Applied` and one `NoOp`.

use dc_core::{DcError, DcResult, IncidentId, Timestamp, VolunteerId};
use dc_store::{EntityStore, IncidentDraft, IncidentStatus, VolunteerStatus};
use tracing::{debug, info};

use crate::{Action, Direction, Outcome, Skip};

/// Dispatch any [`Action`].  `now` stamps new reports.
pub fn apply(store: &mut EntityStore, action: Action, now: Timestamp) -> DcResult<Outcome> {
    match action {
        Action::Report(draft)                        => report(store, draft, now).map(Outcome::Reported),
        Action::Assign { volunteer, incident }       => assign(store, volunteer, incident),
        Action::Accept { volunteer, incident }       => accept(store, volunteer, incident),
        Action::Decline { volunteer }                => decline(store, volunteer),
        Action::AdvanceStatus { incident, direction } => advance_status(store, incident, direction),
        Action::StepTo { incident, status }          => step_to(store, incident, status),
        Action::Arrive { volunteer, incident }       => on_arrival(store, volunteer, incident),
        Action::Complete { volunteer }               => complete(store, volunteer),
    }
}

/// File a citizen report.  Returns the new incident's id.
pub fn report(store: &mut EntityStore, draft: IncidentDraft, now: Timestamp) -> DcResult<IncidentId> {
    let incident = store.report_incident(draft, now)?;
    info!(id = %incident.id, kind = %incident.kind, severity = ?incident.severity, "incident reported");
    Ok(incident.id)
}

/// Offer `incident` to a pending or standby volunteer.
pub fn assign(store: &mut EntityStore, volunteer: VolunteerId, incident: IncidentId) -> DcResult<Outcome> {
    let status = store.volunteer(volunteer)?.status;
    store.incident(incident)?;
    if !matches!(status, VolunteerStatus::Pending | VolunteerStatus::Standby) {
        return Ok(skipped(volunteer, Skip::VolunteerUnavailable));
    }
    store.offer_task(volunteer, incident)?;
    Ok(Outcome::Applied)
}

/// Volunteer accepts `incident`: en route, incident assigned.
pub fn accept(store: &mut EntityStore, volunteer: VolunteerId, incident: IncidentId) -> DcResult<Outcome> {
    let status = store.volunteer(volunteer)?.status;
    store.incident(incident)?;
    if !matches!(status, VolunteerStatus::Pending | VolunteerStatus::Standby) {
        return Ok(skipped(volunteer, Skip::VolunteerUnavailable));
    }
    store.assign_volunteer(volunteer, incident)?;
    info!(%volunteer, %incident, "volunteer accepted");
    Ok(Outcome::Applied)
}

/// Volunteer turns down a pending offer.
pub fn decline(store: &mut EntityStore, volunteer: VolunteerId) -> DcResult<Outcome> {
    if store.volunteer(volunteer)?.status != VolunteerStatus::Pending {
        return Ok(skipped(volunteer, Skip::NotPending));
    }
    store.decline_volunteer(volunteer)?;
    Ok(Outcome::Applied)
}

/// Move one pipeline step in `direction`; a no-op at either end.
pub fn advance_status(store: &mut EntityStore, incident: IncidentId, direction: Direction) -> DcResult<Outcome> {
    let current = store.incident(incident)?.status;
    let target = match direction {
        Direction::Next     => current.next(),
        Direction::Previous => current.previous(),
    };
    let Some(target) = target else {
        return Ok(skipped(incident, Skip::PipelineEnd));
    };
    store.set_incident_status(incident, target)?;
    Ok(Outcome::Applied)
}

/// Set a pipeline step directly.  Only the adjacent steps (or the current
/// one) are reachable; anything further is an `InvalidTransition`.
pub fn step_to(store: &mut EntityStore, incident: IncidentId, status: IncidentStatus) -> DcResult<Outcome> {
    let current = store.incident(incident)?.status;
    if current.index().abs_diff(status.index()) > 1 {
        return Err(DcError::invalid(incident, "pipeline steps cannot be skipped"));
    }
    store.set_incident_status(incident, status)?;
    Ok(Outcome::Applied)
}

/// Directed travel for `volunteer` reached `incident`.
///
/// Issued by the motion simulator only.  An arrival for a volunteer who was
/// reassigned or stood down mid-flight is stale and ignored.
pub fn on_arrival(store: &mut EntityStore, volunteer: VolunteerId, incident: IncidentId) -> DcResult<Outcome> {
    let record = store.volunteer(volunteer)?;
    let en_route = record.status == VolunteerStatus::EnRoute && record.serves(incident);
    store.incident(incident)?;
    if !en_route {
        return Ok(skipped(volunteer, Skip::StaleArrival));
    }
    store.mark_arrived(volunteer)?;
    info!(%volunteer, %incident, "volunteer arrived on scene");
    Ok(Outcome::Applied)
}

/// Volunteer finishes on scene and returns to standby.
///
/// When the last responder leaves an incident that is in progress, the
/// incident moves one step on to `Resolved`.
pub fn complete(store: &mut EntityStore, volunteer: VolunteerId) -> DcResult<Outcome> {
    let record = store.volunteer(volunteer)?;
    let incident = match (record.status, record.assigned_incident) {
        (VolunteerStatus::OnScene, Some(incident)) => incident,
        _ => return Ok(skipped(volunteer, Skip::NotOnScene)),
    };

    store.decline_volunteer(volunteer)?;

    let in_progress = store.incident(incident)?.status == IncidentStatus::InProgress;
    if in_progress && store.responders(incident).next().is_none() {
        store.set_incident_status(incident, IncidentStatus::Resolved)?;
        info!(%incident, "incident resolved");
    }
    Ok(Outcome::Applied)
}

fn skipped(entity: impl std::fmt::Display, skip: Skip) -> Outcome {
    debug!(%entity, reason = skip.reason(), "dispatch no-op");
    Outcome::NoOp(skip)
}
