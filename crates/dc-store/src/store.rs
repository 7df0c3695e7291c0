//! The `EntityStore`: canonical incident and volunteer state.
//!
//! # Layout
//!
//! Both collections are `Vec`s in insertion order (stable list rendering)
//! with an `id → slot` index beside each.  Entities are never removed, so
//! slots never shift.
//!
//! # Mutation contract
//!
//! Every public mutation either fails before touching anything or applies
//! all of its effects and then notifies subscribers exactly once.  A mutation
//! that would leave state unchanged skips notification.

use dc_core::{DashboardConfig, DcError, DcResult, GeoPoint, IncidentId, SimRng, Timestamp, VolunteerId};
use tracing::debug;

use crate::observer::{Callback, ChangeSet, Snapshot, Subscribers, SubscriptionId};
use crate::{
    Incident, IncidentDraft, IncidentOverview, IncidentStatus, Severity, Volunteer,
    VolunteerStatus,
};

#[cfg(feature = "fx-hash")]
type SlotMap<K> = rustc_hash::FxHashMap<K, usize>;
#[cfg(not(feature = "fx-hash"))]
type SlotMap<K> = std::collections::HashMap<K, usize>;

/// Holds every incident and volunteer; the single source of truth.
pub struct EntityStore {
    incidents:       Vec<Incident>,
    incident_slots:  SlotMap<IncidentId>,
    volunteers:      Vec<Volunteer>,
    volunteer_slots: SlotMap<VolunteerId>,

    /// Next id to hand out.  A counter, so ids never collide with any id
    /// ever issued; `None` once the id space is used up.
    next_incident:   Option<IncidentId>,

    default_center:  GeoPoint,
    jitter_deg:      f64,
    rng:             SimRng,

    subscribers:     Subscribers,
}

impl EntityStore {
    /// Create an empty store.  Jitter and fallback centre come from `config`.
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            incidents:       Vec::new(),
            incident_slots:  SlotMap::default(),
            volunteers:      Vec::new(),
            volunteer_slots: SlotMap::default(),
            next_incident:   Some(IncidentId(1)),
            default_center:  config.default_center,
            jitter_deg:      config.jitter_deg,
            rng:             SimRng::new(config.seed),
            subscribers:     Subscribers::default(),
        }
    }

    // ── Subscriptions ─────────────────────────────────────────────────────

    /// Register a callback run after every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot<'_>) + 'static,
    {
        let boxed: Callback = Box::new(callback);
        let id = self.subscribers.add(boxed);
        debug!(subscription = id.0, "store subscriber added");
        id
    }

    /// Remove a callback.  Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.remove(id);
        if removed {
            debug!(subscription = id.0, "store subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Notify subscribers with every id marked changed.  Used once after
    /// seeding so late subscribers see the initial state.
    pub fn publish(&mut self) {
        let changes = ChangeSet {
            incidents:  self.incidents.iter().map(|i| i.id).collect(),
            volunteers: self.volunteers.iter().map(|v| v.id).collect(),
        };
        self.notify(changes);
    }

    fn notify(&mut self, changes: ChangeSet) {
        let Self { incidents, volunteers, subscribers, .. } = self;
        let snapshot = Snapshot {
            incidents:  incidents.as_slice(),
            volunteers: volunteers.as_slice(),
            changed:    &changes,
        };
        subscribers.notify(&snapshot);
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn incident(&self, id: IncidentId) -> DcResult<&Incident> {
        self.incident_slots
            .get(&id)
            .map(|&slot| &self.incidents[slot])
            .ok_or(DcError::IncidentNotFound(id))
    }

    pub fn volunteer(&self, id: VolunteerId) -> DcResult<&Volunteer> {
        self.volunteer_slots
            .get(&id)
            .map(|&slot| &self.volunteers[slot])
            .ok_or(DcError::VolunteerNotFound(id))
    }

    /// All incidents in insertion order.
    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// All volunteers in roster order.
    pub fn volunteers(&self) -> &[Volunteer] {
        &self.volunteers
    }

    /// Incidents with the most recent report first.
    pub fn newest_first(&self) -> impl Iterator<Item = &Incident> + '_ {
        self.incidents.iter().rev()
    }

    /// Unresolved incidents by severity weight then age, resolved ones last.
    pub fn incidents_by_urgency(&self) -> Vec<&Incident> {
        let mut sorted: Vec<&Incident> = self.incidents.iter().collect();
        sorted.sort_by(|a, b| {
            a.is_resolved()
                .cmp(&b.is_resolved())
                .then(b.severity.weight().cmp(&a.severity.weight()))
                .then(a.reported_at.cmp(&b.reported_at))
        });
        sorted
    }

    pub fn overview(&self) -> IncidentOverview {
        let mut overview = IncidentOverview::default();
        for incident in &self.incidents {
            if incident.is_resolved() {
                overview.resolved += 1;
                continue;
            }
            overview.active += 1;
            match incident.severity {
                Severity::Critical => overview.critical += 1,
                Severity::High     => overview.high += 1,
                Severity::Medium   => overview.medium += 1,
                Severity::Low      => overview.low += 1,
            }
        }
        overview
    }

    /// Volunteers holding an offer awaiting accept/decline.
    pub fn pending_offers(&self) -> impl Iterator<Item = &Volunteer> + '_ {
        self.volunteers.iter().filter(|v| v.status == VolunteerStatus::Pending)
    }

    /// Volunteers currently deployed (en route or on scene).
    pub fn active_assignments(&self) -> impl Iterator<Item = &Volunteer> + '_ {
        self.volunteers.iter().filter(|v| v.status.is_deployed())
    }

    /// Volunteers assigned to `incident` right now.
    pub fn responders(&self, incident: IncidentId) -> impl Iterator<Item = &Volunteer> + '_ {
        self.volunteers.iter().filter(move |v| v.serves(incident))
    }

    // ── Roster and seed loading (no notification) ─────────────────────────

    /// Add a roster volunteer at startup.
    ///
    /// Fails on a duplicate id or a record breaking the assignment invariant.
    pub fn add_volunteer(&mut self, volunteer: Volunteer) -> DcResult<()> {
        if self.volunteer_slots.contains_key(&volunteer.id) {
            return Err(DcError::Config(format!("duplicate {}", volunteer.id)));
        }
        if !volunteer.is_consistent() {
            return Err(DcError::invalid(volunteer.id, "assignment does not match status"));
        }
        self.volunteer_slots.insert(volunteer.id, self.volunteers.len());
        self.volunteers.push(volunteer);
        Ok(())
    }

    /// Insert an incident reported at `reported_at` without notifying.
    pub fn seed_incident(&mut self, draft: IncidentDraft, reported_at: Timestamp) -> DcResult<IncidentId> {
        self.insert_incident(draft, reported_at)
    }

    fn insert_incident(&mut self, draft: IncidentDraft, reported_at: Timestamp) -> DcResult<IncidentId> {
        let id = self.next_incident.ok_or(DcError::IdsExhausted("incident"))?;
        self.next_incident = id.checked_next();

        let coordinates = match draft.coordinates {
            Some(point) => point,
            None => self.default_center.offset(
                self.rng.symmetric(self.jitter_deg),
                self.rng.symmetric(self.jitter_deg),
            ),
        };

        self.incident_slots.insert(id, self.incidents.len());
        self.incidents.push(Incident {
            id,
            kind:                draft.kind,
            location:            draft.location,
            summary:             draft.summary,
            severity:            draft.severity.unwrap_or(Severity::High),
            coordinates,
            status:              IncidentStatus::Reported,
            assigned_volunteers: Vec::new(),
            reported_at,
        });
        Ok(id)
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Record a new incident with a fresh id, `Reported` status and
    /// `reported_at = now`.  Returns a copy of the stored record.
    ///
    /// Fails with `IdsExhausted`, leaving the store untouched, once every
    /// incident id has been issued.
    pub fn report_incident(&mut self, draft: IncidentDraft, now: Timestamp) -> DcResult<Incident> {
        let synthesised = draft.coordinates.is_none();
        let id = self.insert_incident(draft, now)?;
        let slot = self.incident_slots[&id];
        let incident = self.incidents[slot].clone();
        debug!(%id, at = %incident.coordinates, synthesised, "incident reported");
        self.notify(ChangeSet::incident(id));
        Ok(incident)
    }

    /// Replace an incident's status.  No pipeline ordering is enforced here.
    pub fn set_incident_status(&mut self, id: IncidentId, status: IncidentStatus) -> DcResult<()> {
        let slot = self.incident_slot(id)?;
        let incident = &mut self.incidents[slot];
        if incident.status == status {
            return Ok(());
        }
        debug!(%id, from = ?incident.status, to = ?status, "incident status set");
        incident.status = status;
        self.notify(ChangeSet::incident(id));
        Ok(())
    }

    /// Put a task offer in front of a volunteer: status `Pending`, no
    /// assignment.  Used for the command-center assign action.
    pub fn offer_task(&mut self, volunteer: VolunteerId, incident: IncidentId) -> DcResult<()> {
        let v_slot = self.volunteer_slot(volunteer)?;
        self.incident_slot(incident)?;

        let record = &mut self.volunteers[v_slot];
        record.status = VolunteerStatus::Pending;
        record.assigned_incident = None;
        record.offered_incident = Some(incident);
        debug!(%volunteer, %incident, "task offered");
        self.notify(ChangeSet::volunteer(volunteer));
        Ok(())
    }

    /// Send a volunteer to an incident.
    ///
    /// The volunteer becomes `EnRoute` with the assignment set; the incident
    /// gains the volunteer in its history (once) and moves to `Assigned` only
    /// from `Reported` or `Verified`.
    pub fn assign_volunteer(&mut self, volunteer: VolunteerId, incident: IncidentId) -> DcResult<()> {
        let v_slot = self.volunteer_slot(volunteer)?;
        let i_slot = self.incident_slot(incident)?;

        let record = &mut self.volunteers[v_slot];
        record.status = VolunteerStatus::EnRoute;
        record.assigned_incident = Some(incident);
        record.offered_incident = None;

        let target = &mut self.incidents[i_slot];
        if !target.assigned_volunteers.contains(&volunteer) {
            target.assigned_volunteers.push(volunteer);
        }
        if matches!(target.status, IncidentStatus::Reported | IncidentStatus::Verified) {
            target.status = IncidentStatus::Assigned;
        }

        debug!(%volunteer, %incident, "volunteer assigned");
        self.notify(ChangeSet::volunteer(volunteer).with_incident(incident));
        Ok(())
    }

    /// Return a volunteer to `Standby`, clearing assignment and offer in the
    /// same step.  Incident history is left intact.  Idempotent.
    pub fn decline_volunteer(&mut self, volunteer: VolunteerId) -> DcResult<()> {
        let slot = self.volunteer_slot(volunteer)?;
        let record = &mut self.volunteers[slot];
        if record.status == VolunteerStatus::Standby
            && record.assigned_incident.is_none()
            && record.offered_incident.is_none()
        {
            return Ok(());
        }
        record.status = VolunteerStatus::Standby;
        record.assigned_incident = None;
        record.offered_incident = None;
        debug!(%volunteer, "volunteer back on standby");
        self.notify(ChangeSet::volunteer(volunteer));
        Ok(())
    }

    /// Mark a volunteer on scene; its incident moves to `InProgress` if it
    /// is currently `Assigned`.
    pub fn mark_arrived(&mut self, volunteer: VolunteerId) -> DcResult<()> {
        let slot = self.volunteer_slot(volunteer)?;
        let Some(incident) = self.volunteers[slot].assigned_incident else {
            return Err(DcError::invalid(volunteer, "arrival without an assignment"));
        };
        let i_slot = self.incident_slot(incident)?;

        self.volunteers[slot].status = VolunteerStatus::OnScene;
        let mut changes = ChangeSet::volunteer(volunteer);
        let target = &mut self.incidents[i_slot];
        if target.status == IncidentStatus::Assigned {
            target.status = IncidentStatus::InProgress;
            changes = changes.with_incident(incident);
        }

        debug!(%volunteer, %incident, "volunteer on scene");
        self.notify(changes);
        Ok(())
    }

    /// Store the position the motion simulator is driving.  Positions change
    /// every frame, so this does not notify.
    pub fn record_position(&mut self, volunteer: VolunteerId, position: GeoPoint) -> DcResult<()> {
        let slot = self.volunteer_slot(volunteer)?;
        self.volunteers[slot].current_position = position;
        Ok(())
    }

    /// Move the id counter, to exercise exhaustion without four billion
    /// reports.
    #[cfg(test)]
    pub(crate) fn set_next_incident(&mut self, next: Option<IncidentId>) {
        self.next_incident = next;
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn incident_slot(&self, id: IncidentId) -> DcResult<usize> {
        self.incident_slots.get(&id).copied().ok_or(DcError::IncidentNotFound(id))
    }

    fn volunteer_slot(&self, id: VolunteerId) -> DcResult<usize> {
        self.volunteer_slots.get(&id).copied().ok_or(DcError::VolunteerNotFound(id))
    }
}
