//! `MarkerRenderer<M>`: keeps map markers in lockstep with the store.
//!
//! The renderer caches, per entity, the marker handle plus the last position
//! and style it sent.  Every reconcile computes the desired position and
//! style for each entity and sends only the differences, so an unchanged
//! marker costs nothing and a moved one is updated in place rather than
//! recreated.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use dc_core::{
    DashboardConfig, DcError, DcResult, GeoPoint, IncidentId, MarkerHandle, Timestamp, VolunteerId,
};
use dc_store::{Incident, IncidentStatus, Severity, Snapshot, Volunteer, VolunteerStatus};
use tracing::debug;

use crate::hover::{incident_emphasis, volunteer_emphasis};
use crate::{MapBackend, MapEvent, MarkerKind, MarkerStyle, MarkerTarget, Tone, Urgency};

/// Camera and refresh settings, taken from [`DashboardConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub urgency_refresh:    Duration,
    pub urgency_saturation: Duration,
    pub focus_zoom:         f64,
    pub focus_duration:     Duration,
    pub overview_zoom:      f64,
    pub bounds_padding_px:  u32,
}

impl From<&DashboardConfig> for RenderSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            urgency_refresh:    config.urgency_refresh_interval(),
            urgency_saturation: config.urgency_saturation(),
            focus_zoom:         config.focus_zoom,
            focus_duration:     Duration::from_millis(config.focus_duration_ms),
            overview_zoom:      config.overview_zoom,
            bounds_padding_px:  config.bounds_padding_px,
        }
    }
}

struct IncidentMarker {
    handle:      MarkerHandle,
    position:    GeoPoint,
    style:       MarkerStyle,
    kind:        String,
    severity:    Severity,
    status:      IncidentStatus,
    reported_at: Timestamp,
}

struct VolunteerMarker {
    handle:   MarkerHandle,
    position: GeoPoint,
    style:    MarkerStyle,
    name:     String,
    status:   VolunteerStatus,
    assigned: Option<IncidentId>,
}

/// Binds store contents to markers on a [`MapBackend`].
pub struct MarkerRenderer<M: MapBackend> {
    map:          M,
    settings:     RenderSettings,
    incidents:    BTreeMap<IncidentId, IncidentMarker>,
    volunteers:   BTreeMap<VolunteerId, VolunteerMarker>,
    targets:      HashMap<MarkerHandle, MarkerTarget>,
    hovered:      Option<IncidentId>,
    /// Time used for urgency.  Moved forward by the owner.
    clock:        Timestamp,
    next_refresh: Timestamp,
}

impl<M: MapBackend> MarkerRenderer<M> {
    pub fn new(config: &DashboardConfig, map: M, start: Timestamp) -> Self {
        let settings = RenderSettings::from(config);
        Self {
            map,
            settings,
            incidents: BTreeMap::new(),
            volunteers: BTreeMap::new(),
            targets: HashMap::new(),
            hovered: None,
            clock: start,
            next_refresh: start + settings.urgency_refresh,
        }
    }

    // ── Reconcile ─────────────────────────────────────────────────────────

    /// Bring the marker set in line with `snapshot`.
    ///
    /// Markers whose entity is gone are destroyed, new entities get a marker
    /// at their current position, and existing markers are moved or
    /// restyled in place.
    pub fn reconcile(&mut self, snapshot: &Snapshot<'_>) {
        self.drop_missing(snapshot);

        for incident in snapshot.incidents {
            self.upsert_incident(incident);
        }
        for volunteer in snapshot.volunteers {
            self.upsert_volunteer(volunteer);
        }
    }

    fn drop_missing(&mut self, snapshot: &Snapshot<'_>) {
        let gone_incidents: Vec<IncidentId> = self
            .incidents
            .keys()
            .copied()
            .filter(|id| snapshot.incident(*id).is_none())
            .collect();
        let gone_volunteers: Vec<VolunteerId> = self
            .volunteers
            .keys()
            .copied()
            .filter(|id| snapshot.volunteer(*id).is_none())
            .collect();

        for id in gone_incidents {
            if let Some(marker) = self.incidents.remove(&id) {
                self.destroy(marker.handle);
            }
            if self.hovered == Some(id) {
                self.hovered = None;
                debug!(incident = %id, "hovered marker destroyed");
            }
        }
        for id in gone_volunteers {
            if let Some(marker) = self.volunteers.remove(&id) {
                self.destroy(marker.handle);
            }
        }
    }

    fn upsert_incident(&mut self, incident: &Incident) {
        let style = self.incident_style(
            incident.id,
            &incident.kind,
            incident.severity,
            incident.status,
            incident.reported_at,
        );
        match self.incidents.get_mut(&incident.id) {
            Some(marker) => {
                marker.kind.clone_from(&incident.kind);
                marker.severity = incident.severity;
                marker.status = incident.status;
                if marker.position != incident.coordinates {
                    marker.position = incident.coordinates;
                    self.map.update_marker_position(marker.handle, marker.position);
                }
                if marker.style != style {
                    self.map.update_marker_style(marker.handle, &style);
                    marker.style = style;
                }
            }
            None => {
                let handle = self.map.create_marker(MarkerKind::Incident, incident.coordinates, &style);
                self.targets.insert(handle, MarkerTarget::Incident(incident.id));
                debug!(incident = %incident.id, %handle, "incident marker created");
                self.incidents.insert(incident.id, IncidentMarker {
                    handle,
                    position:    incident.coordinates,
                    style,
                    kind:        incident.kind.clone(),
                    severity:    incident.severity,
                    status:      incident.status,
                    reported_at: incident.reported_at,
                });
            }
        }
    }

    fn upsert_volunteer(&mut self, volunteer: &Volunteer) {
        let style = self.volunteer_style(&volunteer.name, volunteer.status, volunteer.assigned_incident);
        match self.volunteers.get_mut(&volunteer.id) {
            Some(marker) => {
                marker.status = volunteer.status;
                marker.assigned = volunteer.assigned_incident;
                if marker.position != volunteer.current_position {
                    marker.position = volunteer.current_position;
                    self.map.update_marker_position(marker.handle, marker.position);
                }
                if marker.style != style {
                    self.map.update_marker_style(marker.handle, &style);
                    marker.style = style;
                }
            }
            None => {
                let handle =
                    self.map.create_marker(MarkerKind::Volunteer, volunteer.current_position, &style);
                self.targets.insert(handle, MarkerTarget::Volunteer(volunteer.id));
                debug!(volunteer = %volunteer.id, %handle, "volunteer marker created");
                self.volunteers.insert(volunteer.id, VolunteerMarker {
                    handle,
                    position: volunteer.current_position,
                    style,
                    name:     volunteer.name.clone(),
                    status:   volunteer.status,
                    assigned: volunteer.assigned_incident,
                });
            }
        }
    }

    /// Move volunteer markers to positions the motion simulator drew.
    pub fn sync_positions(&mut self, moved: &[(VolunteerId, GeoPoint)]) {
        for &(id, position) in moved {
            let Some(marker) = self.volunteers.get_mut(&id) else {
                continue;
            };
            if marker.position != position {
                marker.position = position;
                self.map.update_marker_position(marker.handle, position);
            }
        }
    }

    // ── Urgency ───────────────────────────────────────────────────────────

    /// Move the urgency clock forward without refreshing.
    pub fn set_clock(&mut self, now: Timestamp) {
        self.clock = self.clock.max(now);
    }

    /// Recompute urgency for unresolved incidents when the refresh interval
    /// has elapsed.  Returns `true` if a refresh ran.
    pub fn refresh_urgency_if_due(&mut self, now: Timestamp) -> bool {
        self.set_clock(now);
        if now < self.next_refresh {
            return false;
        }
        let interval = self.settings.urgency_refresh.max(Duration::from_millis(1));
        while self.next_refresh <= now {
            self.next_refresh += interval;
        }
        let restyled = self.restyle();
        debug!(%now, restyled, "urgency refreshed");
        true
    }

    pub fn next_refresh(&self) -> Timestamp {
        self.next_refresh
    }

    // ── Hover ─────────────────────────────────────────────────────────────

    /// Hover an incident marker.  Returns `false` if it has no marker.
    pub fn hover(&mut self, incident: IncidentId) -> bool {
        if !self.incidents.contains_key(&incident) {
            return false;
        }
        self.hovered = Some(incident);
        self.restyle();
        true
    }

    /// Clear hover emphasis everywhere.
    pub fn unhover(&mut self) {
        if self.hovered.take().is_some() {
            self.restyle();
        }
    }

    pub fn hovered(&self) -> Option<IncidentId> {
        self.hovered
    }

    /// Route a pointer event.  Returns the clicked entity for `Click`.
    pub fn on_map_event(&mut self, event: MapEvent) -> Option<MarkerTarget> {
        match event {
            MapEvent::HoverStart(handle) => {
                if let Some(MarkerTarget::Incident(id)) = self.targets.get(&handle).copied() {
                    self.hover(id);
                }
                None
            }
            MapEvent::HoverEnd(handle) => {
                if let Some(MarkerTarget::Incident(id)) = self.targets.get(&handle).copied() {
                    if self.hovered == Some(id) {
                        self.unhover();
                    }
                }
                None
            }
            MapEvent::Click(handle) => self.targets.get(&handle).copied(),
        }
    }

    // ── Camera ────────────────────────────────────────────────────────────

    /// Fly to `point` at the focus zoom.
    pub fn focus(&mut self, point: GeoPoint) {
        self.map.fly_to(point, self.settings.focus_zoom, self.settings.focus_duration);
    }

    /// Frame a volunteer together with their assigned incident, or just the
    /// volunteer at overview zoom when unassigned.
    pub fn frame_assignment(&mut self, volunteer: VolunteerId) -> DcResult<()> {
        let marker = self
            .volunteers
            .get(&volunteer)
            .ok_or(DcError::VolunteerNotFound(volunteer))?;
        let target = marker.assigned.and_then(|id| self.incidents.get(&id)).map(|m| m.position);
        match target {
            Some(incident_at) => {
                let points = [marker.position, incident_at];
                self.map.fit_bounds(&points, self.settings.bounds_padding_px);
            }
            None => {
                let at = marker.position;
                self.map.fly_to(at, self.settings.overview_zoom, self.settings.focus_duration);
            }
        }
        Ok(())
    }

    // ── Teardown ──────────────────────────────────────────────────────────

    /// Destroy every marker.  Returns how many were destroyed.
    pub fn teardown(&mut self) -> usize {
        let handles: Vec<MarkerHandle> = self
            .incidents
            .values()
            .map(|m| m.handle)
            .chain(self.volunteers.values().map(|m| m.handle))
            .collect();
        for &handle in &handles {
            self.map.destroy_marker(handle);
        }
        self.incidents.clear();
        self.volunteers.clear();
        self.targets.clear();
        self.hovered = None;
        debug!(destroyed = handles.len(), "markers torn down");
        handles.len()
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn incident_marker(&self, id: IncidentId) -> Option<MarkerHandle> {
        self.incidents.get(&id).map(|m| m.handle)
    }

    pub fn volunteer_marker(&self, id: VolunteerId) -> Option<MarkerHandle> {
        self.volunteers.get(&id).map(|m| m.handle)
    }

    /// Last style sent for `handle`.
    pub fn style(&self, handle: MarkerHandle) -> Option<&MarkerStyle> {
        match self.targets.get(&handle)? {
            MarkerTarget::Incident(id) => self.incidents.get(id).map(|m| &m.style),
            MarkerTarget::Volunteer(id) => self.volunteers.get(id).map(|m| &m.style),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.incidents.len() + self.volunteers.len()
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Recompute every cached style and push the ones that changed.
    fn restyle(&mut self) -> usize {
        let mut changed = 0;

        let incident_styles: Vec<(IncidentId, MarkerStyle)> = self
            .incidents
            .iter()
            .map(|(&id, m)| (id, self.incident_style(id, &m.kind, m.severity, m.status, m.reported_at)))
            .collect();
        for (id, style) in incident_styles {
            if let Some(marker) = self.incidents.get_mut(&id) {
                if marker.style != style {
                    self.map.update_marker_style(marker.handle, &style);
                    marker.style = style;
                    changed += 1;
                }
            }
        }

        let volunteer_styles: Vec<(VolunteerId, MarkerStyle)> = self
            .volunteers
            .iter()
            .map(|(&id, m)| (id, self.volunteer_style(&m.name, m.status, m.assigned)))
            .collect();
        for (id, style) in volunteer_styles {
            if let Some(marker) = self.volunteers.get_mut(&id) {
                if marker.style != style {
                    self.map.update_marker_style(marker.handle, &style);
                    marker.style = style;
                    changed += 1;
                }
            }
        }
        changed
    }

    fn incident_style(
        &self,
        id:          IncidentId,
        kind:        &str,
        severity:    Severity,
        status:      IncidentStatus,
        reported_at: Timestamp,
    ) -> MarkerStyle {
        let (tone, urgency) = if status.is_resolved() {
            (Tone::Resolved, Urgency::RESOLVED)
        } else {
            let elapsed = self.clock.since(reported_at);
            (
                Tone::Severity(severity),
                Urgency::for_elapsed(severity, elapsed, self.settings.urgency_saturation),
            )
        };
        MarkerStyle {
            label:    kind.to_owned(),
            tone,
            emphasis: incident_emphasis(self.hovered, id),
            urgency:  Some(urgency),
        }
    }

    fn volunteer_style(
        &self,
        name:     &str,
        status:   VolunteerStatus,
        assigned: Option<IncidentId>,
    ) -> MarkerStyle {
        MarkerStyle {
            label:    name.to_owned(),
            tone:     Tone::Volunteer(status),
            emphasis: volunteer_emphasis(self.hovered, assigned),
            urgency:  None,
        }
    }

    fn destroy(&mut self, handle: MarkerHandle) {
        self.targets.remove(&handle);
        self.map.destroy_marker(handle);
    }
}
