//! Incident and volunteer records plus their status enums.

use dc_core::{GeoPoint, IncidentId, Timestamp, VolunteerId};
use serde::{Deserialize, Serialize};

// ── Severity ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort weight; higher is more urgent.
    #[inline]
    pub fn weight(self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High     => 3,
            Severity::Medium   => 2,
            Severity::Low      => 1,
        }
    }

    /// Case-insensitive parse of the display name.
    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high"     => Some(Severity::High),
            "medium"   => Some(Severity::Medium),
            "low"      => Some(Severity::Low),
            _          => None,
        }
    }
}

// ── IncidentStatus ────────────────────────────────────────────────────────────

/// Position of an incident in the resolution pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncidentStatus {
    Reported,
    Verified,
    Assigned,
    InProgress,
    Resolved,
}

impl IncidentStatus {
    /// The pipeline in order.
    pub const PIPELINE: [IncidentStatus; 5] = [
        IncidentStatus::Reported,
        IncidentStatus::Verified,
        IncidentStatus::Assigned,
        IncidentStatus::InProgress,
        IncidentStatus::Resolved,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following step, or `None` at `Resolved`.
    #[inline]
    pub fn next(self) -> Option<IncidentStatus> {
        Self::PIPELINE.get(self.index() + 1).copied()
    }

    /// The preceding step, or `None` at `Reported`.
    #[inline]
    pub fn previous(self) -> Option<IncidentStatus> {
        self.index().checked_sub(1).map(|i| Self::PIPELINE[i])
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self == IncidentStatus::Resolved
    }
}

// ── VolunteerStatus ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolunteerStatus {
    /// Holding a task offer awaiting accept/decline.
    Pending,
    Standby,
    EnRoute,
    OnScene,
}

impl VolunteerStatus {
    /// Statuses that must carry an assigned incident.
    #[inline]
    pub fn is_deployed(self) -> bool {
        matches!(self, VolunteerStatus::EnRoute | VolunteerStatus::OnScene)
    }

    #[inline]
    pub fn is_idle(self) -> bool {
        !self.is_deployed()
    }
}

// ── Incident ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Incident {
    pub id:                  IncidentId,
    pub kind:                String,
    pub location:            String,
    pub summary:             String,
    pub severity:            Severity,
    pub coordinates:         GeoPoint,
    pub status:              IncidentStatus,
    /// Every volunteer that ever accepted this incident, in accept order.
    /// Declines do not remove entries.
    pub assigned_volunteers: Vec<VolunteerId>,
    pub reported_at:         Timestamp,
}

impl Incident {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.status.is_resolved()
    }
}

/// What a reporter submits.  The store fills in id, status and timestamps.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IncidentDraft {
    pub kind:        String,
    pub location:    String,
    #[serde(default)]
    pub summary:     String,
    /// Defaults to `High` when the reporter leaves it blank.
    #[serde(default)]
    pub severity:    Option<Severity>,
    /// Real coordinates always win over the synthesised fallback.
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl IncidentDraft {
    pub fn new(kind: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind:        kind.into(),
            location:    location.into(),
            summary:     String::new(),
            severity:    None,
            coordinates: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn at(mut self, coordinates: GeoPoint) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

// ── Volunteer ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HomeLocation {
    pub label:       String,
    pub coordinates: GeoPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Volunteer {
    pub id:                  VolunteerId,
    pub name:                String,
    pub role:                String,
    pub home:                HomeLocation,
    pub status:              VolunteerStatus,
    /// Set iff `status` is `EnRoute` or `OnScene`.
    pub assigned_incident:   Option<IncidentId>,
    /// Task suggested to a `Pending` volunteer; not an assignment.
    pub offered_incident:    Option<IncidentId>,
    /// Written only from motion simulator output.
    pub current_position:    GeoPoint,
}

impl Volunteer {
    /// The assignment invariant.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.assigned_incident.is_some() == self.status.is_deployed()
    }

    /// Whether this volunteer is assigned to `incident`.
    #[inline]
    pub fn serves(&self, incident: IncidentId) -> bool {
        self.assigned_incident == Some(incident)
    }
}

// ── Read models ───────────────────────────────────────────────────────────────

/// Counts for the command panel's overview card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IncidentOverview {
    /// Unresolved incidents.
    pub active:   usize,
    pub critical: usize,
    pub high:     usize,
    pub medium:   usize,
    pub low:      usize,
    pub resolved: usize,
}
