//! Seed data: the initial incidents and volunteer roster.
//!
//! # CSV formats
//!
//! Incidents, one row each, ids assigned in row order starting at 1:
//!
//! ```csv
//! kind,location,severity,lat,lng,summary,reported_minutes_ago
//! Medical Emergency,123 Main St,Critical,40.7128,-74.0060,Cardiac arrest reported.,5
//! ```
//!
//! `lat`/`lng` may be left empty to fall back to a jittered city-centre
//! coordinate.
//!
//! Roster, one row per volunteer:
//!
//! ```csv
//! volunteer_id,name,role,station,lat,lng,status,offered_incident
//! 1,Sarah Chen,Medical,Station 1,40.7200,-74.0100,pending,1
//! 4,Emily Davis,Medical,Station 1,40.7200,-74.0100,standby,
//! ```
//!
//! `status` is `pending` or `standby`; a roster cannot start deployed.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use dc_core::{GeoPoint, IncidentId, Timestamp, VolunteerId};
use serde::Deserialize;

use crate::{
    EntityStore, HomeLocation, IncidentDraft, SeedError, SeedResult, Severity, Volunteer,
    VolunteerStatus,
};

// ── Seed records ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct SeedIncident {
    pub draft:                IncidentDraft,
    pub reported_minutes_ago: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeedVolunteer {
    pub id:               VolunteerId,
    pub name:             String,
    pub role:             String,
    pub station:          String,
    pub home:             GeoPoint,
    pub status:           VolunteerStatus,
    /// Seed-order id of the incident offered to a pending volunteer.
    pub offered_incident: Option<IncidentId>,
}

/// Everything needed to populate a fresh [`EntityStore`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedData {
    pub incidents:  Vec<SeedIncident>,
    pub volunteers: Vec<SeedVolunteer>,
}

impl SeedData {
    /// Lower Manhattan demo: three open incidents and a four-person roster,
    /// three of whom hold a pending offer.
    pub fn demo() -> Self {
        let incident = |kind: &str, location: &str, severity, lat, lng, summary: &str, ago| SeedIncident {
            draft: IncidentDraft::new(kind, location)
                .summary(summary)
                .severity(severity)
                .at(GeoPoint::new(lat, lng)),
            reported_minutes_ago: ago,
        };
        let volunteer = |id, name: &str, role: &str, station: &str, lat, lng, status, offer: Option<u32>| SeedVolunteer {
            id:               VolunteerId(id),
            name:             name.into(),
            role:             role.into(),
            station:          station.into(),
            home:             GeoPoint::new(lat, lng),
            status,
            offered_incident: offer.map(IncidentId),
        };

        Self {
            incidents: vec![
                incident(
                    "Medical Emergency", "123 Main St", Severity::Critical, 40.7128, -74.0060,
                    "Cardiac arrest reported. Multiple units responding. ETA 3 minutes.", 5,
                ),
                incident(
                    "Fire Alert", "456 Oak Ave", Severity::High, 40.7580, -73.9855,
                    "Structure fire in commercial building. Fire department on scene.", 10,
                ),
                incident(
                    "Traffic Accident", "789 Pine Rd", Severity::Medium, 40.7505, -73.9934,
                    "Multi-vehicle collision. Minor injuries reported. Traffic control in effect.", 2,
                ),
            ],
            volunteers: vec![
                volunteer(1, "Sarah Chen", "Medical", "Station 1", 40.7200, -74.0100, VolunteerStatus::Pending, Some(1)),
                volunteer(2, "Michael Torres", "Fire", "Station 2", 40.7400, -73.9800, VolunteerStatus::Pending, Some(2)),
                volunteer(3, "James Wilson", "Traffic Control", "Station 3", 40.7300, -74.0000, VolunteerStatus::Pending, Some(3)),
                volunteer(4, "Emily Davis", "Medical", "Station 1", 40.7200, -74.0100, VolunteerStatus::Standby, None),
            ],
        }
    }

    /// Load both CSV files.
    pub fn from_csv(incidents: &Path, roster: &Path) -> SeedResult<Self> {
        let incidents = load_incidents_reader(std::fs::File::open(incidents)?)?;
        let volunteers = load_roster_reader(std::fs::File::open(roster)?)?;
        Ok(Self { incidents, volunteers })
    }

    /// Insert everything into `store` without notifying.
    ///
    /// Incidents get ids 1.. in seed order, so `offered_incident` must name
    /// one of them.  Call [`EntityStore::publish`] afterwards.
    pub fn apply(&self, store: &mut EntityStore, now: Timestamp) -> SeedResult<()> {
        let mut issued = Vec::with_capacity(self.incidents.len());
        for seed in &self.incidents {
            let ago = Duration::from_secs(seed.reported_minutes_ago.saturating_mul(60));
            issued.push(store.seed_incident(seed.draft.clone(), now.before(ago))?);
        }

        for seed in &self.volunteers {
            if let Some(offer) = seed.offered_incident {
                if !issued.contains(&offer) {
                    return Err(SeedError::Invalid(format!(
                        "{} is offered unknown {offer}",
                        seed.id
                    )));
                }
            }
            store.add_volunteer(Volunteer {
                id:                seed.id,
                name:              seed.name.clone(),
                role:              seed.role.clone(),
                home:              HomeLocation { label: seed.station.clone(), coordinates: seed.home },
                status:            seed.status,
                assigned_incident: None,
                offered_incident:  seed.offered_incident,
                current_position:  seed.home,
            })?;
        }
        Ok(())
    }
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IncidentRecord {
    kind:                 String,
    location:             String,
    severity:             String,
    lat:                  Option<f64>,
    lng:                  Option<f64>,
    #[serde(default)]
    summary:              String,
    #[serde(default)]
    reported_minutes_ago: u64,
}

#[derive(Deserialize)]
struct RosterRecord {
    volunteer_id:     u32,
    name:             String,
    role:             String,
    station:          String,
    lat:              f64,
    lng:              f64,
    status:           String,
    offered_incident: Option<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse seed incidents from any `Read` source.
pub fn load_incidents_reader<R: Read>(reader: R) -> SeedResult<Vec<SeedIncident>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();

    for result in csv_reader.deserialize::<IncidentRecord>() {
        let row = result.map_err(|e| SeedError::Parse(e.to_string()))?;
        let severity = Severity::parse(&row.severity).ok_or_else(|| {
            SeedError::Parse(format!("invalid severity {:?}", row.severity))
        })?;
        let coordinates = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            (None, None) => None,
            _ => {
                return Err(SeedError::Parse(format!(
                    "incident {:?} has only one of lat/lng",
                    row.location
                )));
            }
        };
        out.push(SeedIncident {
            draft: IncidentDraft {
                kind:     row.kind,
                location: row.location,
                summary:  row.summary,
                severity: Some(severity),
                coordinates,
            },
            reported_minutes_ago: row.reported_minutes_ago,
        });
    }
    Ok(out)
}

/// Parse the volunteer roster from any `Read` source.
pub fn load_roster_reader<R: Read>(reader: R) -> SeedResult<Vec<SeedVolunteer>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();

    for result in csv_reader.deserialize::<RosterRecord>() {
        let row = result.map_err(|e| SeedError::Parse(e.to_string()))?;
        let status = parse_roster_status(&row.status)?;
        if status == VolunteerStatus::Standby && row.offered_incident.is_some() {
            return Err(SeedError::Parse(format!(
                "volunteer {} is on standby but holds an offer",
                row.volunteer_id
            )));
        }
        out.push(SeedVolunteer {
            id:               VolunteerId(row.volunteer_id),
            name:             row.name,
            role:             row.role,
            station:          row.station,
            home:             GeoPoint::new(row.lat, row.lng),
            status,
            offered_incident: row.offered_incident.map(IncidentId),
        });
    }
    Ok(out)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_roster_status(s: &str) -> SeedResult<VolunteerStatus> {
    match s.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(VolunteerStatus::Pending),
        "standby" => Ok(VolunteerStatus::Standby),
        other => Err(SeedError::Parse(format!(
            "invalid roster status {other:?}: expected \"pending\" or \"standby\""
        ))),
    }
}
