//! The `MapBackend` trait implemented by map/tile libraries.

use std::time::Duration;

use dc_core::{GeoPoint, IncidentId, MarkerHandle, VolunteerId};
use dc_store::{Severity, VolunteerStatus};

use crate::Urgency;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Incident,
    Volunteer,
}

/// Hover emphasis applied to a marker.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Emphasis {
    #[default]
    Normal,
    Highlighted,
    Dimmed,
}

/// Colour family of a marker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tone {
    Severity(Severity),
    Resolved,
    Volunteer(VolunteerStatus),
}

/// Everything about a marker's look that the adapter controls.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub label:    String,
    pub tone:     Tone,
    pub emphasis: Emphasis,
    /// Pulse parameters.  Incident markers only.
    pub urgency:  Option<Urgency>,
}

/// Which entity a marker stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerTarget {
    Incident(IncidentId),
    Volunteer(VolunteerId),
}

/// Pointer events the map delivers per marker handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapEvent {
    HoverStart(MarkerHandle),
    HoverEnd(MarkerHandle),
    Click(MarkerHandle),
}

/// Operations the adapter needs from the map library.
///
/// Calls are fire-and-forget: a map that cannot honour one logs it itself.
/// Handles are issued by the backend and never reused while live.
pub trait MapBackend {
    fn create_marker(&mut self, kind: MarkerKind, at: GeoPoint, style: &MarkerStyle) -> MarkerHandle;

    fn update_marker_position(&mut self, handle: MarkerHandle, at: GeoPoint);

    fn update_marker_style(&mut self, handle: MarkerHandle, style: &MarkerStyle);

    fn destroy_marker(&mut self, handle: MarkerHandle);

    /// Smooth camera move to `at`.
    fn fly_to(&mut self, at: GeoPoint, zoom: f64, duration: Duration);

    /// Fit the camera so every point is visible.
    fn fit_bounds(&mut self, points: &[GeoPoint], padding_px: u32);
}
