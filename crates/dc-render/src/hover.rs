//! Hover emphasis rules.
//!
//! While an incident is hovered its marker is highlighted, every other
//! incident marker is dimmed and volunteers assigned to it are highlighted.
//! With nothing hovered everything is `Normal`.  Emphasis is always derived
//! from the current hover target, never toggled, so un-hovering (or the
//! hovered marker disappearing) leaves nothing behind.

use dc_core::IncidentId;

use crate::Emphasis;

pub fn incident_emphasis(hovered: Option<IncidentId>, incident: IncidentId) -> Emphasis {
    match hovered {
        None => Emphasis::Normal,
        Some(h) if h == incident => Emphasis::Highlighted,
        Some(_) => Emphasis::Dimmed,
    }
}

pub fn volunteer_emphasis(hovered: Option<IncidentId>, assigned: Option<IncidentId>) -> Emphasis {
    match (hovered, assigned) {
        (Some(h), Some(a)) if h == a => Emphasis::Highlighted,
        _ => Emphasis::Normal,
    }
}
