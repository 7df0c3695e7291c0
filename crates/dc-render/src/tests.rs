//! Unit tests for dc-render.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use dc_core::{DashboardConfig, DcError, GeoPoint, IncidentId, Timestamp, VolunteerId};
use dc_store::{
    ChangeSet, EntityStore, Incident, IncidentDraft, IncidentStatus, SeedData, Severity, Snapshot,
};

use crate::{
    Emphasis, MapCall, MapEvent, MarkerKind, MarkerRenderer, MarkerTarget, RecordingMap, Tone,
    Urgency,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const NOW: Timestamp = Timestamp(1_700_000_000_000);

const SARAH: VolunteerId = VolunteerId(1);
const EMILY: VolunteerId = VolunteerId(4);
const CARDIAC: IncidentId = IncidentId(1);
const FIRE: IncidentId = IncidentId(2);
const CRASH: IncidentId = IncidentId(3);

type Renderer = Rc<RefCell<MarkerRenderer<RecordingMap>>>;

fn harness() -> (EntityStore, Renderer) {
    let config = DashboardConfig::default();
    let mut store = EntityStore::new(&config);
    SeedData::demo().apply(&mut store, NOW).unwrap();

    let renderer = Rc::new(RefCell::new(MarkerRenderer::new(&config, RecordingMap::new(), NOW)));
    let sink = Rc::clone(&renderer);
    store.subscribe(move |snapshot| sink.borrow_mut().reconcile(snapshot));
    store.publish();
    (store, renderer)
}

fn at(ms: i64) -> Timestamp {
    Timestamp(NOW.0 + ms)
}

fn take_calls(renderer: &Renderer) -> Vec<MapCall> {
    renderer.borrow_mut().map_mut().take_calls()
}

fn incident_emphasis(renderer: &Renderer, id: IncidentId) -> Emphasis {
    let r = renderer.borrow();
    let handle = r.incident_marker(id).unwrap();
    r.map().marker(handle).unwrap().style.emphasis
}

fn volunteer_emphasis(renderer: &Renderer, id: VolunteerId) -> Emphasis {
    let r = renderer.borrow();
    let handle = r.volunteer_marker(id).unwrap();
    r.map().marker(handle).unwrap().style.emphasis
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Urgency ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod urgency {
    use super::*;

    const SAT: Duration = Duration::from_secs(30 * 60);

    #[test]
    fn fresh_incident_is_at_baseline_pulse() {
        let u = Urgency::for_elapsed(Severity::High, Duration::ZERO, SAT);
        assert!(approx(u.intensity, 1.0));
        assert!(approx(u.scale, 1.1));
        assert!(approx(u.glow_px, 4.0));
        assert!(approx(u.pulse_secs, 2.0));
        assert!(!u.resolved);
    }

    #[test]
    fn halfway_values() {
        let u = Urgency::for_elapsed(Severity::Medium, Duration::from_secs(15 * 60), SAT);
        assert!(approx(u.level, 0.5));
        assert!(approx(u.intensity, 1.75));
        assert!(approx(u.scale, 1.2));
        assert!(approx(u.glow_px, 8.0));
        assert!(approx(u.pulse_secs, 1.7));
    }

    #[test]
    fn saturates_at_thirty_minutes() {
        let at_cap = Urgency::for_elapsed(Severity::Critical, SAT, SAT);
        let beyond = Urgency::for_elapsed(Severity::Critical, SAT * 4, SAT);
        assert_eq!(at_cap, beyond);
        assert!(at_cap.is_saturated());
        assert!(approx(at_cap.intensity, 2.5));
        assert!(approx(at_cap.glow_px, 12.0));
        assert!(approx(at_cap.pulse_secs, 0.8));
    }

    #[test]
    fn non_critical_pulse_floor() {
        let u = Urgency::for_elapsed(Severity::Low, SAT, SAT);
        assert!(approx(u.pulse_secs, 1.4));
        assert!(u.pulse_secs >= 1.2);
    }

    #[test]
    fn urgency_never_decreases_with_time() {
        let mut last = Urgency::for_elapsed(Severity::Critical, Duration::ZERO, SAT);
        for minute in 1..=40 {
            let u = Urgency::for_elapsed(Severity::Critical, Duration::from_secs(minute * 60), SAT);
            assert!(u.intensity >= last.intensity);
            assert!(u.pulse_secs <= last.pulse_secs);
            last = u;
        }
    }
}

// ── Reconcile ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reconcile {
    use super::*;

    #[test]
    fn publish_creates_one_marker_per_entity() {
        let (store, renderer) = harness();
        let r = renderer.borrow();
        assert_eq!(r.marker_count(), 7);
        assert_eq!(r.map().live_of_kind(MarkerKind::Incident), 3);
        assert_eq!(r.map().live_of_kind(MarkerKind::Volunteer), 4);

        let handle = r.volunteer_marker(SARAH).unwrap();
        let home = store.volunteer(SARAH).unwrap().current_position;
        assert_eq!(r.map().marker(handle).unwrap().position, home);
    }

    #[test]
    fn report_adds_a_marker_without_recreating_others() {
        let (mut store, renderer) = harness();
        take_calls(&renderer);
        let incident = store.report_incident(IncidentDraft::new("Fire Alert", "456 Oak Ave"), NOW).unwrap();

        let calls = take_calls(&renderer);
        let creates = calls.iter().filter(|c| matches!(c, MapCall::Create { .. })).count();
        assert_eq!(creates, 1);
        assert!(!calls.iter().any(|c| matches!(c, MapCall::Destroy { .. })));
        assert!(renderer.borrow().incident_marker(incident.id).is_some());
    }

    #[test]
    fn status_change_restyles_in_place() {
        let (mut store, renderer) = harness();
        let handle = renderer.borrow().incident_marker(CARDIAC).unwrap();
        take_calls(&renderer);

        store.set_incident_status(CARDIAC, IncidentStatus::Resolved).unwrap();
        assert_eq!(take_calls(&renderer), vec![MapCall::Restyle { handle }]);
        let r = renderer.borrow();
        let style = &r.map().marker(handle).unwrap().style;
        assert_eq!(style.tone, Tone::Resolved);
        assert_eq!(style.urgency, Some(Urgency::RESOLVED));
    }

    #[test]
    fn unchanged_snapshot_sends_nothing() {
        let (mut store, renderer) = harness();
        take_calls(&renderer);
        store.publish();
        assert!(take_calls(&renderer).is_empty());
    }

    #[test]
    fn driven_positions_move_markers_in_place() {
        let (_store, renderer) = harness();
        let handle = renderer.borrow().volunteer_marker(EMILY).unwrap();
        take_calls(&renderer);

        let to = GeoPoint::new(40.7201, -74.0101);
        renderer.borrow_mut().sync_positions(&[(EMILY, to), (VolunteerId(99), to)]);
        renderer.borrow_mut().sync_positions(&[(EMILY, to)]);
        assert_eq!(take_calls(&renderer), vec![MapCall::Move { handle, at: to }]);
        assert_eq!(renderer.borrow().map().marker(handle).unwrap().position, to);
    }

    #[test]
    fn vanished_entities_lose_their_markers() {
        let (store, renderer) = harness();
        let handle = renderer.borrow().incident_marker(CRASH).unwrap();
        let incidents: Vec<Incident> =
            store.incidents().iter().filter(|i| i.id != CRASH).cloned().collect();
        let changed = ChangeSet::incident(CRASH);
        renderer.borrow_mut().reconcile(&Snapshot {
            incidents:  &incidents,
            volunteers: store.volunteers(),
            changed:    &changed,
        });
        let r = renderer.borrow();
        assert_eq!(r.incident_marker(CRASH), None);
        assert!(r.map().marker(handle).is_none());
        assert!(r.style(handle).is_none());
    }

    #[test]
    fn teardown_destroys_everything() {
        let (_store, renderer) = harness();
        assert_eq!(renderer.borrow_mut().teardown(), 7);
        let r = renderer.borrow();
        assert_eq!(r.map().live_count(), 0);
        assert_eq!(r.marker_count(), 0);
    }
}

// ── Urgency refresh ───────────────────────────────────────────────────────────

#[cfg(test)]
mod refresh {
    use super::*;

    #[test]
    fn refresh_runs_on_the_ten_second_cadence() {
        let (_store, renderer) = harness();
        let mut r = renderer.borrow_mut();
        assert!(!r.refresh_urgency_if_due(at(9_999)));
        assert!(r.refresh_urgency_if_due(at(10_000)));
        assert_eq!(r.next_refresh(), at(20_000));
        assert!(!r.refresh_urgency_if_due(at(15_000)));
        assert!(r.refresh_urgency_if_due(at(45_000)));
        assert_eq!(r.next_refresh(), at(50_000));
    }

    #[test]
    fn refresh_restyles_only_unresolved_incidents() {
        let (mut store, renderer) = harness();
        store.set_incident_status(CARDIAC, IncidentStatus::Resolved).unwrap();
        let resolved = renderer.borrow().incident_marker(CARDIAC).unwrap();
        take_calls(&renderer);

        assert!(renderer.borrow_mut().refresh_urgency_if_due(at(10_000)));
        let calls = take_calls(&renderer);
        assert_eq!(calls.len(), 2);
        assert!(!calls.contains(&MapCall::Restyle { handle: resolved }));
    }

    #[test]
    fn refreshed_urgency_tracks_elapsed_time() {
        let (_store, renderer) = harness();
        // Fire Alert was reported ten minutes before start.
        renderer.borrow_mut().refresh_urgency_if_due(at(5 * 60 * 1_000));
        let r = renderer.borrow();
        let handle = r.incident_marker(FIRE).unwrap();
        let urgency = r.map().marker(handle).unwrap().style.urgency.unwrap();
        assert!(approx(urgency.level, 0.5));
    }
}

// ── Hover ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod hover {
    use super::*;

    #[test]
    fn hover_highlights_dims_and_lights_responders() {
        let (mut store, renderer) = harness();
        store.assign_volunteer(SARAH, CARDIAC).unwrap();
        assert!(renderer.borrow_mut().hover(CARDIAC));

        assert_eq!(incident_emphasis(&renderer, CARDIAC), Emphasis::Highlighted);
        assert_eq!(incident_emphasis(&renderer, FIRE), Emphasis::Dimmed);
        assert_eq!(incident_emphasis(&renderer, CRASH), Emphasis::Dimmed);
        assert_eq!(volunteer_emphasis(&renderer, SARAH), Emphasis::Highlighted);
        assert_eq!(volunteer_emphasis(&renderer, EMILY), Emphasis::Normal);
    }

    #[test]
    fn unhover_reverses_everything() {
        let (mut store, renderer) = harness();
        store.assign_volunteer(SARAH, CARDIAC).unwrap();
        renderer.borrow_mut().hover(CARDIAC);
        renderer.borrow_mut().unhover();

        for id in [CARDIAC, FIRE, CRASH] {
            assert_eq!(incident_emphasis(&renderer, id), Emphasis::Normal);
        }
        for v in store.volunteers() {
            assert_eq!(volunteer_emphasis(&renderer, v.id), Emphasis::Normal);
        }
    }

    #[test]
    fn assignment_during_hover_lights_the_new_responder() {
        let (mut store, renderer) = harness();
        renderer.borrow_mut().hover(FIRE);
        assert_eq!(volunteer_emphasis(&renderer, EMILY), Emphasis::Normal);
        store.assign_volunteer(EMILY, FIRE).unwrap();
        assert_eq!(volunteer_emphasis(&renderer, EMILY), Emphasis::Highlighted);
        store.decline_volunteer(EMILY).unwrap();
        assert_eq!(volunteer_emphasis(&renderer, EMILY), Emphasis::Normal);
    }

    #[test]
    fn destroyed_mid_hover_leaves_no_residue() {
        let (mut store, renderer) = harness();
        store.assign_volunteer(SARAH, CARDIAC).unwrap();
        renderer.borrow_mut().hover(CARDIAC);

        let incidents: Vec<Incident> =
            store.incidents().iter().filter(|i| i.id != CARDIAC).cloned().collect();
        let changed = ChangeSet::incident(CARDIAC);
        renderer.borrow_mut().reconcile(&Snapshot {
            incidents:  &incidents,
            volunteers: store.volunteers(),
            changed:    &changed,
        });

        assert_eq!(renderer.borrow().hovered(), None);
        assert_eq!(incident_emphasis(&renderer, FIRE), Emphasis::Normal);
        assert_eq!(incident_emphasis(&renderer, CRASH), Emphasis::Normal);
        assert_eq!(volunteer_emphasis(&renderer, SARAH), Emphasis::Normal);
    }

    #[test]
    fn hover_unknown_incident_is_refused() {
        let (_store, renderer) = harness();
        assert!(!renderer.borrow_mut().hover(IncidentId(404)));
        assert_eq!(renderer.borrow().hovered(), None);
    }

    #[test]
    fn map_events_drive_hover_and_clicks() {
        let (_store, renderer) = harness();
        let (fire, emily) = {
            let r = renderer.borrow();
            (r.incident_marker(FIRE).unwrap(), r.volunteer_marker(EMILY).unwrap())
        };
        let mut r = renderer.borrow_mut();

        assert_eq!(r.on_map_event(MapEvent::HoverStart(fire)), None);
        assert_eq!(r.hovered(), Some(FIRE));
        // Hovering a volunteer marker does nothing.
        r.on_map_event(MapEvent::HoverStart(emily));
        assert_eq!(r.hovered(), Some(FIRE));
        r.on_map_event(MapEvent::HoverEnd(fire));
        assert_eq!(r.hovered(), None);

        assert_eq!(r.on_map_event(MapEvent::Click(emily)), Some(MarkerTarget::Volunteer(EMILY)));
        assert_eq!(r.on_map_event(MapEvent::Click(fire)), Some(MarkerTarget::Incident(FIRE)));
    }
}

// ── Camera ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod camera {
    use super::*;

    #[test]
    fn focus_flies_at_focus_zoom() {
        let (_store, renderer) = harness();
        take_calls(&renderer);
        let p = GeoPoint::new(40.75, -73.99);
        renderer.borrow_mut().focus(p);
        assert_eq!(
            take_calls(&renderer),
            vec![MapCall::FlyTo { at: p, zoom: 14.0, duration: Duration::from_millis(1_000) }]
        );
    }

    #[test]
    fn assigned_volunteer_is_framed_with_incident() {
        let (mut store, renderer) = harness();
        store.assign_volunteer(SARAH, FIRE).unwrap();
        take_calls(&renderer);
        renderer.borrow_mut().frame_assignment(SARAH).unwrap();

        let v = store.volunteer(SARAH).unwrap().current_position;
        let i = store.incident(FIRE).unwrap().coordinates;
        assert_eq!(
            take_calls(&renderer),
            vec![MapCall::FitBounds { points: vec![v, i], padding_px: 50 }]
        );
    }

    #[test]
    fn unassigned_volunteer_gets_overview() {
        let (store, renderer) = harness();
        take_calls(&renderer);
        renderer.borrow_mut().frame_assignment(EMILY).unwrap();
        let v = store.volunteer(EMILY).unwrap().current_position;
        assert_eq!(
            take_calls(&renderer),
            vec![MapCall::FlyTo { at: v, zoom: 13.0, duration: Duration::from_millis(1_000) }]
        );
    }

    #[test]
    fn unknown_volunteer_is_not_found() {
        let (_store, renderer) = harness();
        let err = renderer.borrow_mut().frame_assignment(VolunteerId(77)).unwrap_err();
        assert_eq!(err, DcError::VolunteerNotFound(VolunteerId(77)));
    }
}
