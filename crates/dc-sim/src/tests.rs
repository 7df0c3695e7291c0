//! Integration tests for dc-sim.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use dc_core::{DashboardConfig, GeoPoint, IncidentId, MarkerHandle, Timestamp, VolunteerId};
use dc_dispatch::{Action, Outcome, Skip};
use dc_motion::{BehaviorKind, VirtualScheduler};
use dc_render::{MapBackend, MarkerKind, MarkerStyle, RecordingMap, Tone};
use dc_store::{IncidentDraft, IncidentStatus, SeedData, Severity, VolunteerStatus};

use crate::{
    Dashboard, DashboardBuilder, DashboardObserver, NoopObserver, ShutdownReport, SimError,
    load_config, parse_config,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SARAH:   VolunteerId = VolunteerId(1);
const MICHAEL: VolunteerId = VolunteerId(2);
const EMILY:   VolunteerId = VolunteerId(4);
const CARDIAC: IncidentId  = IncidentId(1);
const FIRE:    IncidentId  = IncidentId(2);

type Demo = Dashboard<VirtualScheduler, RecordingMap>;

fn demo() -> Demo {
    DashboardBuilder::with_virtual_clock(DashboardConfig::default(), RecordingMap::new())
        .seed(SeedData::demo())
        .build()
        .unwrap()
}

fn accept(dashboard: &mut Demo, volunteer: VolunteerId, incident: IncidentId) -> Outcome {
    dashboard.apply(Action::Accept { volunteer, incident }).unwrap()
}

/// Records everything the dashboard reports.
#[derive(Default)]
struct Recorder {
    arrivals:  Vec<(VolunteerId, IncidentId, Timestamp)>,
    refreshes: Vec<Timestamp>,
    steps:     usize,
    fired:     usize,
}

impl DashboardObserver for Recorder {
    fn on_arrival(&mut self, volunteer: VolunteerId, incident: IncidentId, at: Timestamp) {
        self.arrivals.push((volunteer, incident, at));
    }

    fn on_urgency_refresh(&mut self, at: Timestamp) {
        self.refreshes.push(at);
    }

    fn on_step_end(&mut self, _now: Timestamp, fired: usize) {
        self.steps += 1;
        self.fired += fired;
    }
}

/// Map backend that stays inspectable after the dashboard is dropped.
#[derive(Clone, Default)]
struct SharedMap(Rc<RefCell<RecordingMap>>);

impl MapBackend for SharedMap {
    fn create_marker(&mut self, kind: MarkerKind, at: GeoPoint, style: &MarkerStyle) -> MarkerHandle {
        self.0.borrow_mut().create_marker(kind, at, style)
    }

    fn update_marker_position(&mut self, handle: MarkerHandle, at: GeoPoint) {
        self.0.borrow_mut().update_marker_position(handle, at);
    }

    fn update_marker_style(&mut self, handle: MarkerHandle, style: &MarkerStyle) {
        self.0.borrow_mut().update_marker_style(handle, style);
    }

    fn destroy_marker(&mut self, handle: MarkerHandle) {
        self.0.borrow_mut().destroy_marker(handle);
    }

    fn fly_to(&mut self, at: GeoPoint, zoom: f64, duration: Duration) {
        self.0.borrow_mut().fly_to(at, zoom, duration);
    }

    fn fit_bounds(&mut self, points: &[GeoPoint], padding_px: u32) {
        self.0.borrow_mut().fit_bounds(points, padding_px);
    }
}

// ── DashboardBuilder ──────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn seeded_build_starts_motion_and_markers() {
        let dashboard = demo();
        assert_eq!(dashboard.store().incidents().len(), 3);
        assert_eq!(dashboard.store().volunteers().len(), 4);
        assert_eq!(dashboard.renderer().marker_count(), 7);
        assert_eq!(dashboard.renderer().map().live_of_kind(MarkerKind::Incident), 3);
        // Every seeded volunteer is idle and waiting on its first wander.
        assert_eq!(dashboard.live_tokens(), 4);
        assert_eq!(dashboard.store().subscriber_count(), 2);
    }

    #[test]
    fn clock_starts_at_configured_time() {
        let config = DashboardConfig { start_unix_ms: 5_000, ..DashboardConfig::default() };
        let dashboard = DashboardBuilder::with_virtual_clock(config, RecordingMap::new())
            .build()
            .unwrap();
        assert_eq!(dashboard.now(), Timestamp(5_000));
    }

    #[test]
    fn empty_build_has_nothing_to_animate() {
        let dashboard = DashboardBuilder::with_virtual_clock(DashboardConfig::default(), RecordingMap::new())
            .build()
            .unwrap();
        assert_eq!(dashboard.renderer().marker_count(), 0);
        assert_eq!(dashboard.live_tokens(), 0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = DashboardConfig { frame_interval_ms: 0, ..DashboardConfig::default() };
        let result = DashboardBuilder::with_virtual_clock(config, RecordingMap::new()).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn explicit_scheduler_accepted() {
        let config = DashboardConfig::default();
        let scheduler = VirtualScheduler::new(Timestamp(0), Duration::from_millis(20));
        let dashboard = DashboardBuilder::new(config, scheduler, RecordingMap::new())
            .seed(SeedData::demo())
            .build()
            .unwrap();
        assert_eq!(dashboard.motion().scheduler().frame_interval(), Duration::from_millis(20));
    }
}

// ── End-to-end dispatch ───────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch_tests {
    use super::*;

    #[test]
    fn accepted_volunteer_arrives_and_incident_goes_in_progress() {
        let mut dashboard = demo();
        let start = dashboard.now();
        assert_eq!(accept(&mut dashboard, SARAH, CARDIAC), Outcome::Applied);
        assert_eq!(dashboard.store().incident(CARDIAC).unwrap().status, IncidentStatus::Assigned);
        assert_eq!(dashboard.motion().behavior(SARAH), Some(BehaviorKind::Travel));

        let mut recorder = Recorder::default();
        dashboard.advance(Duration::from_millis(3_100), &mut recorder).unwrap();

        let sarah = dashboard.store().volunteer(SARAH).unwrap();
        assert_eq!(sarah.status, VolunteerStatus::OnScene);
        assert_eq!(dashboard.store().incident(CARDIAC).unwrap().status, IncidentStatus::InProgress);
        assert_eq!(recorder.arrivals.len(), 1);
        let (who, what, at) = recorder.arrivals[0];
        assert_eq!((who, what), (SARAH, CARDIAC));
        assert!(at.since(start) >= Duration::from_millis(3_000));
        assert_eq!(dashboard.motion().behavior(SARAH), Some(BehaviorKind::Settled));
        assert!(!dashboard.is_animating(SARAH));
    }

    #[test]
    fn arrival_not_reported_before_travel_time() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        let mut recorder = Recorder::default();
        dashboard.advance(Duration::from_millis(2_000), &mut recorder).unwrap();
        assert!(recorder.arrivals.is_empty());
        assert_eq!(dashboard.store().volunteer(SARAH).unwrap().status, VolunteerStatus::EnRoute);
    }

    #[test]
    fn two_volunteers_arrive_independently() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        dashboard.advance(Duration::from_millis(1_000), &mut NoopObserver).unwrap();
        accept(&mut dashboard, MICHAEL, FIRE);

        let mut recorder = Recorder::default();
        dashboard.advance(Duration::from_millis(2_500), &mut recorder).unwrap();
        assert_eq!(recorder.arrivals.len(), 1);
        assert_eq!(recorder.arrivals[0].0, SARAH);

        dashboard.advance(Duration::from_millis(1_000), &mut recorder).unwrap();
        assert_eq!(recorder.arrivals.len(), 2);
        assert_eq!(recorder.arrivals[1].0, MICHAEL);
        assert_eq!(dashboard.store().incident(FIRE).unwrap().status, IncidentStatus::InProgress);
    }

    #[test]
    fn complete_resolves_incident_and_restarts_idle() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        dashboard.advance(Duration::from_millis(3_100), &mut NoopObserver).unwrap();

        let outcome = dashboard.apply(Action::Complete { volunteer: SARAH }).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(dashboard.store().incident(CARDIAC).unwrap().status, IncidentStatus::Resolved);

        let sarah = dashboard.store().volunteer(SARAH).unwrap();
        assert_eq!(sarah.status, VolunteerStatus::Standby);
        assert_eq!(sarah.assigned_incident, None);
        assert_eq!(dashboard.motion().behavior(SARAH), Some(BehaviorKind::Idle));
        assert!(dashboard.is_animating(SARAH));

        let renderer = dashboard.renderer();
        let handle = renderer.incident_marker(CARDIAC).unwrap();
        assert_eq!(renderer.style(handle).unwrap().tone, Tone::Resolved);
    }

    #[test]
    fn assign_then_decline_round_trip() {
        let mut dashboard = demo();
        let offered = dashboard
            .apply(Action::Assign { volunteer: EMILY, incident: FIRE })
            .unwrap();
        assert_eq!(offered, Outcome::Applied);
        let emily = dashboard.store().volunteer(EMILY).unwrap();
        assert_eq!(emily.status, VolunteerStatus::Pending);
        assert_eq!(emily.offered_incident, Some(FIRE));

        dashboard.apply(Action::Decline { volunteer: EMILY }).unwrap();
        let emily = dashboard.store().volunteer(EMILY).unwrap();
        assert_eq!(emily.status, VolunteerStatus::Standby);
        assert_eq!(emily.offered_incident, None);
        assert_eq!(dashboard.motion().scheduler().pending_for(EMILY), 1);
        assert_eq!(dashboard.live_tokens(), 4);
    }

    #[test]
    fn late_arrival_is_stale_noop() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        let outcome = dashboard
            .apply(Action::Arrive { volunteer: SARAH, incident: FIRE })
            .unwrap();
        assert_eq!(outcome, Outcome::NoOp(Skip::StaleArrival));
    }

    #[test]
    fn unknown_ids_surface_as_domain_errors() {
        let mut dashboard = demo();
        let err = dashboard
            .apply(Action::Accept { volunteer: VolunteerId(99), incident: CARDIAC })
            .unwrap_err();
        assert!(matches!(err, SimError::Domain(e) if e.is_not_found()));
        assert!(matches!(dashboard.focus_incident(IncidentId(99)), Err(SimError::Domain(_))));
    }

    #[test]
    fn report_adds_marker_at_reported_coordinates() {
        let mut dashboard = demo();
        let at = GeoPoint::new(40.7580, -73.9855);
        let draft = IncidentDraft::new("Fire Alert", "456 Oak Ave").severity(Severity::High).at(at);
        let id = dashboard.report(draft).unwrap();

        assert_eq!(id, IncidentId(4));
        assert_eq!(dashboard.store().incident(id).unwrap().reported_at, dashboard.now());
        let renderer = dashboard.renderer();
        let handle = renderer.incident_marker(id).unwrap();
        assert_eq!(renderer.map().marker(handle).unwrap().position, at);
    }
}

// ── Positions and time ────────────────────────────────────────────────────────

#[cfg(test)]
mod motion_tests {
    use super::*;

    #[test]
    fn positions_mirrored_to_store_and_map() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        dashboard.advance(Duration::from_millis(1_500), &mut NoopObserver).unwrap();

        let drawn = dashboard.motion().position(SARAH).unwrap();
        assert_eq!(dashboard.volunteer_position(SARAH).unwrap(), drawn);
        let renderer = dashboard.renderer();
        let handle = renderer.volunteer_marker(SARAH).unwrap();
        assert_eq!(renderer.map().marker(handle).unwrap().position, drawn);

        drop(renderer);
        dashboard.advance(Duration::from_millis(2_000), &mut NoopObserver).unwrap();
        let target = dashboard.store().incident(CARDIAC).unwrap().coordinates;
        assert_eq!(dashboard.volunteer_position(SARAH).unwrap(), target);
    }

    #[test]
    fn idle_volunteers_wander_near_home() {
        let mut dashboard = demo();
        let home = dashboard.store().volunteer(EMILY).unwrap().home.coordinates;
        dashboard.advance(Duration::from_secs(20), &mut NoopObserver).unwrap();

        let now_at = dashboard.volunteer_position(EMILY).unwrap();
        assert_ne!(now_at, home);
        assert!((now_at.lat - home.lat).abs() < 0.001 && (now_at.lng - home.lng).abs() < 0.001);
    }

    #[test]
    fn urgency_refreshes_on_interval() {
        let mut dashboard = demo();
        let mut recorder = Recorder::default();
        for _ in 0..35 {
            dashboard.advance(Duration::from_secs(1), &mut recorder).unwrap();
        }
        assert_eq!(recorder.refreshes.len(), 3);
        assert_eq!(recorder.steps, 35);
        assert!(recorder.fired > 0);
    }

    #[test]
    fn advance_moves_clock_even_when_idle() {
        let mut dashboard = DashboardBuilder::with_virtual_clock(DashboardConfig::default(), RecordingMap::new())
            .build()
            .unwrap();
        let start = dashboard.now();
        let fired = dashboard.advance(Duration::from_secs(2), &mut NoopObserver).unwrap();
        assert_eq!(fired, 0);
        assert_eq!(dashboard.now().since(start), Duration::from_secs(2));
    }

    #[test]
    fn churn_never_stacks_callbacks() {
        let mut dashboard = demo();
        for round in 0..20 {
            dashboard
                .apply(Action::Assign { volunteer: EMILY, incident: FIRE })
                .unwrap();
            dashboard.advance(Duration::from_millis(37 * (round % 5 + 1)), &mut NoopObserver).unwrap();
            dashboard.apply(Action::Decline { volunteer: EMILY }).unwrap();
            dashboard.advance(Duration::from_millis(250), &mut NoopObserver).unwrap();

            let motion = dashboard.motion();
            for v in dashboard.store().volunteers() {
                assert!(motion.scheduler().pending_for(v.id) <= 1, "round {round}: {} stacked", v.id);
            }
        }
    }
}

// ── Camera and hover ──────────────────────────────────────────────────────────

#[cfg(test)]
mod view_tests {
    use super::*;
    use dc_render::{Emphasis, MapCall, MapEvent, MarkerTarget};

    #[test]
    fn focus_flies_to_entity() {
        let mut dashboard = demo();
        dashboard.focus_incident(FIRE).unwrap();
        let at = dashboard.store().incident(FIRE).unwrap().coordinates;
        let last = dashboard.renderer().map().calls().last().cloned();
        assert!(matches!(last, Some(MapCall::FlyTo { at: a, .. }) if a == at));
    }

    #[test]
    fn frame_assignment_fits_both_points() {
        let mut dashboard = demo();
        accept(&mut dashboard, MICHAEL, FIRE);
        dashboard.frame_assignment(MICHAEL).unwrap();
        let last = dashboard.renderer().map().calls().last().cloned();
        assert!(matches!(last, Some(MapCall::FitBounds { ref points, .. }) if points.len() == 2));
    }

    #[test]
    fn hover_emphasises_responders() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        assert!(dashboard.hover(CARDIAC));

        {
            let renderer = dashboard.renderer();
            let sarah = renderer.volunteer_marker(SARAH).unwrap();
            let emily = renderer.volunteer_marker(EMILY).unwrap();
            assert_eq!(renderer.style(sarah).unwrap().emphasis, Emphasis::Highlighted);
            assert_eq!(renderer.style(emily).unwrap().emphasis, Emphasis::Normal);
        }

        dashboard.unhover();
        let renderer = dashboard.renderer();
        let sarah = renderer.volunteer_marker(SARAH).unwrap();
        assert_eq!(renderer.style(sarah).unwrap().emphasis, Emphasis::Normal);
    }

    #[test]
    fn click_resolves_to_entity() {
        let mut dashboard = demo();
        let handle = dashboard.renderer().incident_marker(FIRE).unwrap();
        let target = dashboard.on_map_event(MapEvent::Click(handle));
        assert_eq!(target, Some(MarkerTarget::Incident(FIRE)));
    }
}

// ── Shutdown ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod shutdown_tests {
    use super::*;

    #[test]
    fn shutdown_releases_everything() {
        let mut dashboard = demo();
        let report = dashboard.shutdown();
        assert_eq!(report, ShutdownReport { cancelled: 4, destroyed: 7 });
        assert_eq!(dashboard.live_tokens(), 0);
        assert_eq!(dashboard.store().subscriber_count(), 0);
        assert_eq!(dashboard.renderer().map().live_count(), 0);
        assert!(dashboard.is_shut_down());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut dashboard = demo();
        dashboard.shutdown();
        assert_eq!(dashboard.shutdown(), ShutdownReport::default());
    }

    #[test]
    fn calls_after_shutdown_fail() {
        let mut dashboard = demo();
        dashboard.shutdown();
        let err = dashboard.apply(Action::Decline { volunteer: SARAH }).unwrap_err();
        assert!(matches!(err, SimError::ShutDown));
        assert!(matches!(
            dashboard.advance(Duration::from_secs(1), &mut NoopObserver),
            Err(SimError::ShutDown)
        ));
        assert!(!dashboard.hover(CARDIAC));
    }

    #[test]
    fn shutdown_mid_travel_cancels_arrival() {
        let mut dashboard = demo();
        accept(&mut dashboard, SARAH, CARDIAC);
        dashboard.advance(Duration::from_millis(1_000), &mut NoopObserver).unwrap();
        let report = dashboard.shutdown();
        assert_eq!(report.cancelled, 4);
        assert_eq!(dashboard.store().volunteer(SARAH).unwrap().status, VolunteerStatus::EnRoute);
    }

    #[test]
    fn drop_tears_down_markers() {
        let map = SharedMap::default();
        let probe = Rc::clone(&map.0);
        let dashboard = DashboardBuilder::with_virtual_clock(DashboardConfig::default(), map)
            .seed(SeedData::demo())
            .build()
            .unwrap();
        assert_eq!(probe.borrow().live_count(), 7);

        drop(dashboard);
        assert_eq!(probe.borrow().live_count(), 0);
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = parse_config("seed = 7\ntravel_duration_ms = 2500\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.travel_duration(), Duration::from_millis(2_500));
        assert_eq!(config.frame_interval_ms, DashboardConfig::default().frame_interval_ms);
    }

    #[test]
    fn nested_centre_parsed() {
        let config = parse_config("[default_center]\nlat = 51.5\nlng = -0.12\n").unwrap();
        assert_eq!(config.default_center, GeoPoint::new(51.5, -0.12));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(parse_config("seed = "), Err(SimError::Toml(_))));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(parse_config("frame_interval_ms = 0"), Err(SimError::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 99").unwrap();
        writeln!(file, "urgency_refresh_ms = 5000").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.urgency_refresh_ms, 5_000);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(SimError::Io(_))));
    }
}
