//! nyc: scripted run of the dispatch dashboard over the Manhattan demo seed.
//!
//! Reports a new fire, sends two responders, lets them travel, stands one
//! down and prints the resulting board as JSON.  Reads `dashboard.toml` from
//! the working directory when present.  Set `RUST_LOG=debug` to follow every
//! transition.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dc_core::{DashboardConfig, GeoPoint, IncidentId, Timestamp, VolunteerId};
use dc_dispatch::Action;
use dc_render::{MapCall, RecordingMap};
use dc_sim::{DashboardBuilder, DashboardObserver, load_config};
use dc_store::{Incident, IncidentDraft, IncidentOverview, SeedData, Severity, Volunteer};

// ── Constants ─────────────────────────────────────────────────────────────────

const CONFIG_PATH: &str = "dashboard.toml";
const STEP:        Duration = Duration::from_millis(500);
const MAX_STEPS:   usize = 40;

const MICHAEL: VolunteerId = VolunteerId(2);
const EMILY:   VolunteerId = VolunteerId(4);

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ArrivalLog {
    arrivals:  Vec<(VolunteerId, IncidentId, Timestamp)>,
    refreshes: usize,
}

impl DashboardObserver for ArrivalLog {
    fn on_arrival(&mut self, volunteer: VolunteerId, incident: IncidentId, at: Timestamp) {
        println!("  {at}  {volunteer} on scene at {incident}");
        self.arrivals.push((volunteer, incident, at));
    }

    fn on_urgency_refresh(&mut self, _at: Timestamp) {
        self.refreshes += 1;
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Summary<'a> {
    elapsed_ms:  u64,
    overview:    IncidentOverview,
    incidents:   &'a [Incident],
    volunteers:  &'a [Volunteer],
    map_calls:   usize,
    refreshes:   usize,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = if Path::new(CONFIG_PATH).exists() {
        info!(path = CONFIG_PATH, "loading config");
        load_config(Path::new(CONFIG_PATH))?
    } else {
        DashboardConfig::default()
    };

    println!("=== nyc: dispatch dashboard ===");
    println!("Seed: {}  |  Travel: {:?}", config.seed, config.travel_duration());
    println!();

    // 1. Build over the demo roster.
    let mut dashboard = DashboardBuilder::with_virtual_clock(config, RecordingMap::new())
        .seed(SeedData::demo())
        .build()?;
    let start = dashboard.now();

    // 2. A citizen reports a second fire.
    let fire = dashboard.report(
        IncidentDraft::new("Fire Alert", "456 Oak Ave")
            .summary("Smoke visible from upper floors.")
            .severity(Severity::High)
            .at(GeoPoint::new(40.7580, -73.9855)),
    )?;
    println!("Reported {fire}");

    // 3. Two responders accept it.
    for volunteer in [MICHAEL, EMILY] {
        dashboard.apply(Action::Accept { volunteer, incident: fire })?;
        println!("  {volunteer} en route to {fire}");
    }
    dashboard.frame_assignment(MICHAEL)?;

    // 4. Let them travel.
    let mut log = ArrivalLog::default();
    for _ in 0..MAX_STEPS {
        dashboard.advance(STEP, &mut log)?;
        if log.arrivals.len() >= 2 {
            break;
        }
    }

    // 5. One stands down; the other keeps the incident in progress.
    dashboard.apply(Action::Complete { volunteer: EMILY })?;
    dashboard.advance(Duration::from_secs(5), &mut log)?;
    println!();

    let elapsed = dashboard.now().since(start);
    let map_calls = dashboard
        .renderer()
        .map()
        .calls()
        .iter()
        .filter(|c| !matches!(c, MapCall::Move { .. }))
        .count();

    let summary = Summary {
        elapsed_ms: u64::try_from(elapsed.as_millis())?,
        overview:   dashboard.store().overview(),
        incidents:  dashboard.store().incidents(),
        volunteers: dashboard.store().volunteers(),
        map_calls,
        refreshes:  log.refreshes,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let report = dashboard.shutdown();
    info!(cancelled = report.cancelled, destroyed = report.destroyed, "done");
    Ok(())
}
