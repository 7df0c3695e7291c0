//! Fluent builder for constructing a [`Dashboard`].

use std::cell::RefCell;
use std::rc::Rc;

use dc_core::{DashboardConfig, Timestamp};
use dc_motion::{MotionSimulator, Scheduler, VirtualScheduler};
use dc_render::{MapBackend, MarkerRenderer};
use dc_store::{EntityStore, SeedData};
use tracing::info;

use crate::{Dashboard, SimError, SimResult};

/// Fluent builder for [`Dashboard<S, M>`].
///
/// # Required inputs
///
/// - [`DashboardConfig`], validated in [`build`][Self::build]
/// - `S: Scheduler`, the clock and timer source for motion
/// - `M: MapBackend`, the map that receives marker calls
///
/// # Optional inputs
///
/// | Method      | Default              |
/// |-------------|----------------------|
/// | `.seed(d)`  | empty store          |
///
/// # Example
///
/// ```rust,ignore
/// let mut dashboard = DashboardBuilder::with_virtual_clock(config, RecordingMap::new())
///     .seed(SeedData::demo())
///     .build()?;
/// dashboard.advance(Duration::from_secs(5), &mut NoopObserver)?;
/// ```
pub struct DashboardBuilder<S: Scheduler + 'static, M: MapBackend + 'static> {
    config:    DashboardConfig,
    scheduler: S,
    map:       M,
    seed:      Option<SeedData>,
}

impl<S: Scheduler + 'static, M: MapBackend + 'static> DashboardBuilder<S, M> {
    pub fn new(config: DashboardConfig, scheduler: S, map: M) -> Self {
        Self { config, scheduler, map, seed: None }
    }

    /// Populate the store before the first notification.
    pub fn seed(mut self, seed: SeedData) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate inputs and assemble the dashboard.
    ///
    /// The seed is stamped with the scheduler's current time.  Motion and
    /// rendering are subscribed before the first publish, so every seeded
    /// volunteer starts its behavior and every entity gets a marker here.
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] if the config fails validation.
    /// - [`SimError::Seed`] if the seed data references unknown ids.
    pub fn build(self) -> SimResult<Dashboard<S, M>> {
        self.config
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;

        let now: Timestamp = self.scheduler.now();
        let mut store = EntityStore::new(&self.config);
        if let Some(seed) = &self.seed {
            seed.apply(&mut store, now)?;
        }

        let motion = Rc::new(RefCell::new(MotionSimulator::new(&self.config, self.scheduler)));
        let renderer = Rc::new(RefCell::new(MarkerRenderer::new(&self.config, self.map, now)));

        let sink = Rc::clone(&motion);
        let motion_sub = store.subscribe(move |snapshot| sink.borrow_mut().on_snapshot(snapshot));
        let sink = Rc::clone(&renderer);
        let render_sub = store.subscribe(move |snapshot| sink.borrow_mut().reconcile(snapshot));
        store.publish();

        info!(
            incidents  = store.incidents().len(),
            volunteers = store.volunteers().len(),
            %now,
            "dashboard ready"
        );

        Ok(Dashboard::assemble(
            self.config,
            store,
            motion,
            renderer,
            [motion_sub, render_sub],
        ))
    }
}

impl<M: MapBackend + 'static> DashboardBuilder<VirtualScheduler, M> {
    /// Builder over a [`VirtualScheduler`] starting at `config.start_unix_ms`.
    pub fn with_virtual_clock(config: DashboardConfig, map: M) -> Self {
        let scheduler = VirtualScheduler::new(Timestamp(config.start_unix_ms), config.frame_interval());
        Self::new(config, scheduler, map)
    }
}
