//! Top-level dashboard configuration.
//!
//! Typically loaded from a TOML file by `dc-sim` and handed to the dashboard
//! builder.  Every field has a default, so a config file only names what it
//! overrides.

use std::time::Duration;

use crate::{DcError, DcResult, GeoPoint};

/// Tunables for the store, the motion simulator and the marker renderer.
///
/// Durations are stored as integer milliseconds so config files stay plain
/// numbers; the `*_duration()` accessors convert.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DashboardConfig {
    /// Master RNG seed.  The same seed replays identical jitter and wander.
    pub seed: u64,

    /// Unix milliseconds the virtual clock starts at.
    pub start_unix_ms: i64,

    /// City centre used to synthesise coordinates for reports without a fix.
    pub default_center: GeoPoint,

    /// Half-width of the fallback jitter box around `default_center`.
    pub jitter_deg: f64,

    /// Spacing of animation frames.
    pub frame_interval_ms: u64,

    /// Directed travel always takes this long, whatever the distance.
    pub travel_duration_ms: u64,

    /// Delay before the first wander step after entering idle.
    pub idle_initial_delay_ms: u64,

    /// Length of one wander ease.
    pub idle_ease_ms: u64,

    /// Rest band between wander steps; each rest is drawn uniformly from it.
    pub idle_rest_min_ms: u64,
    pub idle_rest_max_ms: u64,

    /// Per-axis wander radius around the settled base (≈10–20 m).
    pub idle_radius_deg: f64,

    /// Cadence of the urgency refresh for unresolved incident markers.
    pub urgency_refresh_ms: u64,

    /// Elapsed unresolved time at which urgency saturates.
    pub urgency_saturation_ms: u64,

    /// Camera parameters for selecting a unit.
    pub focus_zoom: f64,
    pub focus_duration_ms: u64,

    /// Zoom used when framing a volunteer with no assignment.
    pub overview_zoom: f64,

    /// Padding for `fit_bounds` when framing an assignment.
    pub bounds_padding_px: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            start_unix_ms:         1_700_000_000_000,
            default_center:        GeoPoint::new(40.7128, -74.0060),
            jitter_deg:            0.05,
            frame_interval_ms:     16,
            travel_duration_ms:    3_000,
            idle_initial_delay_ms: 1_500,
            idle_ease_ms:          2_000,
            idle_rest_min_ms:      4_000,
            idle_rest_max_ms:      6_000,
            idle_radius_deg:       0.0001,
            urgency_refresh_ms:    10_000,
            urgency_saturation_ms: 30 * 60 * 1_000,
            focus_zoom:            14.0,
            focus_duration_ms:     1_000,
            overview_zoom:         13.0,
            bounds_padding_px:     50,
        }
    }
}

impl DashboardConfig {
    /// Reject values that would stall or break the animation loops.
    pub fn validate(&self) -> DcResult<()> {
        let non_zero = [
            ("frame_interval_ms", self.frame_interval_ms),
            ("travel_duration_ms", self.travel_duration_ms),
            ("idle_ease_ms", self.idle_ease_ms),
            ("urgency_refresh_ms", self.urgency_refresh_ms),
            ("urgency_saturation_ms", self.urgency_saturation_ms),
        ];
        for (name, value) in non_zero {
            if value == 0 {
                return Err(DcError::Config(format!("{name} must be greater than zero")));
            }
        }
        if self.idle_rest_min_ms > self.idle_rest_max_ms {
            return Err(DcError::Config(format!(
                "idle rest band is inverted: min {} > max {}",
                self.idle_rest_min_ms, self.idle_rest_max_ms
            )));
        }
        if !(self.idle_radius_deg > 0.0) || !(self.jitter_deg > 0.0) {
            return Err(DcError::Config(
                "idle_radius_deg and jitter_deg must be positive".into(),
            ));
        }
        if !self.default_center.is_finite() {
            return Err(DcError::Config("default_center must be finite".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    #[inline]
    pub fn travel_duration(&self) -> Duration {
        Duration::from_millis(self.travel_duration_ms)
    }

    #[inline]
    pub fn idle_initial_delay(&self) -> Duration {
        Duration::from_millis(self.idle_initial_delay_ms)
    }

    #[inline]
    pub fn idle_ease_duration(&self) -> Duration {
        Duration::from_millis(self.idle_ease_ms)
    }

    #[inline]
    pub fn urgency_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.urgency_refresh_ms)
    }

    #[inline]
    pub fn urgency_saturation(&self) -> Duration {
        Duration::from_millis(self.urgency_saturation_ms)
    }
}
