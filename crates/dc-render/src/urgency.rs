//! Urgency pulse parameters for incident markers.
//!
//! With `f = min(elapsed / saturation, 1)` for an unresolved incident:
//!
//! | Parameter    | Value                                                        |
//! |--------------|--------------------------------------------------------------|
//! | `intensity`  | `1 + 1.5 f`                                                  |
//! | `scale`      | `1.1 + 0.2 f`                                                |
//! | `glow_px`    | `4 + 8 f`                                                    |
//! | `pulse_secs` | `max(0.8, 2 − 1.2 f)` Critical, `max(1.2, 2 − 0.6 f)` others |
//!
//! Resolved incidents stop pulsing and use [`Urgency::RESOLVED`].

use std::time::Duration;

use dc_store::Severity;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Urgency {
    /// Saturation fraction `f` in `[0, 1]`.
    pub level:      f64,
    pub intensity:  f64,
    pub scale:      f64,
    pub glow_px:    f64,
    pub pulse_secs: f64,
    pub resolved:   bool,
}

impl Urgency {
    pub const RESOLVED: Urgency = Urgency {
        level:      0.0,
        intensity:  1.0,
        scale:      1.1,
        glow_px:    4.0,
        pulse_secs: 2.0,
        resolved:   true,
    };

    /// Parameters for an unresolved incident open for `elapsed`.
    pub fn for_elapsed(severity: Severity, elapsed: Duration, saturation: Duration) -> Self {
        let f = if saturation.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / saturation.as_secs_f64()).min(1.0)
        };
        let pulse_secs = match severity {
            Severity::Critical => (2.0 - 1.2 * f).max(0.8),
            _ => (2.0 - 0.6 * f).max(1.2),
        };
        Self {
            level: f,
            intensity: 1.0 + 1.5 * f,
            scale: 1.1 + 0.2 * f,
            glow_px: 4.0 + 8.0 * f,
            pulse_secs,
            resolved: false,
        }
    }

    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.level >= 1.0
    }
}
