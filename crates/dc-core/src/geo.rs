//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Idle wander moves markers by
//! ~1e-4 degrees around a base at |lat| ≈ 40, which is below what `f32`
//! resolves cleanly once interpolation error accumulates.

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Straight-line interpolation in degree space.
    ///
    /// `t = 0` returns `self`, `t = 1` returns `to`.  `t` is not clamped;
    /// callers pass an eased progress value already in `[0, 1]`.
    #[inline]
    pub fn lerp(self, to: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (to.lat - self.lat) * t,
            lng: self.lng + (to.lng - self.lng) * t,
        }
    }

    /// Shift by a degree offset on each axis.
    #[inline]
    pub fn offset(self, d_lat: f64, d_lng: f64) -> GeoPoint {
        GeoPoint { lat: self.lat + d_lat, lng: self.lng + d_lng }
    }

    /// `true` when both components are finite numbers.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
