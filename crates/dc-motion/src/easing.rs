//! Ease-in-out curve shared by idle wander and directed travel.

/// Quadratic ease-in-out.
///
/// `p` is elapsed/duration and is clamped to `[0, 1]` first, so the curve
/// always starts at 0, ends at 1 and passes 0.5 at the midpoint.
#[inline]
pub fn ease_in_out(p: f64) -> f64 {
    if p.is_nan() {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        2.0 * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(2) / 2.0
    }
}
