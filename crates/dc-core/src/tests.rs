//! Unit tests for dc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{IncidentId, MarkerHandle, VolunteerId};

    #[test]
    fn next_is_monotonic() {
        assert_eq!(IncidentId(1).next(), IncidentId(2));
        assert!(VolunteerId(3) < VolunteerId(3).next());
    }

    #[test]
    fn next_saturates_instead_of_wrapping() {
        assert_eq!(IncidentId(u32::MAX).next(), IncidentId(u32::MAX));
    }

    #[test]
    fn checked_next_stops_at_the_end() {
        assert_eq!(IncidentId(1).checked_next(), Some(IncidentId(2)));
        assert_eq!(IncidentId(u32::MAX).checked_next(), None);
    }

    #[test]
    fn display() {
        assert_eq!(IncidentId(7).to_string(), "incident#7");
        assert_eq!(VolunteerId(2).to_string(), "volunteer#2");
        assert_eq!(MarkerHandle(9).to_string(), "marker#9");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn offset_shifts_each_axis() {
        let p = GeoPoint::new(40.72, -74.01).offset(0.0001, -0.0002);
        assert!((p.lat - 40.7201).abs() < 1e-12);
        assert!((p.lng + 74.0102).abs() < 1e-12);
    }

    #[test]
    fn non_finite_detected() {
        assert!(GeoPoint::new(40.0, -74.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_finite());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(2.0, -4.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), GeoPoint::new(1.0, -2.0));
    }
}

#[cfg(test)]
mod time {
    use std::time::Duration;

    use crate::Timestamp;

    #[test]
    fn add_and_since() {
        let t0 = Timestamp(1_000);
        let t1 = t0 + Duration::from_millis(250);
        assert_eq!(t1, Timestamp(1_250));
        assert_eq!(t1.since(t0), Duration::from_millis(250));
    }

    #[test]
    fn since_is_zero_when_reversed() {
        assert_eq!(Timestamp(5).since(Timestamp(10)), Duration::ZERO);
    }

    #[test]
    fn before_subtracts() {
        let t = Timestamp(600_000).before(Duration::from_secs(5 * 60));
        assert_eq!(t, Timestamp(300_000));
    }
}

#[cfg(test)]
mod rng {
    use crate::{SimRng, VolunteerId, VolunteerRng};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = VolunteerRng::new(42, VolunteerId(1));
        let mut b = VolunteerRng::new(42, VolunteerId(1));
        for _ in 0..16 {
            assert_eq!(a.symmetric(1.0), b.symmetric(1.0));
        }
    }

    #[test]
    fn volunteers_get_independent_streams() {
        let mut a = VolunteerRng::new(42, VolunteerId(1));
        let mut b = VolunteerRng::new(42, VolunteerId(2));
        let xs: Vec<f64> = (0..8).map(|_| a.symmetric(1.0)).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.symmetric(1.0)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn symmetric_stays_in_band() {
        let mut rng = SimRng::new(7);
        for _ in 0..1_000 {
            let v = rng.symmetric(0.05);
            assert!((-0.05..=0.05).contains(&v));
        }
        assert_eq!(rng.symmetric(0.0), 0.0);
    }
}

#[cfg(test)]
mod config {
    use crate::{DashboardConfig, DcError};

    #[test]
    fn default_is_valid() {
        DashboardConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_travel_rejected() {
        let cfg = DashboardConfig { travel_duration_ms: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DcError::Config(_))));
    }

    #[test]
    fn inverted_rest_band_rejected() {
        let cfg = DashboardConfig {
            idle_rest_min_ms: 7_000,
            idle_rest_max_ms: 6_000,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn nan_radius_rejected() {
        let cfg = DashboardConfig { idle_radius_deg: f64::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod error {
    use crate::{DcError, IncidentId, VolunteerId};

    #[test]
    fn not_found_kinds() {
        assert!(DcError::IncidentNotFound(IncidentId(1)).is_not_found());
        assert!(DcError::VolunteerNotFound(VolunteerId(1)).is_not_found());
        assert!(!DcError::invalid(VolunteerId(1), "not pending").is_not_found());
        assert!(!DcError::IdsExhausted("incident").is_not_found());
    }

    #[test]
    fn messages() {
        assert_eq!(
            DcError::IncidentNotFound(IncidentId(4)).to_string(),
            "incident#4 not found"
        );
        assert_eq!(
            DcError::invalid(VolunteerId(2), "no assignment").to_string(),
            "invalid transition for volunteer#2: no assignment"
        );
    }
}
