use crate::constants::EARTH_RADIUS_M;

/// Great-circle distance in meters between two `(lat, lon)` points (haversine)
pub fn surface_distance_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Arithmetic midpoint of two coordinates
pub fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(surface_distance_m((42.6977, 23.3219), (42.6977, 23.3219)), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // ~111.2 km along a meridian
        let d = surface_distance_m((0.0, 0.0), (1.0, 0.0));
        assert!((d - 111_195.08).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_short_distance_is_symmetric() {
        let a = (42.0, 24.0);
        let b = (42.0001, 24.0001);
        let ab = surface_distance_m(a, b);
        let ba = surface_distance_m(b, a);
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 10.0 && ab < 20.0, "got {ab}");
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint((42.0, 24.0), (43.0, 25.0)), (42.5, 24.5));
    }
}
