//! Great-circle distance.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A position in decimal degrees. South and west are negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub lat: f64,
    pub lon: f64,
}

/// Haversine distance between two fixes, in km.
pub fn haversine_km(a: Fix, b: Fix) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = Fix { lat: 60.79, lon: 10.69 };
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Fix { lat: 0.0, lon: 0.0 };
        let b = Fix { lat: 1.0, lon: 0.0 };
        // 2πR / 360
        assert!((haversine_km(a, b) - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_symmetric() {
        let oslo = Fix { lat: 59.91, lon: 10.75 };
        let gjovik = Fix { lat: 60.79, lon: 10.69 };
        let d = haversine_km(oslo, gjovik);
        assert!((d - haversine_km(gjovik, oslo)).abs() < 1e-9);
        assert!(d > 95.0 && d < 100.0);
    }
}
