use crate::models::GeoPoint;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers.
#[inline]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two users, `None` when either has no location set.
#[inline]
pub fn distance_between(a: Option<GeoPoint>, b: Option<GeoPoint>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(haversine_km(a, b)),
        _ => None,
    }
}

/// Geospatial bounding box used as a storage-side prefilter.
///
/// The box circumscribes the search circle, so it only ever over-selects;
/// exact eligibility is always re-checked with [`haversine_km`].
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box around `center` covering at least `radius_km` in every direction.
    /// 1° latitude ≈ 111 km; 1° longitude ≈ 111 km * cos(latitude).
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let lat_delta = radius_km / 111.0;
        let lon_delta = radius_km / (111.0 * center.lat.to_radians().cos().abs().max(1e-6));

        Self {
            min_lat: center.lat - lat_delta,
            max_lat: center.lat + lat_delta,
            min_lon: center.lon - lon_delta,
            max_lon: center.lon + lon_delta,
        }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    #[test]
    fn haversine_london_to_paris() {
        // London to Paris is approximately 344 km
        let d = haversine_km(point(51.5074, -0.1278), point(48.8566, 2.3522));
        assert!((d - 344.0).abs() < 10.0, "expected ~344km, got {d}");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let nyc = point(40.7128, -74.0060);
        assert!(haversine_km(nyc, nyc) < 0.01);
    }

    #[test]
    fn distance_requires_both_locations() {
        let nyc = point(40.7128, -74.0060);
        assert!(distance_between(Some(nyc), None).is_none());
        assert!(distance_between(None, Some(nyc)).is_none());
        assert!(distance_between(Some(nyc), Some(nyc)).is_some());
    }

    #[test]
    fn bounding_box_circumscribes_radius() {
        let center = point(40.7128, -74.0060);
        let bbox = BoundingBox::around(center, 10.0);

        assert!(bbox.contains(center));
        assert!(bbox.contains(point(40.71, -74.0)));
        assert!(!bbox.contains(point(50.0, -80.0)));

        // 10km each way over ~111km per degree
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "lat span was {lat_span}");
    }
}
