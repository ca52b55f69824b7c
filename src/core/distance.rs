use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Web-mercator tile edge in pixels
pub const TILE_SIZE_PX: f64 = 256.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// Cheap pre-filter before Haversine.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Screen pixels per degree of longitude at a zoom level
#[inline]
pub fn pixels_per_degree(zoom: f64) -> f64 {
    TILE_SIZE_PX * 2f64.powf(zoom) / 360.0
}

/// Approximate on-screen distance in pixels between two points.
///
/// Latitude is stretched by 1/cos(lat) under web-mercator; the local
/// stretch at the midpoint is close enough for nearby markers.
pub fn pixel_distance(a: GeoPoint, b: GeoPoint, zoom: f64) -> f64 {
    let mid_lat = ((a.latitude + b.latitude) / 2.0).to_radians();
    let stretch = mid_lat.cos().abs().max(1e-6);

    let dx = b.longitude - a.longitude;
    let dy = (b.latitude - a.latitude) / stretch;

    (dx * dx + dy * dy).sqrt() * pixels_per_degree(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(40.7128, -74.0060, 5.0);

        assert!(bbox.contains(GeoPoint::new(40.7128, -74.0060)));
        assert!(!bbox.contains(GeoPoint::new(40.80, -74.0060)));

        // 10km / 111km per degree ≈ 0.09 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.09).abs() < 0.01, "Lat span should be ~0.09 degrees");
    }

    #[test]
    fn test_pixel_distance_doubles_per_zoom_level() {
        let a = GeoPoint::new(40.7128, -74.0060);
        let b = GeoPoint::new(40.7128, -74.0050);

        let z14 = pixel_distance(a, b, 14.0);
        let z15 = pixel_distance(a, b, 15.0);

        assert!((z15 / z14 - 2.0).abs() < 1e-9);
        // 0.001° of longitude at zoom 14 ≈ 11.65px
        assert!((z14 - 11.65).abs() < 0.1, "got {}", z14);
    }
}
