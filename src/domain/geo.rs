//! Great-circle distance helpers used for location proximity checks.
//!
//! Inputs are decimal degrees. Nothing here validates ranges: NaN or
//! out-of-range coordinates yield NaN (or meaningless) distances, which
//! compare false against any radius and therefore never match.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Anything positioned on the globe.
pub trait Coordinates {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

/// Haversine distance in kilometres between two points.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    c * EARTH_RADIUS_KM
}

/// Keep the candidates whose distance to the centre is at most `radius_km`.
pub fn find_within_radius<T, I>(
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
    candidates: I,
) -> Vec<T>
where
    T: Coordinates,
    I: IntoIterator<Item = T>,
{
    candidates
        .into_iter()
        .filter(|candidate| {
            distance_km(
                center_lat,
                center_lon,
                candidate.latitude(),
                candidate.longitude(),
            ) <= radius_km
        })
        .collect()
}

/// Axis-aligned box (degrees) that contains every point within `radius_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

/// Coarse pre-filter for [`find_within_radius`]. Near the poles, when the
/// radius reaches past one, or when the box would cross the antimeridian, it
/// widens to the full longitude range.
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_delta = angular.to_degrees();
    let ratio = angular.sin() / lat.to_radians().cos();
    let lon_delta = if ratio.is_nan() || ratio.abs() >= 1.0 {
        180.0
    } else {
        ratio.asin().to_degrees()
    };
    let (min_longitude, max_longitude) = if lon - lon_delta < -180.0 || lon + lon_delta > 180.0 {
        (-180.0, 180.0)
    } else {
        (lon - lon_delta, lon + lon_delta)
    };

    BoundingBox {
        min_latitude: (lat - lat_delta).max(-90.0),
        max_latitude: (lat + lat_delta).min(90.0),
        min_longitude,
        max_longitude,
    }
}
