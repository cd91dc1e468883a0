use super::domain::GeoPoint;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Anything carrying an optional WGS84 position.
pub trait Located {
    fn location(&self) -> Option<GeoPoint>;
}

/// Items within `radius_km` of `center`, paired with their distance. Items without
/// coordinates are skipped.
pub fn radius_query<'a, T, I>(center: GeoPoint, radius_km: f64, items: I) -> Vec<(&'a T, f64)>
where
    T: Located + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter_map(|item| {
            let point = item.location()?;
            let distance = distance_km(center, point);
            (distance <= radius_km).then_some((item, distance))
        })
        .collect()
}
