//! Test data generators for creating synthetic forecast fields.
//!
//! Every generator is a pure function of the point coordinates, member and
//! lead time, so tests can recompute the expected value of any panel.

use serde_json::{json, Value};

/// Creates a scattered point cloud over a lat/lon box.
///
/// Points lie on a `n_lat x n_lon` lattice with a small deterministic
/// offset on every other point, so the cloud is not a perfect mesh.
///
/// # Returns
///
/// `(lat, lon)` in degrees, one entry per point.
pub fn scattered_points(
    n_lat: usize,
    n_lon: usize,
    lat_range: (f64, f64),
    lon_range: (f64, f64),
) -> (Vec<f64>, Vec<f64>) {
    let step = |range: (f64, f64), n: usize| (range.1 - range.0) / (n.max(2) - 1) as f64;
    let dlat = step(lat_range, n_lat);
    let dlon = step(lon_range, n_lon);

    let mut lat = Vec::with_capacity(n_lat * n_lon);
    let mut lon = Vec::with_capacity(n_lat * n_lon);
    for i in 0..n_lat {
        for j in 0..n_lon {
            let jitter = if (i + j) % 2 == 1 { 0.1 } else { 0.0 };
            lat.push((lat_range.0 + i as f64 * dlat + jitter * dlat).min(lat_range.1));
            lon.push((lon_range.0 + j as f64 * dlon + jitter * dlon).min(lon_range.1));
        }
    }
    (lat, lon)
}

/// 2m temperature in Kelvin: colder to the north, each member 0.5K warmer
/// than the previous one and each lead time 0.25K warmer.
pub fn temperature_kelvin(lat: &[f64], member: usize, lead_time: usize) -> Vec<f32> {
    lat.iter()
        .map(|&la| {
            (288.15 - (la - 60.0) * 0.8 + member as f64 * 0.5 + lead_time as f64 * 0.25) as f32
        })
        .collect()
}

/// Sea-level pressure in Pa with a low centred at `(60N, 10E)`.
pub fn pressure_pa(lat: &[f64], lon: &[f64], lead_time: usize) -> Vec<f32> {
    lat.iter()
        .zip(lon)
        .map(|(&la, &lo)| {
            let dist = ((la - 60.0).powi(2) + (lo - 10.0 - lead_time as f64).powi(2)).sqrt();
            (98_000.0 + 400.0 * dist.min(10.0)) as f32
        })
        .collect()
}

/// Six-hour accumulated precipitation in metres, zero away from the low.
pub fn precipitation_m(lat: &[f64], lon: &[f64], member: usize) -> Vec<f32> {
    lat.iter()
        .zip(lon)
        .map(|(&la, &lo)| {
            let dist = ((la - 60.0).powi(2) + (lo - 10.0).powi(2)).sqrt();
            let mm = (20.0 - 4.0 * dist).max(0.0) + member as f64;
            (mm / 1000.0) as f32
        })
        .collect()
}

/// 10m wind speed in m/s.
pub fn wind_speed(lat: &[f64], lead_time: usize) -> Vec<f32> {
    lat.iter()
        .map(|&la| ((la - 55.0).abs() * 2.0 + lead_time as f64) as f32)
        .collect()
}

fn member_fields(lat: &[f64], lon: &[f64], member: usize, lead_times: usize) -> [Vec<Vec<f32>>; 4] {
    [
        (0..lead_times).map(|lt| temperature_kelvin(lat, member, lt)).collect(),
        (0..lead_times).map(|lt| pressure_pa(lat, lon, lt)).collect(),
        (0..lead_times).map(|_| precipitation_m(lat, lon, member)).collect(),
        (0..lead_times).map(|lt| wind_speed(lat, lt)).collect(),
    ]
}

/// Forecast document holding `members` members (numbered from
/// `first_member`) of every synthetic field.
///
/// Field values are nested `[member][lead_time][point]`.
pub fn ensemble_document(
    lat: &[f64],
    lon: &[f64],
    first_member: usize,
    members: usize,
    lead_times: usize,
) -> Value {
    let per_member: Vec<_> = (first_member..first_member + members)
        .map(|m| member_fields(lat, lon, m, lead_times))
        .collect();
    let field = |k: usize| -> Vec<&Vec<Vec<f32>>> { per_member.iter().map(|f| &f[k]).collect() };

    json!({
        "latitude": lat,
        "longitude": lon,
        "fields": {
            "air_temperature_2m": field(0),
            "air_pressure_at_sea_level": field(1),
            "precipitation_amount_acc6h": field(2),
            "wind_speed_10m": field(3),
        }
    })
}

/// Reference document with every synthetic field, nested
/// `[lead_time][point]`. Values equal those of member 0.
pub fn reference_document(lat: &[f64], lon: &[f64], lead_times: usize) -> Value {
    let [t, p, r, w] = member_fields(lat, lon, 0, lead_times);
    json!({
        "latitude": lat,
        "longitude": lon,
        "fields": {
            "air_temperature_2m": t,
            "air_pressure_at_sea_level": p,
            "precipitation_amount_acc6h": r,
            "wind_speed_10m": w,
        }
    })
}

/// Regular `ny x nx` mesh document, stored south row first.
pub fn regular_document(nx: usize, ny: usize, lead_times: usize) -> Value {
    let mut lat = Vec::with_capacity(nx * ny);
    let mut lon = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            lat.push(55.0 + row as f64);
            lon.push(5.0 + col as f64);
        }
    }
    let mut doc = ensemble_document(&lat, &lon, 0, 1, lead_times);
    doc["shape"] = json!([ny, nx]);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scattered_points_within_box() {
        let (lat, lon) = scattered_points(4, 5, (58.0, 62.0), (8.0, 12.0));
        assert_eq!(lat.len(), 20);
        assert_eq!(lon.len(), 20);
        assert!(lat.iter().all(|&v| (58.0..=62.0).contains(&v)));
        assert!(lon.iter().all(|&v| (8.0..=12.0).contains(&v)));
    }

    #[test]
    fn test_temperature_pattern() {
        let t = temperature_kelvin(&[60.0], 2, 4);
        assert!((t[0] - 290.15).abs() < 1e-3);
    }

    #[test]
    fn test_ensemble_document_shape() {
        let (lat, lon) = scattered_points(2, 2, (59.0, 61.0), (9.0, 11.0));
        let doc = ensemble_document(&lat, &lon, 0, 3, 2);
        let t = &doc["fields"]["air_temperature_2m"];
        assert_eq!(t.as_array().unwrap().len(), 3);
        assert_eq!(t[0].as_array().unwrap().len(), 2);
        assert_eq!(t[0][0].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_regular_document_has_shape() {
        let doc = regular_document(3, 2, 1);
        assert_eq!(doc["shape"], json!([2, 3]));
        assert_eq!(doc["latitude"].as_array().unwrap().len(), 6);
    }
}
