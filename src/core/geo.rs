use crate::domain::model::{Article, Breeder, Dog, GeoPoint, Litter};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two known points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `h` past 1.0 near the antipode.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// `None` when either point is unknown. Never coerced to zero.
pub fn compute_distance(a: Option<GeoPoint>, b: Option<GeoPoint>) -> Option<f64> {
    Some(haversine_km(a?, b?))
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DistanceLimit {
    #[default]
    Unlimited,
    Km(f64),
}

impl From<Option<f64>> for DistanceLimit {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(km) => DistanceLimit::Km(km),
            None => DistanceLimit::Unlimited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub distance_km: Option<f64>,
    pub exceeded: bool,
}

impl Proximity {
    pub fn unknown() -> Self {
        Self {
            distance_km: None,
            exceeded: false,
        }
    }

    /// Distance rounded to whole kilometres for display.
    pub fn display_km(&self) -> Option<i64> {
        self.distance_km.map(|km| km.round() as i64)
    }
}

/// Distance from `origin` to `target` and whether it lies beyond `limit`.
///
/// Comparison uses the unrounded distance, so a limit of 0 only admits
/// exact co-location.
pub fn evaluate(origin: Option<GeoPoint>, target: Option<GeoPoint>, limit: DistanceLimit) -> Proximity {
    let distance_km = compute_distance(origin, target);
    let exceeded = match (distance_km, limit) {
        (Some(km), DistanceLimit::Km(max)) => km > max,
        _ => false,
    };
    Proximity {
        distance_km,
        exceeded,
    }
}

/// Records with an (optional) position on the map.
pub trait Located {
    fn location(&self) -> Option<GeoPoint>;
}

impl Located for Dog {
    fn location(&self) -> Option<GeoPoint> {
        self.location
    }
}

impl Located for Breeder {
    fn location(&self) -> Option<GeoPoint> {
        Breeder::location(self)
    }
}

impl Located for Litter {
    fn location(&self) -> Option<GeoPoint> {
        Litter::location(self)
    }
}

impl Located for Article {
    fn location(&self) -> Option<GeoPoint> {
        None
    }
}
