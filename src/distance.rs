//! Great-circle distance on a spherical Earth.

use crate::stations::Coordinate;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance calculator for a sphere of fixed radius.
///
/// The result is in the unit of `radius`. Ellipsoidal correction is ignored,
/// which is off by a few tenths of a percent at city scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircle {
    pub radius: f64,
}

impl Default for GreatCircle {
    fn default() -> Self {
        Self {
            radius: EARTH_RADIUS_MILES,
        }
    }
}

impl GreatCircle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn distance(&self, start: &Coordinate, end: &Coordinate) -> f64 {
        haversine_distance(start, end, self.radius)
    }
}

/// Distance between two points given in degrees. Inputs are not range checked.
pub fn haversine_distance(start: &Coordinate, end: &Coordinate, radius: f64) -> f64 {
    let lat1 = start.latitude.to_radians();
    let lat2 = end.latitude.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = end.longitude.to_radians() - start.longitude.to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    // rounding can push `a` slightly past 1 for antipodal points
    2.0 * radius * a.sqrt().clamp(0.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn forsyth() -> Coordinate {
        Coordinate::new(42.339202, -71.090511)
    }

    fn mit() -> Coordinate {
        Coordinate::new(42.3581, -71.093198)
    }

    #[test]
    fn test_same_point_is_exactly_zero() {
        let calc = GreatCircle::default();
        assert_eq!(calc.distance(&forsyth(), &forsyth()), 0.0);
        let origin = Coordinate::new(0.0, 0.0);
        assert_eq!(calc.distance(&origin, &origin), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let calc = GreatCircle::default();
        let pairs = [
            (forsyth(), mit()),
            (Coordinate::new(-33.86, 151.21), Coordinate::new(51.5, -0.12)),
            (Coordinate::new(89.9, 10.0), Coordinate::new(-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            assert_relative_eq!(calc.distance(&a, &b), calc.distance(&b, &a), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_city_scale_distance() {
        // Huntington Ave to Mass Ave at MIT is about 1.31 miles
        let d = GreatCircle::default().distance(&forsyth(), &mit());
        assert_relative_eq!(d, 1.312996, epsilon = 1e-5);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance(
            &Coordinate::new(0.0, 0.0),
            &Coordinate::new(1.0, 0.0),
            EARTH_RADIUS_MILES,
        );
        assert_relative_eq!(d, EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_antipodal_points_are_half_circumference() {
        let d = GreatCircle::default().distance(
            &Coordinate::new(0.0, 0.0),
            &Coordinate::new(0.0, 180.0),
        );
        assert!(d.is_finite());
        assert_relative_eq!(d, EARTH_RADIUS_MILES * std::f64::consts::PI, epsilon = 1e-6);
    }

    #[test]
    fn test_radius_scales_result() {
        let miles = GreatCircle::new(EARTH_RADIUS_MILES).distance(&forsyth(), &mit());
        let km = GreatCircle::new(6371.0).distance(&forsyth(), &mit());
        assert_relative_eq!(km / miles, 6371.0 / EARTH_RADIUS_MILES, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_inputs_are_computed_through() {
        let d = GreatCircle::default().distance(
            &Coordinate::new(120.0, 400.0),
            &Coordinate::new(-95.0, -200.0),
        );
        assert!(d.is_finite());
    }
}
