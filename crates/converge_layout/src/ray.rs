//! Ray geometry

use converge_core::{ElementId, Point};

/// Which side of the focal point a ray lives on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RaySide {
    /// Runs from the container's left edge into the focal point
    Left,
    /// Leaves the focal point at a fixed angle
    Right,
}

/// A computed ray: origin, direction and extent in container pixels
#[derive(Clone, Debug, PartialEq)]
pub struct RayGeometry {
    pub id: String,
    pub side: RaySide,
    pub element: Option<ElementId>,
    pub origin: Point,
    /// Direction in degrees
    pub angle_deg: f64,
    pub length: f64,
}

impl RayGeometry {
    /// Point at normalized distance `t` along the ray.
    ///
    /// `t` is not clamped; values past 1 extend beyond the ray end.
    pub fn point_at(&self, t: f64) -> Point {
        let angle = self.angle_deg.to_radians();
        let distance = self.length * t;
        Point::new(
            self.origin.x + distance * angle.cos(),
            self.origin.y + distance * angle.sin(),
        )
    }

    pub fn end(&self) -> Point {
        self.point_at(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(angle_deg: f64) -> RayGeometry {
        RayGeometry {
            id: "r".to_string(),
            side: RaySide::Right,
            element: None,
            origin: Point::new(10.0, 20.0),
            angle_deg,
            length: 100.0,
        }
    }

    #[test]
    fn test_point_at_origin() {
        assert_eq!(ray(-18.0).point_at(0.0), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_point_at_follows_angle() {
        let end = ray(90.0).end();
        assert!((end.x - 10.0).abs() < 1e-9);
        assert!((end.y - 120.0).abs() < 1e-9);

        let half = ray(0.0).point_at(0.5);
        assert_eq!(half, Point::new(60.0, 20.0));
    }

    #[test]
    fn test_point_at_extends_past_end() {
        let beyond = ray(0.0).point_at(1.4);
        assert!((beyond.x - 150.0).abs() < 1e-9);
        assert_eq!(beyond.y, 20.0);
    }
}
