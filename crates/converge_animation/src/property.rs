//! Animatable attributes and their values

use converge_core::Point;

/// A visual attribute of an element that a timeline can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Centre position in container pixels
    Position,
    /// Uniform scale factor
    Scale,
    /// Opacity (0.0 to 1.0)
    Opacity,
    /// Rotation in degrees
    Rotation,
    /// Width in pixels
    Width,
    /// Height in pixels
    Height,
    /// Renderer-specific scalar, e.g. a gradient stop angle
    Custom(&'static str),
}

/// A value an attribute can take
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Scalar(f64),
    Point(Point),
}

impl Value {
    /// Interpolate towards `other`. Mismatched kinds snap to `other`.
    pub fn lerp(&self, other: &Value, t: f64) -> Value {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a + (b - a) * t),
            (Value::Point(a), Value::Point(b)) => Value::Point(a.lerp(*b, t)),
            _ => *other,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Point(_) => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Value::Point(p) => Some(*p),
            Value::Scalar(_) => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Value::Scalar(v) => v.is_finite(),
            Value::Point(p) => p.is_finite(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Point> for Value {
    fn from(point: Point) -> Self {
        Value::Point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_lerp() {
        let v = Value::Scalar(0.0).lerp(&Value::Scalar(1.8), 0.5);
        assert_eq!(v, Value::Scalar(0.9));
    }

    #[test]
    fn test_point_lerp_with_overshoot() {
        // Back-out easing produces progress above 1; points must extrapolate
        let a = Value::Point(Point::new(0.0, 0.0));
        let b = Value::Point(Point::new(10.0, 20.0));
        assert_eq!(a.lerp(&b, 1.5).as_point(), Some(Point::new(15.0, 30.0)));
    }

    #[test]
    fn test_mismatched_kinds_snap() {
        let v = Value::Scalar(3.0).lerp(&Value::Point(Point::new(1.0, 2.0)), 0.1);
        assert_eq!(v, Value::Point(Point::new(1.0, 2.0)));
    }
}
