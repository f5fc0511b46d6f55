/// Small 3D vector helpers shared by the normal estimator and the camera
use nalgebra::Vector3;

/// Component-wise `a - b`
pub fn difference(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    a - b
}

/// Standard right-handed cross product
pub fn cross(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    a.cross(b)
}

/// Euclidean length
pub fn norm(a: &Vector3<f32>) -> f32 {
    (a.x * a.x + a.y * a.y + a.z * a.z).sqrt()
}

/// `a / norm(a)`. A zero vector produces NaN components.
pub fn normalize(a: &Vector3<f32>) -> Vector3<f32> {
    a / norm(a)
}

/// Like [`normalize`], but returns `None` for zero-length vectors.
pub fn try_normalize(a: &Vector3<f32>) -> Option<Vector3<f32>> {
    let len = norm(a);
    if len > 0.0 {
        Some(a / len)
    } else {
        None
    }
}

/// Degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// Keep an accumulated angle inside (-360, 360) after a single step.
pub fn wrap_degrees(mut degrees: f32) -> f32 {
    if degrees >= 360.0 {
        degrees -= 360.0;
    }
    if degrees <= -360.0 {
        degrees += 360.0;
    }
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_difference_and_cross() {
        let a = Vector3::new(3.0, 2.0, 1.0);
        let b = Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(difference(&a, &b), Vector3::new(2.0, 1.0, 0.0));

        let x = Vector3::x();
        let y = Vector3::y();
        assert_eq!(cross(&x, &y), Vector3::z());
        assert_eq!(cross(&y, &x), -Vector3::z());
    }

    #[test]
    fn test_normalize() {
        let v = Vector3::new(3.0, 0.0, 4.0);
        assert_relative_eq!(norm(&v), 5.0);
        assert_relative_eq!(normalize(&v), Vector3::new(0.6, 0.0, 0.8));
    }

    #[test]
    fn test_normalize_zero_vector() {
        let zero = Vector3::zeros();
        assert!(normalize(&zero).x.is_nan());
        assert!(try_normalize(&zero).is_none());
    }

    #[test]
    fn test_try_normalize_short_vector() {
        let short = Vector3::new(0.0, 0.0, -1e-8);
        let unit = try_normalize(&short).unwrap();
        assert_relative_eq!(unit, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_relative_eq!(wrap_degrees(360.0), 0.0);
        assert_relative_eq!(wrap_degrees(-360.5), -0.5);
        assert_relative_eq!(wrap_degrees(359.0), 359.0);
    }
}
