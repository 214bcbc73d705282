//! Math utilities and types
//!
//! Aliases over nalgebra plus the 2D affine builders the scene graph composes
//! its local transforms from. Matrices stay 4x4 so they can be handed to a
//! renderer unchanged; the 2D builders only touch the xy plane.

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Translation by `offset` in the xy plane.
pub fn translation_2d(offset: Vec2) -> Mat4 {
    Mat4::new_translation(&Vec3::new(offset.x, offset.y, 0.0))
}

/// Rotation by `angle` radians about the z axis.
pub fn rotation_2d(angle: f32) -> Mat4 {
    Mat4::from_axis_angle(&Vec3::z_axis(), angle)
}

/// Non-uniform scaling in the xy plane. Zero factors are accepted.
pub fn scaling_2d(scale: Vec2) -> Mat4 {
    Mat4::new_nonuniform_scaling(&Vec3::new(scale.x, scale.y, 1.0))
}

/// Applies `m` about `pivot` instead of the local origin:
/// `T(pivot) * m * T(-pivot)`. A zero pivot returns `m` untouched.
pub fn about_pivot(m: Mat4, pivot: Vec2) -> Mat4 {
    if pivot == Vec2::zeros() {
        return m;
    }
    translation_2d(pivot) * m * translation_2d(-pivot)
}

/// Inverse of `m`, or identity when `m` is singular (e.g. zero scale).
pub fn invert_or_identity(m: &Mat4) -> Mat4 {
    m.try_inverse().unwrap_or_else(|| {
        log::trace!("singular matrix, substituting identity for its inverse");
        Mat4::identity()
    })
}

/// Transforms a point of the xy plane by `m`.
pub fn transform_point_2d(m: &Mat4, point: Vec2) -> Vec2 {
    let p = m.transform_point(&Point3::new(point.x, point.y, 0.0));
    Vec2::new(p.x, p.y)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_about_pivot_keeps_pivot_fixed() {
        let pivot = Vec2::new(10.0, 5.0);
        let m = about_pivot(rotation_2d(constants::HALF_PI), pivot);

        assert_relative_eq!(transform_point_2d(&m, pivot), pivot, epsilon = 1e-5);
        assert_relative_eq!(
            transform_point_2d(&m, Vec2::new(11.0, 5.0)),
            Vec2::new(10.0, 6.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_singular_inverse_is_identity() {
        let m = scaling_2d(Vec2::new(0.0, 2.0));
        assert_eq!(invert_or_identity(&m), Mat4::identity());
    }

    #[test]
    fn test_translation_ignores_z() {
        let m = translation_2d(Vec2::new(3.0, -4.0));
        let p = m.transform_point(&Point3::new(1.0, 1.0, 7.0));
        assert_relative_eq!(p, Point3::new(4.0, -3.0, 7.0));
    }
}
