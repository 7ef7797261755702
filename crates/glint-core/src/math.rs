//! Re-exports of the SIMD-accelerated `glam` types used for layout and transforms.
//!
//! ```
//! use glint_core::math::{Mat4, Vec2, Vec3};
//!
//! let pen = Vec2::new(0.0, -0.9);
//! let transform = Mat4::from_translation(pen.extend(0.0));
//! assert_eq!(transform.transform_point3(Vec3::ZERO).y, -0.9);
//! ```

pub use glam::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_then_scale() {
        let transform = Mat4::from_translation(Vec3::new(10.0, 20.0, 0.0)) * Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0));
        let point = transform.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(point, Vec3::new(12.0, 22.0, 0.0));
    }
}
