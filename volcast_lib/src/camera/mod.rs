use nalgebra::{Point3, Vector3};

use crate::common::Ray;

mod perspective_camera;

pub use perspective_camera::PerspectiveCamera;

/// Source of primary rays.
/// The renderer only needs a ray per pixel plus the camera pose;
/// everything else about projection stays behind this trait.
pub trait Camera {
    /// Ray through the pixel at normalized viewport coordinates `[0,1]^2`.
    fn get_ray(&self, pixel_coord: (f32, f32)) -> Ray;

    fn get_position(&self) -> Point3<f32>;

    /// Unit view direction.
    fn get_forward(&self) -> Vector3<f32>;
}
