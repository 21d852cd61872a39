use nalgebra::{Point3, Vector3};

/// Ray cast by camera.
/// Main usecase is getting intersections with volumes ([`super::BoundBox::intersect`]),
/// then marching over the intersected line segment in steps.
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>, // not necessarily unit length
    /// Parametric distance at which the ray enters the volume.
    /// Valid only after intersection.
    pub tmin: f32,
    /// Parametric distance at which the ray exits the volume.
    /// Valid only after intersection.
    pub tmax: f32,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Ray {
        Ray {
            origin,
            direction,
            tmin: 0.0,
            tmax: 0.0,
        }
    }

    /// Returns point `t` units far from ray origin in ray direction
    pub fn point_from_t(&self, t: f32) -> Point3<f32> {
        self.origin + t * self.direction
    }
}
