use nalgebra::{point, Point3, Vector3};

use super::Ray;

/// Axis aligned box around a volume.
/// `lower` is the volume origin, `upper` the opposite corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub lower: Point3<f32>,
    pub upper: Point3<f32>,
}

impl BoundBox {
    pub fn new(lower: Point3<f32>, upper: Point3<f32>) -> BoundBox {
        BoundBox { lower, upper }
    }

    /// Box of a volume with `size` voxels per axis, anchored at the origin.
    /// The last voxel center is at `size - 1`, which is the upper corner.
    pub fn from_dims(size: Vector3<usize>) -> BoundBox {
        let upper = size.map(|v| (v - 1) as f32);
        BoundBox {
            lower: point![0.0, 0.0, 0.0],
            upper: point![upper.x, upper.y, upper.z],
        }
    }

    pub fn dims(&self) -> Vector3<f32> {
        self.upper - self.lower
    }

    pub fn is_in(&self, pos: &Point3<f32>) -> bool {
        self.upper.x > pos.x
            && self.upper.y > pos.y
            && self.upper.z > pos.z
            && pos.x > self.lower.x
            && pos.y > self.lower.y
            && pos.z > self.lower.z
    }

    /// Slab method intersection.
    /// Returns the parametric interval the ray spends inside the box,
    /// `None` if the ray misses or the box lies entirely behind the origin.
    /// Scale invariant, `ray.direction` does not have to be normalized;
    /// zero direction components ride on signed-infinity division.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        // Source: An Efficient and Robust Ray-Box Intersection Algorithm. Amy Williams et al. 2004.
        // http://citeseerx.ist.psu.edu/viewdoc/summary?doi=10.1.1.64.7663

        // t value of intersection with the 6 planes of a bounding box
        let t0 = (self.lower - ray.origin).component_div(&ray.direction);
        let t1 = (self.upper - ray.origin).component_div(&ray.direction);

        // [ (min,max) , (min,max) , (min,max) ]
        let t_minmax = t0.zip_map(&t1, |t0, t1| if t0 < t1 { (t0, t1) } else { (t1, t0) });

        let tmin = f32::max(f32::max(t_minmax.x.0, t_minmax.y.0), t_minmax.z.0);
        let tmax = f32::min(f32::min(t_minmax.x.1, t_minmax.y.1), t_minmax.z.1);

        // if tmax < 0, ray is intersecting AABB, but the whole AABB is behind us
        if tmax.is_sign_negative() {
            return None;
        }

        // if tmin > tmax, ray doesn't intersect AABB
        if tmin > tmax {
            return None;
        }

        Some((tmin, tmax))
    }
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;

    fn unit_box() -> BoundBox {
        BoundBox::new(point![0.0, 0.0, 0.0], point![100.0, 100.0, 100.0])
    }

    #[test]
    fn intersect_works() {
        let bbox = unit_box();
        let ray = Ray::new(point![-1.0, -1.0, 0.0], vector![1.0, 1.0, 1.0]);
        let inter = bbox.intersect(&ray);
        assert!(inter.is_some());
        let (tmin, tmax) = inter.unwrap();
        assert!(tmin <= tmax);
    }

    #[test]
    fn intersect_negative_direction() {
        let bbox = unit_box();
        let ray = Ray::new(point![200.0, 50.0, 50.0], vector![-1.0, 0.0, 0.0]);
        let inter = bbox.intersect(&ray);
        assert!(inter.is_some());
        let (tmin, tmax) = inter.unwrap();
        assert!(tmin <= tmax);
        assert!(tmin > 0.0);
    }

    #[test]
    fn not_intersecting() {
        let bbox = unit_box();
        let ray = Ray::new(point![200.0, 200.0, 200.0], vector![1.0, 0.0, 0.0]);
        assert!(bbox.intersect(&ray).is_none());
    }

    #[test]
    fn behind_origin_is_a_miss() {
        let bbox = unit_box();
        let ray = Ray::new(point![200.0, 50.0, 50.0], vector![1.0, 0.0, 0.0]);
        assert!(bbox.intersect(&ray).is_none());
    }

    #[test]
    fn origin_inside_straddles_zero() {
        let bbox = unit_box();
        let ray = Ray::new(point![50.0, 50.0, 50.0], vector![1.0, 2.0, 3.0]);
        let (tmin, tmax) = bbox.intersect(&ray).unwrap();
        assert!(tmin <= 0.0);
        assert!(tmax >= 0.0);
    }

    #[test]
    fn axis_aligned_ray_with_zero_components() {
        let bbox = unit_box();
        let ray = Ray::new(point![-5.0, 50.0, 50.0], vector![1.0, 0.0, 0.0]);
        let (tmin, tmax) = bbox.intersect(&ray).unwrap();
        assert!((tmin - 5.0).abs() < f32::EPSILON);
        assert!((tmax - 105.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scale_invariant() {
        let bbox = unit_box();
        let slow = Ray::new(point![-1.0, 50.0, 50.0], vector![1.0, 0.0, 0.0]);
        let fast = Ray::new(point![-1.0, 50.0, 50.0], vector![4.0, 0.0, 0.0]);
        let (smin, smax) = bbox.intersect(&slow).unwrap();
        let (fmin, fmax) = bbox.intersect(&fast).unwrap();
        assert!((smin - fmin * 4.0).abs() < 1e-4);
        assert!((smax - fmax * 4.0).abs() < 1e-4);
    }
}
