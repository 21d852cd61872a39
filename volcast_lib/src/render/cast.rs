use nalgebra::{vector, Point3, Vector3};

use crate::{
    camera::Camera,
    color::{self, RGBA},
    common::{BoundBox, Ray},
    transfer::TentClassifier,
    volumetric::{GradientVolume, Volume},
};

use super::{
    renderer::{RenderConfig, RenderMode},
    shading::phong_shading,
};

/// Distance between two samples along a ray.
pub(super) const SAMPLE_STEP: f32 = 1.0;

/// Surface color before shading.
const ISO_HIT_COLOR: RGBA = vector![0.8, 0.8, 0.2, 1.0];

/// Read-only state shared by every pixel of one render pass.
///
/// Built once per [`super::Renderer::render`] call; the scheduler hands it
/// to all tiles, so everything here must stay immutable for the whole pass.
pub(super) struct CastContext<'a, C> {
    volume: &'a Volume,
    gradient: &'a GradientVolume,
    camera: &'a C,
    config: &'a RenderConfig,
    bound_box: BoundBox,
    volume_center: Point3<f32>,
    plane_normal: Vector3<f32>,
    camera_pos: Point3<f32>,
}

impl<'a, C> CastContext<'a, C>
where
    C: Camera,
{
    pub fn new(
        volume: &'a Volume,
        gradient: &'a GradientVolume,
        camera: &'a C,
        config: &'a RenderConfig,
    ) -> CastContext<'a, C> {
        let half_dims = volume.get_size().map(|v| v as f32 / 2.0);
        CastContext {
            volume,
            gradient,
            camera,
            config,
            bound_box: volume.get_bound_box(),
            volume_center: Point3::from(half_dims),
            plane_normal: -camera.get_forward().normalize(),
            camera_pos: camera.get_position(),
        }
    }

    /// Color of the pixel at normalized viewport coordinates.
    /// Rays that miss the volume stay transparent black.
    pub fn cast_pixel(&self, pixel_coord: (f32, f32)) -> RGBA {
        let mut ray = self.camera.get_ray(pixel_coord);

        let (tmin, tmax) = match self.bound_box.intersect(&ray) {
            Some(t) => t,
            None => return color::zero(),
        };
        ray.tmin = tmin;
        ray.tmax = tmax;

        match self.config.render_mode {
            RenderMode::Slice => self.trace_slice(&ray),
            RenderMode::Mip => self.trace_mip(&ray),
            RenderMode::Iso => self.trace_iso(&ray),
            RenderMode::Composite => self.trace_composite(&ray),
            RenderMode::Tf2d => self.trace_tf2d(&ray),
            RenderMode::Tf2dV2 => self.trace_tf2d_v2(&ray),
        }
    }

    fn sample(&self, pos: Point3<f32>) -> f32 {
        self.volume.sample_at(pos, self.config.interpolation)
    }

    /// Single sample where the ray crosses the plane through the volume
    /// center perpendicular to the view direction. Rays parallel to the
    /// plane divide by a near-zero dot product; the slicer is only driven
    /// by camera rays, which always face the plane.
    fn trace_slice(&self, ray: &Ray) -> RGBA {
        let t = (self.volume_center - ray.origin).dot(&self.plane_normal)
            / ray.direction.dot(&self.plane_normal);
        let val = self.sample(ray.point_from_t(t));
        color::mono(f32::max(val / self.volume.maximum(), 0.0), 1.0)
    }

    /// Maximum intensity projection.
    fn trace_mip(&self, ray: &Ray) -> RGBA {
        let mut max_val = 0.0f32;

        // Incrementing the position instead of recomputing it from t gives a
        // measurable speed-up.
        let mut pos = ray.point_from_t(ray.tmin);
        let increment = SAMPLE_STEP * ray.direction;
        let mut t = ray.tmin;
        while t <= ray.tmax {
            max_val = f32::max(self.sample(pos), max_val);
            t += SAMPLE_STEP;
            pos += increment;
        }

        color::mono(max_val / self.volume.maximum(), 1.0)
    }

    /// First crossing of the isosurface, optionally refined by bisection
    /// and Phong shaded. The camera acts as the light source.
    fn trace_iso(&self, ray: &Ray) -> RGBA {
        let iso_value = self.config.iso_value;
        let mut pos = ray.point_from_t(ray.tmin);
        let increment = SAMPLE_STEP * ray.direction;
        let mut t = ray.tmin;

        if !self.config.volume_shading {
            while t <= ray.tmax {
                if self.sample(pos) > iso_value {
                    return ISO_HIT_COLOR;
                }
                t += SAMPLE_STEP;
                pos += increment;
            }
            return color::zero();
        }

        let mut prior_step = false;
        while t <= ray.tmax {
            if self.sample(pos) > iso_value {
                if prior_step {
                    // the crossing lies between the previous and this sample
                    t = self.bisection_accuracy(ray, t - SAMPLE_STEP, t, iso_value);
                    pos = ray.point_from_t(t);
                }
                let gradient = self.gradient.get_gradient_voxel(pos);
                let rgb = phong_shading(
                    ISO_HIT_COLOR.xyz(),
                    &gradient,
                    self.camera_pos.coords,
                    ray.direction,
                );
                return vector![rgb.x, rgb.y, rgb.z, 1.0];
            }
            prior_step = true;
            t += SAMPLE_STEP;
            pos += increment;
        }
        color::zero()
    }

    /// Narrow a bracket `[t0, t1]` around the isosurface until the sampled
    /// value is within `MIN_DIFFERENCE` of `iso_value`. The iteration cap
    /// keeps degenerate brackets from looping forever; precision degrades
    /// instead.
    pub(super) fn bisection_accuracy(
        &self,
        ray: &Ray,
        mut t0: f32,
        mut t1: f32,
        iso_value: f32,
    ) -> f32 {
        const MAX_ITERATIONS: u32 = 500;
        const MIN_DIFFERENCE: f32 = 0.0001;

        let mut t_middle = (t0 + t1) / 2.0;

        for _ in 0..MAX_ITERATIONS {
            t_middle = (t0 + t1) / 2.0;
            let value = self.sample(ray.point_from_t(t_middle));

            if (value - iso_value).abs() < MIN_DIFFERENCE {
                return t_middle;
            } else if value < iso_value {
                t0 = t_middle;
            } else {
                t1 = t_middle;
            }
        }

        t_middle
    }

    /// Back-to-front compositing through the 1D transfer function.
    fn trace_composite(&self, ray: &Ray) -> RGBA {
        let mut pos = ray.point_from_t(ray.tmax);
        let increment = SAMPLE_STEP * ray.direction;
        let mut color = vector![0.0, 0.0, 0.0];

        let mut t = ray.tmax;
        while t >= ray.tmin {
            let tf_value = self.config.tf.sample(self.sample(pos));
            let mut sample_rgb = tf_value.xyz();
            if self.config.volume_shading {
                let gradient = self.gradient.get_gradient_voxel(pos);
                sample_rgb =
                    phong_shading(sample_rgb, &gradient, self.camera_pos.coords, ray.direction);
            }
            color = tf_value.w * sample_rgb + (1.0 - tf_value.w) * color;
            t -= SAMPLE_STEP;
            pos -= increment;
        }

        vector![color.x, color.y, color.z, 1.0]
    }

    /// Back-to-front compositing, opacity from a single tent classifier,
    /// flat material color.
    fn trace_tf2d(&self, ray: &Ray) -> RGBA {
        let classifier = &self.config.tf2d;
        let mut pos = ray.point_from_t(ray.tmax);
        let increment = SAMPLE_STEP * ray.direction;
        let mut color = vector![0.0, 0.0, 0.0];

        let mut t = ray.tmax;
        while t >= ray.tmin {
            let intensity = self.sample(pos);
            let gradient = self.gradient.get_gradient_voxel(pos);
            let opacity = classifier
                .classify(intensity, gradient.magnitude)
                .unwrap_or(0.0)
                * classifier.color.w;

            let mut sample_rgb = classifier.color.xyz();
            if self.config.volume_shading {
                sample_rgb =
                    phong_shading(sample_rgb, &gradient, self.camera_pos.coords, ray.direction);
            }

            color = opacity * sample_rgb + (1.0 - opacity) * color;
            t -= SAMPLE_STEP;
            pos -= increment;
        }

        vector![color.x, color.y, color.z, 1.0]
    }

    /// Back-to-front compositing over two tent classifiers.
    fn trace_tf2d_v2(&self, ray: &Ray) -> RGBA {
        let mut pos = ray.point_from_t(ray.tmax);
        let increment = SAMPLE_STEP * ray.direction;
        let mut color = vector![0.0, 0.0, 0.0];

        let mut t = ray.tmax;
        while t >= ray.tmin {
            let intensity = self.sample(pos);
            let gradient = self.gradient.get_gradient_voxel(pos);

            let (tf_color, opacity) =
                classify_two(&self.config.tf2d_v2, intensity, gradient.magnitude);
            let opacity = opacity * tf_color.w;

            color = opacity * tf_color.xyz() + (1.0 - opacity) * color;
            t -= SAMPLE_STEP;
            pos -= increment;
        }

        vector![color.x, color.y, color.z, 1.0]
    }
}

/// Resolve a sample against both classifiers.
/// A sample inside both regions goes to the larger opacity.
fn classify_two(classifiers: &[TentClassifier; 2], intensity: f32, magnitude: f32) -> (RGBA, f32) {
    let first = classifiers[0].classify(intensity, magnitude);
    let second = classifiers[1].classify(intensity, magnitude);

    match (first, second) {
        (Some(a), Some(b)) if b > a => (classifiers[1].color, b),
        (Some(a), _) => (classifiers[0].color, a),
        (None, Some(b)) => (classifiers[1].color, b),
        (None, None) => (color::zero(), 0.0),
    }
}

#[cfg(test)]
mod test {
    use nalgebra::point;

    use super::*;
    use crate::test_helpers::{corner_volume, default_config, ramp_camera, ramp_volume};

    fn intersected_ray(origin: Point3<f32>, direction: Vector3<f32>, bbox: &BoundBox) -> Ray {
        let mut ray = Ray::new(origin, direction);
        let (tmin, tmax) = bbox.intersect(&ray).unwrap();
        ray.tmin = tmin;
        ray.tmax = tmax;
        ray
    }

    #[test]
    fn bisection_converges_on_a_monotonic_bracket() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();
        let config = default_config();
        let ctx = CastContext::new(&volume, &gradient, &camera, &config);

        // along x the ramp rises by 30 per voxel
        let ray = Ray::new(point![-1.0, 3.5, 3.5], vector![1.0, 0.0, 0.0]);
        let iso_value = 100.0;
        let t = ctx.bisection_accuracy(&ray, 2.0, 6.0, iso_value);
        let value = ctx.sample(ray.point_from_t(t));
        assert!((value - iso_value).abs() < 1e-3);
    }

    #[test]
    fn mip_is_invariant_to_step_direction() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();
        let config = default_config();
        let ctx = CastContext::new(&volume, &gradient, &camera, &config);

        let ray = intersected_ray(
            point![-2.0, 3.2, 3.7],
            vector![1.0, 0.1, 0.05],
            &volume.get_bound_box(),
        );

        let forward = ctx.trace_mip(&ray).x;

        // march the same interval backwards
        let mut max_val = 0.0f32;
        let mut t = ray.tmax;
        while t >= ray.tmin {
            max_val = f32::max(ctx.sample(ray.point_from_t(t)), max_val);
            t -= SAMPLE_STEP;
        }
        let backward = max_val / volume.maximum();

        assert!((forward - backward).abs() < 1e-4);
    }

    #[test]
    fn compositing_forces_alpha_to_one() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();
        let config = default_config();
        let ctx = CastContext::new(&volume, &gradient, &camera, &config);

        let ray = intersected_ray(
            point![-2.0, 3.5, 3.5],
            vector![1.0, 0.0, 0.0],
            &volume.get_bound_box(),
        );

        assert_eq!(ctx.trace_composite(&ray).w, 1.0);
        assert_eq!(ctx.trace_tf2d(&ray).w, 1.0);
        assert_eq!(ctx.trace_tf2d_v2(&ray).w, 1.0);
    }

    #[test]
    fn compositing_stays_in_unit_range() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();
        let config = default_config();
        let ctx = CastContext::new(&volume, &gradient, &camera, &config);

        for y in 0..8 {
            for x in 0..8 {
                let coord = (x as f32 / 8.0, y as f32 / 8.0);
                let color = ctx.cast_pixel(coord);
                for c in color.iter() {
                    assert!(*c >= 0.0 && *c <= 1.0, "component {c} out of range");
                }
            }
        }
    }

    #[test]
    fn iso_miss_is_transparent() {
        let volume = corner_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();
        let mut config = default_config();
        config.iso_value = 1000.0; // nothing in the volume reaches this
        let ctx = CastContext::new(&volume, &gradient, &camera, &config);

        let ray = intersected_ray(
            point![-1.0, 0.5, 0.5],
            vector![1.0, 0.0, 0.0],
            &volume.get_bound_box(),
        );
        assert_eq!(ctx.trace_iso(&ray), color::zero());
    }

    #[test]
    fn iso_hit_returns_surface_color() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();
        let mut config = default_config();
        config.iso_value = 100.0;
        config.volume_shading = false;
        let ctx = CastContext::new(&volume, &gradient, &camera, &config);

        let ray = intersected_ray(
            point![-1.0, 3.5, 3.5],
            vector![1.0, 0.0, 0.0],
            &volume.get_bound_box(),
        );
        assert_eq!(ctx.trace_iso(&ray), ISO_HIT_COLOR);
    }

    #[test]
    fn larger_opacity_wins_in_overlap() {
        let narrow = TentClassifier::new(vector![1.0, 0.0, 0.0, 1.0], 100.0, 20.0);
        let wide = TentClassifier::new(vector![0.0, 1.0, 0.0, 1.0], 100.0, 80.0);

        // at intensity 110 and full magnitude both tents contain the point;
        // the wide one is flatter, so it keeps more opacity
        let (color, opacity) = classify_two(&[narrow, wide], 110.0, 255.0);
        assert_eq!(color, wide.color);
        assert!((opacity - wide.opacity(110.0, 255.0)).abs() < 1e-6);

        // dead center both return 1.0, ties go to the first classifier
        let (color, _) = classify_two(&[narrow, wide], 100.0, 255.0);
        assert_eq!(color, narrow.color);

        // outside both
        assert_eq!(classify_two(&[narrow, wide], 250.0, 255.0).1, 0.0);
    }
}
