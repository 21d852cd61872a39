use nalgebra::Vector3;

use crate::volumetric::GradientVoxel;

const KA: f32 = 0.1;
const KD: f32 = 0.7;
const KS: f32 = 0.2;
const SPECULAR_POWER: i32 = 100;
const EPS: f32 = 0.0001; // avoiding division by 0

/// Local Phong term with the gradient standing in for the surface normal.
///
/// `light` and `view` do not have to be normalized. `theta` is the angle
/// between the normal and the negated light vector; the reflection angle is
/// approximated as the normal/view angle minus `theta`.
pub fn phong_shading(
    color: Vector3<f32>,
    gradient: &GradientVoxel,
    light: Vector3<f32>,
    view: Vector3<f32>,
) -> Vector3<f32> {
    let theta = f32::acos(gradient.dir.dot(&-light) / (gradient.magnitude * light.norm() + EPS));
    let phi =
        f32::acos(gradient.dir.dot(&view) / (gradient.magnitude * view.norm() + EPS)) - theta;

    (KA + KD * theta.cos() + KS * phi.cos().powi(SPECULAR_POWER)) * color
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;

    #[test]
    fn zero_gradient_does_not_produce_nan() {
        let gradient = GradientVoxel::zero();
        let shaded = phong_shading(
            vector![1.0, 1.0, 1.0],
            &gradient,
            vector![0.0, 0.0, 0.0],
            vector![0.0, 0.0, 0.0],
        );
        assert!(shaded.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn head_on_light_is_brightest() {
        let gradient = GradientVoxel {
            dir: vector![0.0, 0.0, 2.0],
            magnitude: 2.0,
        };
        // light vector anti-parallel to the normal: theta = 0
        let head_on = phong_shading(
            vector![1.0, 1.0, 1.0],
            &gradient,
            vector![0.0, 0.0, -1.0],
            vector![0.0, 0.0, -1.0],
        );
        let grazing = phong_shading(
            vector![1.0, 1.0, 1.0],
            &gradient,
            vector![1.0, 0.0, 0.0],
            vector![0.0, 0.0, -1.0],
        );
        assert!(head_on.x > grazing.x);
    }

    #[test]
    fn shading_scales_material_color() {
        let gradient = GradientVoxel {
            dir: vector![0.0, 1.0, 0.0],
            magnitude: 1.0,
        };
        let material = vector![0.2, 0.4, 0.8];
        let shaded = phong_shading(
            material,
            &gradient,
            vector![0.0, -1.0, 0.0],
            vector![0.3, -0.5, 0.1],
        );
        // channels keep the material's ratios
        assert!((shaded.y / shaded.x - 2.0).abs() < 1e-3);
        assert!((shaded.z / shaded.x - 4.0).abs() < 1e-3);
    }
}
