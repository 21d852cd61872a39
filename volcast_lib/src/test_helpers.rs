//! Module with helper functions
//! Saves repetition in unit tests

use nalgebra::{point, vector};

use crate::{
    camera::PerspectiveCamera,
    color::RGBA,
    render::{RenderConfig, RenderMode},
    transfer::{TentClassifier, TransferFunction1D},
    volumetric::{Interpolation, Volume},
};

/// 2x2x2 volume, all voxels zero except `(1,1,1) = 100`.
pub fn corner_volume() -> Volume {
    Volume::from_data(vec![0, 0, 0, 0, 0, 0, 0, 100], vector![2, 2, 2]).unwrap()
}

/// 8x8x8 volume rising by 30 per voxel along x, constant in y and z.
pub fn ramp_volume() -> Volume {
    let size = vector![8usize, 8, 8];
    let mut data = Vec::with_capacity(size.x * size.y * size.z);
    for _z in 0..size.z {
        for _y in 0..size.y {
            for x in 0..size.x {
                data.push(x as u16 * 30);
            }
        }
    }
    Volume::from_data(data, size).unwrap()
}

/// Camera on the negative x axis looking straight at [`ramp_volume`].
pub fn ramp_camera() -> PerspectiveCamera {
    PerspectiveCamera::new(point![-15.0, 3.5, 3.5], vector![1.0, 0.0, 0.0])
}

/// Grayscale table with a linear alpha ramp, domain `0..=255`.
pub fn grayscale_tf() -> TransferFunction1D {
    let table: Vec<RGBA> = (0..64)
        .map(|i| {
            let v = i as f32 / 63.0;
            vector![v, v, v, v * 0.5]
        })
        .collect();
    TransferFunction1D::new(table, 0.0, 256.0)
}

/// Config rendering [`ramp_volume`] with sensible defaults.
pub fn default_config() -> RenderConfig {
    RenderConfig {
        resolution: vector![16, 16],
        render_mode: RenderMode::Composite,
        interpolation: Interpolation::Trilinear,
        iso_value: 40.0,
        volume_shading: false,
        tf: grayscale_tf(),
        tf2d: TentClassifier::new(vector![0.9, 0.3, 0.1, 0.8], 120.0, 60.0),
        tf2d_v2: [
            TentClassifier::new(vector![0.9, 0.2, 0.1, 0.8], 90.0, 40.0),
            TentClassifier::new(vector![0.1, 0.4, 0.9, 0.6], 180.0, 50.0),
        ],
        multi_thread: false,
    }
}
