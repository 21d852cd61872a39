use nalgebra::{vector, Point3, Vector3};

use super::Volume;

/// Local gradient of the scalar field at one voxel.
/// `dir` is the unnormalized gradient, `magnitude` its cached length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientVoxel {
    pub dir: Vector3<f32>,
    pub magnitude: f32,
}

impl GradientVoxel {
    pub fn zero() -> GradientVoxel {
        GradientVoxel {
            dir: vector![0.0, 0.0, 0.0],
            magnitude: 0.0,
        }
    }

    fn new(dir: Vector3<f32>) -> GradientVoxel {
        GradientVoxel {
            dir,
            magnitude: dir.norm(),
        }
    }
}

/// Precomputed gradient field, one [`GradientVoxel`] per volume voxel,
/// same addressing convention as [`Volume`].
pub struct GradientVolume {
    size: Vector3<usize>,
    data: Vec<GradientVoxel>,
}

impl GradientVolume {
    /// Central differences per axis, one-sided at the faces.
    pub fn from_volume(volume: &Volume) -> GradientVolume {
        let size = volume.get_size();
        let mut data = Vec::with_capacity(size.x * size.y * size.z);

        for z in 0..size.z as i32 {
            for y in 0..size.y as i32 {
                for x in 0..size.x as i32 {
                    let dir = vector![
                        axis_difference(volume, [x, y, z], 0, size.x as i32),
                        axis_difference(volume, [x, y, z], 1, size.y as i32),
                        axis_difference(volume, [x, y, z], 2, size.z as i32)
                    ];
                    data.push(GradientVoxel::new(dir));
                }
            }
        }

        GradientVolume { size, data }
    }

    pub fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    /// Gradient at an integer coordinate; zero voxel outside `[0, size)`.
    pub fn get_gradient(&self, x: i32, y: i32, z: i32) -> GradientVoxel {
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= self.size.x
            || y as usize >= self.size.y
            || z as usize >= self.size.z
        {
            return GradientVoxel::zero();
        }
        let index = x as usize + self.size.x * (y as usize + self.size.y * z as usize);
        self.data[index]
    }

    /// Gradient of the voxel nearest to `pos`, zero voxel outside.
    /// Same round-half-up convention as the volume sampler.
    pub fn get_gradient_voxel(&self, pos: Point3<f32>) -> GradientVoxel {
        let size = self.size.map(|v| v as f32);
        let shifted = pos + vector![0.5, 0.5, 0.5];
        if shifted.x < 0.0
            || shifted.y < 0.0
            || shifted.z < 0.0
            || shifted.x >= size.x
            || shifted.y >= size.y
            || shifted.z >= size.z
        {
            return GradientVoxel::zero();
        }
        self.get_gradient(shifted.x as i32, shifted.y as i32, shifted.z as i32)
    }
}

/// Difference quotient along one axis at `coord`.
fn axis_difference(volume: &Volume, coord: [i32; 3], axis: usize, dim: i32) -> f32 {
    let mut low = coord;
    let mut high = coord;
    high[axis] += 1;
    low[axis] -= 1;

    let at = |c: [i32; 3]| volume.get_voxel(c[0], c[1], c[2]);

    if coord[axis] == 0 {
        at(high) - at(coord)
    } else if coord[axis] == dim - 1 {
        at(coord) - at(low)
    } else {
        0.5 * (at(high) - at(low))
    }
}
