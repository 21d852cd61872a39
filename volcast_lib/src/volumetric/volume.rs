use nalgebra::{vector, Point3, Vector3};

use crate::common::BoundBox;

/// Interpolation strategy used by [`Volume::sample_at`].
///
/// A closed set; dispatch is a `match`, so there is no "unknown mode" at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Trilinear,
    Tricubic,
}

/// Sharpness of the cubic convolution kernel (Catmull-Rom).
const CUBIC_SHARPNESS: f32 = -0.5;

/// Dense scalar field on a regular grid.
///
/// Samples are stored row-major, x fastest, then y, then z.
/// Voxel spacing is 1 in all directions. Immutable once built;
/// min/max/histogram are computed at construction.
pub struct Volume {
    size: Vector3<usize>,
    data: Vec<u16>,
    minimum: f32,
    maximum: f32,
    histogram: Vec<u32>,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("size", &self.size)
            .field("data len ", &self.data.len())
            .field("range", &(self.minimum, self.maximum))
            .finish()
    }
}

impl Volume {
    pub fn from_data(data: Vec<u16>, size: Vector3<usize>) -> Result<Volume, &'static str> {
        let elements = size.x * size.y * size.z;
        if elements == 0 {
            return Err("Volume has a zero dimension");
        }
        if data.len() != elements {
            return Err("Data length does not match dimensions");
        }

        let minimum = data.iter().copied().min().unwrap_or(0);
        let maximum = data.iter().copied().max().unwrap_or(0);
        let histogram = compute_histogram(&data, maximum);

        Ok(Volume {
            size,
            data,
            minimum: f32::from(minimum),
            maximum: f32::from(maximum),
            histogram,
        })
    }

    pub fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    pub fn minimum(&self) -> f32 {
        self.minimum
    }

    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    /// Sample count per intensity level, `0..=maximum`.
    pub fn histogram(&self) -> &[u32] {
        &self.histogram
    }

    pub fn get_bound_box(&self) -> BoundBox {
        BoundBox::from_dims(self.size)
    }

    /// Raw voxel value; zero outside `[0, size)` on any axis.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> f32 {
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= self.size.x
            || y as usize >= self.size.y
            || z as usize >= self.size.z
        {
            return 0.0;
        }
        let index = x as usize + self.size.x * (y as usize + self.size.y * z as usize);
        f32::from(self.data[index])
    }

    /// Interpolated sample at `pos` in volume coordinates, zero outside.
    pub fn sample_at(&self, pos: Point3<f32>, interpolation: Interpolation) -> f32 {
        match interpolation {
            Interpolation::Nearest => self.sample_nearest(pos),
            Interpolation::Trilinear => self.sample_trilinear(pos),
            Interpolation::Tricubic => self.sample_tricubic(pos),
        }
    }

    // round-half-up per component
    fn sample_nearest(&self, pos: Point3<f32>) -> f32 {
        let size = self.size.map(|v| v as f32);
        let shifted = pos + vector![0.5, 0.5, 0.5];
        if shifted.x < 0.0
            || shifted.y < 0.0
            || shifted.z < 0.0
            || shifted.x >= size.x
            || shifted.y >= size.y
            || shifted.z >= size.z
        {
            return 0.0;
        }
        self.get_voxel(shifted.x as i32, shifted.y as i32, shifted.z as i32)
    }

    fn sample_trilinear(&self, pos: Point3<f32>) -> f32 {
        let size = self.size.map(|v| v as f32);
        if pos.x < 0.0
            || pos.y < 0.0
            || pos.z < 0.0
            || pos.x >= size.x - 1.0
            || pos.y >= size.y - 1.0
            || pos.z >= size.z - 1.0
        {
            return 0.0;
        }

        let x = pos.x as i32;
        let y = pos.y as i32;
        let z = pos.z as i32;

        let fac_x = pos.x - x as f32;
        let fac_y = pos.y - y as f32;
        let fac_z = pos.z - z as f32;

        let t0 = lerp(self.get_voxel(x, y, z), self.get_voxel(x + 1, y, z), fac_x);
        let t1 = lerp(
            self.get_voxel(x, y + 1, z),
            self.get_voxel(x + 1, y + 1, z),
            fac_x,
        );
        let t2 = lerp(
            self.get_voxel(x, y, z + 1),
            self.get_voxel(x + 1, y, z + 1),
            fac_x,
        );
        let t3 = lerp(
            self.get_voxel(x, y + 1, z + 1),
            self.get_voxel(x + 1, y + 1, z + 1),
            fac_x,
        );
        let t4 = lerp(t0, t1, fac_y);
        let t5 = lerp(t2, t3, fac_y);
        lerp(t4, t5, fac_z)
    }

    // Separable 4-tap cubic convolution over the 4x4x4 neighbourhood:
    // along x within each row, then y within each slice, then z.
    fn sample_tricubic(&self, pos: Point3<f32>) -> f32 {
        let size = self.size.map(|v| v as f32);
        if pos.x < 0.0
            || pos.y < 0.0
            || pos.z < 0.0
            || pos.x >= size.x - 1.0
            || pos.y >= size.y - 1.0
            || pos.z >= size.z - 1.0
        {
            return 0.0;
        }

        let x = pos.x as i32;
        let y = pos.y as i32;
        let z = pos.z as i32;

        let fac_x = pos.x - x as f32;
        let fac_y = pos.y - y as f32;
        let fac_z = pos.z - z as f32;

        let mut slices = [0.0f32; 4];
        for (k, slice) in slices.iter_mut().enumerate() {
            let z_k = z - 1 + k as i32;
            let mut rows = [0.0f32; 4];
            for (j, row) in rows.iter_mut().enumerate() {
                let y_j = y - 1 + j as i32;
                *row = cubic_interpolate(
                    [
                        self.get_voxel(x - 1, y_j, z_k),
                        self.get_voxel(x, y_j, z_k),
                        self.get_voxel(x + 1, y_j, z_k),
                        self.get_voxel(x + 2, y_j, z_k),
                    ],
                    fac_x,
                );
            }
            *slice = cubic_interpolate(rows, fac_y);
        }
        let value = cubic_interpolate(slices, fac_z);

        // the kernel can undershoot, the field itself is non-negative
        value.max(0.0)
    }
}

fn lerp(g0: f32, g1: f32, factor: f32) -> f32 {
    (1.0 - factor) * g0 + factor * g1
}

/// Kernel weight `h(x)` of the cubic convolution kernel.
fn cubic_weight(x: f32) -> f32 {
    let a = CUBIC_SHARPNESS;
    let x = x.abs();
    if x < 1.0 {
        (a + 2.0) * x.powi(3) - (a + 3.0) * x.powi(2) + 1.0
    } else if x < 2.0 {
        a * x.powi(3) - 5.0 * a * x.powi(2) + 8.0 * a * x - 4.0 * a
    } else {
        0.0
    }
}

fn cubic_interpolate(g: [f32; 4], factor: f32) -> f32 {
    cubic_weight(1.0 + factor) * g[0]
        + cubic_weight(factor) * g[1]
        + cubic_weight(1.0 - factor) * g[2]
        + cubic_weight(2.0 - factor) * g[3]
}

fn compute_histogram(data: &[u16], maximum: u16) -> Vec<u32> {
    let mut histogram = vec![0u32; usize::from(maximum) + 1];
    for &v in data {
        histogram[usize::from(v)] += 1;
    }
    histogram
}
