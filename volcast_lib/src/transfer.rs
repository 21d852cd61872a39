//! Transfer functions: mapping samples (and gradient magnitudes) to
//! color and opacity.

use crate::color::{self, RGBA};

/// 1D transfer function, an RGBA lookup table over a value domain.
///
/// The domain covers `[index_start, index_start + index_range)`; values
/// outside clamp to the first/last entry.
#[derive(Debug, Clone)]
pub struct TransferFunction1D {
    pub color_map: Vec<RGBA>,
    pub index_start: f32,
    pub index_range: f32,
}

impl TransferFunction1D {
    pub fn new(color_map: Vec<RGBA>, index_start: f32, index_range: f32) -> TransferFunction1D {
        TransferFunction1D {
            color_map,
            index_start,
            index_range,
        }
    }

    pub fn sample(&self, val: f32) -> RGBA {
        if self.color_map.is_empty() {
            return color::zero();
        }
        let range01 = ((val - self.index_start) / self.index_range).clamp(0.0, 1.0);
        let index = ((range01 * self.color_map.len() as f32) as usize).min(self.color_map.len() - 1);
        self.color_map[index]
    }
}

/// Tent classifier over the (intensity, gradient magnitude) plane.
///
/// The region is a triangle with apex at `(intensity, 255)` and base
/// corners at `(intensity - radius, 0)` and `(intensity + radius, 0)`.
/// Opacity is 1 at the center intensity and falls off linearly, with the
/// tent width shrinking together with the gradient magnitude.
#[derive(Debug, Clone, Copy)]
pub struct TentClassifier {
    pub color: RGBA,
    pub intensity: f32,
    pub radius: f32,
}

impl TentClassifier {
    pub fn new(color: RGBA, intensity: f32, radius: f32) -> TentClassifier {
        TentClassifier {
            color,
            intensity,
            radius,
        }
    }

    /// Is `(intensity, magnitude)` inside the triangle?
    /// The base edges are excluded, as is zero magnitude.
    pub fn contains(&self, intensity: f32, magnitude: f32) -> bool {
        let left = self.intensity - self.radius;
        let right = self.intensity + self.radius;

        if intensity <= left || intensity >= right || magnitude <= 0.0 {
            return false;
        }

        if intensity == self.intensity {
            return true;
        }

        // boundary height rises linearly from 0 at the base corner to 255 at the apex
        let offset = if intensity < self.intensity {
            (self.intensity - intensity) / (self.intensity - left)
        } else {
            (intensity - self.intensity) / (right - self.intensity)
        };
        magnitude > 255.0 * offset
    }

    /// Tent weight; callers must have checked [`Self::contains`] first.
    pub fn opacity(&self, intensity: f32, magnitude: f32) -> f32 {
        // width of the triangle at this magnitude
        let width = self.radius * (magnitude / 255.0);
        1.0 - (self.intensity - intensity).abs() / width
    }

    /// Opacity if the point is inside the tent region, `None` otherwise.
    pub fn classify(&self, intensity: f32, magnitude: f32) -> Option<f32> {
        self.contains(intensity, magnitude)
            .then(|| self.opacity(intensity, magnitude))
    }
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;

    fn tent() -> TentClassifier {
        TentClassifier::new(vector![1.0, 0.0, 0.0, 1.0], 100.0, 50.0)
    }

    #[test]
    fn apex_has_full_opacity() {
        assert_eq!(tent().classify(100.0, 255.0), Some(1.0));
    }

    #[test]
    fn zero_magnitude_is_outside() {
        assert_eq!(tent().classify(100.0, 0.0), None);
    }

    #[test]
    fn base_corners_are_outside() {
        let t = tent();
        assert_eq!(t.classify(50.0, 255.0), None);
        assert_eq!(t.classify(150.0, 255.0), None);
    }

    #[test]
    fn opacity_falls_toward_the_boundary() {
        let t = tent();
        let near_apex = t.classify(101.0, 255.0).unwrap();
        let near_edge = t.classify(140.0, 255.0).unwrap();
        assert!(near_apex > near_edge);
        assert!(near_edge > 0.0);
        // just inside the right edge at full magnitude
        let edge = t.classify(149.9, 255.0).unwrap();
        assert!(edge < 0.01);
    }

    #[test]
    fn low_magnitude_narrows_the_tent() {
        let t = tent();
        // at magnitude 128 the boundary sits at half the radius
        assert!(t.classify(130.0, 128.0).is_none());
        assert!(t.classify(110.0, 128.0).is_some());
    }

    #[test]
    fn lookup_clamps_both_domain_ends() {
        let map = vec![
            vector![0.0, 0.0, 0.0, 0.0],
            vector![0.5, 0.5, 0.5, 0.5],
            vector![1.0, 1.0, 1.0, 1.0],
        ];
        let tf = TransferFunction1D::new(map, 10.0, 30.0);

        assert_eq!(tf.sample(-100.0), vector![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(tf.sample(10.0), vector![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(tf.sample(25.0), vector![0.5, 0.5, 0.5, 0.5]);
        assert_eq!(tf.sample(39.9), vector![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(tf.sample(1000.0), vector![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_table_samples_transparent() {
        let tf = TransferFunction1D::new(Vec::new(), 0.0, 1.0);
        assert_eq!(tf.sample(0.5), crate::color::zero());
    }
}
