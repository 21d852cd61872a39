//! Built-in transfer functions.
//! Domains scale with the volume's value range, so byte and short data
//! get comparable images out of the box.

use nalgebra::vector;
use volcast_lib::{
    color::RGBA,
    transfer::{TentClassifier, TransferFunction1D},
};

/// Grayscale ramp with a quadratic alpha ramp, low values fade out.
pub fn grayscale_tf(maximum: f32) -> TransferFunction1D {
    let table: Vec<RGBA> = (0..128)
        .map(|i| {
            let v = i as f32 / 127.0;
            vector![v, v, v, v * v]
        })
        .collect();
    TransferFunction1D::new(table, 0.0, maximum + 1.0)
}

/// Dense material classifier, warm bone-like tint.
pub fn bone_classifier(maximum: f32) -> TentClassifier {
    TentClassifier::new(vector![0.89, 0.85, 0.79, 0.8], maximum * 0.55, maximum * 0.25)
}

/// Soft tissue and dense material, picked apart by intensity.
pub fn two_tissue_classifiers(maximum: f32) -> [TentClassifier; 2] {
    [
        TentClassifier::new(vector![0.8, 0.25, 0.2, 0.4], maximum * 0.3, maximum * 0.18),
        TentClassifier::new(vector![0.89, 0.85, 0.79, 0.9], maximum * 0.7, maximum * 0.22),
    ]
}
