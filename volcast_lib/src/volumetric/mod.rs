mod gradient_volume;
pub mod parse;
mod vol_builder;
mod volume;

pub use gradient_volume::{GradientVolume, GradientVoxel};
pub use vol_builder::{build_volume, from_file, DataSource, ElementKind, VolumeMetadata};
pub use volume::{Interpolation, Volume};
