use std::{ffi::OsString, str::FromStr};

use clap::ArgMatches;
use nalgebra::{point, vector, Point3, Vector2, Vector3};
use volcast_lib::{
    render::{RenderConfig, RenderMode},
    volumetric::{Interpolation, Volume},
};

use crate::defaults;

/// Transform `Values` into `Vector`
fn values_to_vector3<T>(args: &ArgMatches, key: &str) -> Option<Vector3<T>>
where
    T: FromStr + Copy + nalgebra::Scalar,
{
    let vals: Vec<T> = args
        .values_of(key)?
        .map(|v| v.parse::<T>().ok())
        .collect::<Option<_>>()?;
    Some(vector![vals[0], vals[1], vals[2]])
}

/// App configuration
/// Built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    /// Input volume file
    pub input: OsString,
    /// Output image file
    pub output: OsString,
    /// Output resolution
    pub resolution: Vector2<u16>,
    /// Pixel algorithm
    pub mode: RenderMode,
    /// Volume sampling strategy
    pub interpolation: Interpolation,
    /// Isosurface threshold
    pub iso_value: f32,
    /// Phong shading toggle
    pub shading: bool,
    /// Tiled fork-join rendering
    pub multi_thread: bool,
    /// Camera position, fitted to the volume when absent
    pub camera_pos: Option<Point3<f32>>,
    /// View direction, towards the volume center when absent
    pub camera_dir: Option<Vector3<f32>>,
}

impl Config {
    pub fn from_args(args: ArgMatches) -> Result<Config, String> {
        // Safe to unwrap values with defaults, checked by parser
        let input = args.value_of_os("input").unwrap_or_default().into();
        let output = args.value_of_os("output-file").unwrap_or_default().into();

        let resolution: Vec<u16> = args
            .values_of("resolution")
            .unwrap_or_default()
            .map(|v| v.parse().map_err(|_| format!("Bad resolution: {v}")))
            .collect::<Result<_, _>>()?;
        let resolution = vector![resolution[0], resolution[1]];

        let mode = match args.value_of("mode").unwrap_or_default() {
            "slice" => RenderMode::Slice,
            "mip" => RenderMode::Mip,
            "iso" => RenderMode::Iso,
            "composite" => RenderMode::Composite,
            "tf2d" => RenderMode::Tf2d,
            "tf2d-v2" => RenderMode::Tf2dV2,
            other => return Err(format!("Unknown mode {other}")),
        };

        let interpolation = match args.value_of("interpolation").unwrap_or_default() {
            "nearest" => Interpolation::Nearest,
            "linear" => Interpolation::Trilinear,
            "cubic" => Interpolation::Tricubic,
            other => return Err(format!("Unknown interpolation {other}")),
        };

        let iso_value = args
            .value_of("iso")
            .unwrap_or_default()
            .parse()
            .map_err(|_| "Bad iso value".to_string())?;

        let camera_pos = values_to_vector3::<f32>(&args, "camera-pos")
            .map(|v| point![v.x, v.y, v.z]);
        let camera_dir = values_to_vector3::<f32>(&args, "camera-dir");

        Ok(Config {
            input,
            output,
            resolution,
            mode,
            interpolation,
            iso_value,
            shading: args.is_present("shading"),
            multi_thread: !args.is_present("single-thread"),
            camera_pos,
            camera_dir,
        })
    }

    /// Corner view fitted to the volume unless overridden.
    pub fn camera_pose(&self, volume: &Volume) -> (Point3<f32>, Vector3<f32>) {
        let dims = volume.get_size().map(|v| v as f32);
        let center = point![dims.x / 2.0, dims.y / 2.0, dims.z / 2.0];

        let position = self
            .camera_pos
            .unwrap_or_else(|| point![dims.x * 2.0, dims.y * 2.0, dims.z * 2.0]);
        let direction = self.camera_dir.unwrap_or_else(|| center - position);
        (position, direction)
    }

    /// Library render config for the loaded volume.
    pub fn render_config(&self, volume: &Volume) -> RenderConfig {
        RenderConfig {
            resolution: self.resolution,
            render_mode: self.mode,
            interpolation: self.interpolation,
            iso_value: self.iso_value,
            volume_shading: self.shading,
            tf: defaults::grayscale_tf(volume.maximum()),
            tf2d: defaults::bone_classifier(volume.maximum()),
            tf2d_v2: defaults::two_tissue_classifiers(volume.maximum()),
            multi_thread: self.multi_thread,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::args::get_command;

    fn config_from(argv: &[&str]) -> Config {
        let matches = get_command().try_get_matches_from(argv).unwrap();
        Config::from_args(matches).unwrap()
    }

    #[test]
    fn defaults_map_to_mip_parallel() {
        let cfg = config_from(&["volcast", "skull.fld"]);
        assert_eq!(cfg.mode, RenderMode::Mip);
        assert_eq!(cfg.interpolation, Interpolation::Trilinear);
        assert_eq!(cfg.resolution, vector![512, 512]);
        assert!(cfg.multi_thread);
        assert!(cfg.camera_pos.is_none());
    }

    #[test]
    fn explicit_camera_and_mode() {
        let cfg = config_from(&[
            "volcast",
            "skull.fld",
            "-m",
            "iso",
            "--iso",
            "95.5",
            "--camera-pos=10,-20,30",
            "--single-thread",
        ]);
        assert_eq!(cfg.mode, RenderMode::Iso);
        assert_eq!(cfg.iso_value, 95.5);
        assert_eq!(cfg.camera_pos, Some(point![10.0, -20.0, 30.0]));
        assert!(!cfg.multi_thread);
    }
}
